use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{Customer, EmissionJob, Invoice, NfseAuthorization};
use super::errors::InvoiceError;
use super::value_objects::{InvoiceNumber, InvoiceStatus};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
  async fn create(&self, customer: Customer) -> Result<Customer, InvoiceError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, InvoiceError>;
  /// Newest first
  async fn find_by_company_id(&self, company_id: Uuid) -> Result<Vec<Customer>, InvoiceError>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;
  /// Newest first
  async fn find_by_company_id(&self, company_id: Uuid) -> Result<Vec<Invoice>, InvoiceError>;
  async fn find_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>, InvoiceError>;

  /// DRAFT -> PENDING as a single conditional update.
  /// Returns `None` when the invoice was not DRAFT any more.
  async fn mark_pending(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;

  /// PENDING -> DRAFT, undoing `mark_pending` when the job never reached the
  /// queue. Returns `None` when the invoice was not PENDING any more.
  async fn revert_pending(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;

  /// PENDING -> AUTHORIZED as a single conditional update.
  /// Returns `None` when the invoice was not PENDING any more.
  async fn authorize(
    &self,
    id: Uuid,
    invoice_number: &InvoiceNumber,
    issued_at: DateTime<Utc>,
  ) -> Result<Option<Invoice>, InvoiceError>;
}

/// Job queue between the HTTP side and the emission worker
#[async_trait]
pub trait EmissionQueue: Send + Sync {
  async fn enqueue(&self, job: EmissionJob) -> Result<(), InvoiceError>;

  /// Waits up to the backend's poll timeout; `None` means nothing arrived
  async fn dequeue(&self) -> Result<Option<EmissionJob>, InvoiceError>;
}

/// Municipal NFS-e web service
#[async_trait]
pub trait NfseGateway: Send + Sync {
  async fn authorize(&self, invoice: &Invoice) -> Result<NfseAuthorization, InvoiceError>;
}
