use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InvoiceError;
use super::value_objects::{
  Amount, CustomerName, InvoiceDescription, InvoiceNumber, InvoiceStatus, Phone, ServiceCode,
};
use crate::domain::auth::value_objects::Email;
use crate::domain::company::value_objects::{Address, TaxDocument};

// Customer - the service taker, owned by one company
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
  pub id: Uuid,
  pub company_id: Uuid,
  pub name: CustomerName,
  pub document: TaxDocument,
  pub email: Option<Email>,
  pub phone: Option<Phone>,
  pub address: Address,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Validated customer fields
#[derive(Debug, Clone)]
pub struct CustomerData {
  pub name: CustomerName,
  pub document: TaxDocument,
  pub email: Option<Email>,
  pub phone: Option<Phone>,
  pub address: Address,
}

impl Customer {
  pub fn new(company_id: Uuid, data: CustomerData) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      company_id,
      name: data.name,
      document: data.document,
      email: data.email,
      phone: data.phone,
      address: data.address,
      created_at: now,
      updated_at: now,
    }
  }
}

// Invoice - a service invoice (NFS-e) issued by a company to one of its customers
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
  pub id: Uuid,
  pub company_id: Uuid,
  pub customer_id: Uuid,
  pub amount: Amount,
  pub description: InvoiceDescription,
  pub service_code: ServiceCode,
  pub status: InvoiceStatus,
  pub invoice_number: Option<InvoiceNumber>,
  pub verification_code: Option<String>,
  pub external_id: Option<String>,
  pub pdf_url: Option<String>,
  pub xml_url: Option<String>,
  pub issued_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Invoice {
  pub fn new(
    company_id: Uuid,
    customer_id: Uuid,
    amount: Amount,
    description: InvoiceDescription,
    service_code: ServiceCode,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      company_id,
      customer_id,
      amount,
      description,
      service_code,
      status: InvoiceStatus::Draft,
      invoice_number: None,
      verification_code: None,
      external_id: None,
      pdf_url: None,
      xml_url: None,
      issued_at: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn change_status(&mut self, new_status: InvoiceStatus) -> Result<(), InvoiceError> {
    if !self.status.can_transition_to(new_status) {
      return Err(InvoiceError::InvalidStatusTransition {
        from: self.status,
        to: new_status,
      });
    }

    self.status = new_status;
    self.updated_at = Utc::now();
    Ok(())
  }

  /// Applies the municipality's answer. Only valid while PENDING.
  pub fn authorize(&mut self, authorization: &NfseAuthorization) -> Result<(), InvoiceError> {
    self.change_status(InvoiceStatus::Authorized)?;
    self.invoice_number = Some(authorization.invoice_number.clone());
    self.issued_at = Some(authorization.issued_at);
    Ok(())
  }
}

/// Queue message asking the worker to emit one invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionJob {
  pub invoice_id: Uuid,
  pub enqueued_at: DateTime<Utc>,
}

impl EmissionJob {
  pub fn new(invoice_id: Uuid) -> Self {
    Self {
      invoice_id,
      enqueued_at: Utc::now(),
    }
  }
}

/// Result of a successful municipal authorization
#[derive(Debug, Clone, PartialEq)]
pub struct NfseAuthorization {
  pub invoice_number: InvoiceNumber,
  pub issued_at: DateTime<Utc>,
}

/// What the worker did with a job
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionOutcome {
  Authorized(Invoice),
  /// Job refers to an invoice that is gone or no longer PENDING
  Skipped { invoice_id: Uuid, reason: String },
}
