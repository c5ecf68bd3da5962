use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::company::entities::Company;
use crate::domain::company::ports::CompanyRepository;

use super::entities::{Customer, CustomerData, EmissionJob, EmissionOutcome, Invoice};
use super::errors::InvoiceError;
use super::ports::{CustomerRepository, EmissionQueue, InvoiceRepository, NfseGateway};
use super::value_objects::{Amount, InvoiceDescription, InvoiceStatus, ServiceCode};

/// Validated invoice creation data
pub struct InvoiceData {
  pub company_id: Uuid,
  pub customer_id: Uuid,
  pub amount: Amount,
  pub description: InvoiceDescription,
  pub service_code: ServiceCode,
}

pub struct InvoiceServiceDependencies {
  pub invoice_repo: Arc<dyn InvoiceRepository>,
  pub customer_repo: Arc<dyn CustomerRepository>,
  pub company_repo: Arc<dyn CompanyRepository>,
  pub emission_queue: Arc<dyn EmissionQueue>,
  pub nfse_gateway: Arc<dyn NfseGateway>,
}

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  customer_repo: Arc<dyn CustomerRepository>,
  company_repo: Arc<dyn CompanyRepository>,
  emission_queue: Arc<dyn EmissionQueue>,
  nfse_gateway: Arc<dyn NfseGateway>,
}

impl InvoiceService {
  pub fn new(deps: InvoiceServiceDependencies) -> Self {
    Self {
      invoice_repo: deps.invoice_repo,
      customer_repo: deps.customer_repo,
      company_repo: deps.company_repo,
      emission_queue: deps.emission_queue,
      nfse_gateway: deps.nfse_gateway,
    }
  }

  // Customer operations
  pub async fn create_customer(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Uuid,
    data: CustomerData,
  ) -> Result<Customer, InvoiceError> {
    self.verify_company_access(principal, company_id).await?;

    let customer = self
      .customer_repo
      .create(Customer::new(company_id, data))
      .await?;
    tracing::info!(company_id = %company_id, customer_id = %customer.id, "Customer created");
    Ok(customer)
  }

  pub async fn list_customers(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Uuid,
  ) -> Result<Vec<Customer>, InvoiceError> {
    self.verify_company_access(principal, company_id).await?;
    self.customer_repo.find_by_company_id(company_id).await
  }

  // Invoice operations
  pub async fn create_invoice(
    &self,
    principal: &AuthenticatedCompany,
    data: InvoiceData,
  ) -> Result<(Invoice, Company, Customer), InvoiceError> {
    let company = self
      .verify_company_access(principal, data.company_id)
      .await?;

    let customer = self
      .customer_repo
      .find_by_id(data.customer_id)
      .await?
      .ok_or(InvoiceError::CustomerNotFound(data.customer_id))?;

    if customer.company_id != company.id {
      return Err(InvoiceError::CustomerNotInCompany);
    }

    let invoice = Invoice::new(
      company.id,
      customer.id,
      data.amount,
      data.description,
      data.service_code,
    );
    let invoice = self.invoice_repo.create(invoice).await?;
    tracing::info!(
      invoice_id = %invoice.id,
      company_id = %company.id,
      amount = %invoice.amount,
      "Invoice drafted"
    );

    Ok((invoice, company, customer))
  }

  /// Invoices of a company, newest first, each paired with its customer.
  /// Without `company_id` the principal's own company is listed.
  pub async fn list_invoices(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Option<Uuid>,
  ) -> Result<Vec<(Invoice, Option<Customer>)>, InvoiceError> {
    let company_id = company_id.unwrap_or(principal.company_id);
    self.verify_company_access(principal, company_id).await?;

    let invoices = self.invoice_repo.find_by_company_id(company_id).await?;
    let customers: HashMap<Uuid, Customer> = self
      .customer_repo
      .find_by_company_id(company_id)
      .await?
      .into_iter()
      .map(|c| (c.id, c))
      .collect();

    Ok(
      invoices
        .into_iter()
        .map(|invoice| {
          let customer = customers.get(&invoice.customer_id).cloned();
          (invoice, customer)
        })
        .collect(),
    )
  }

  pub async fn get_invoice(
    &self,
    principal: &AuthenticatedCompany,
    invoice_id: Uuid,
  ) -> Result<(Invoice, Customer), InvoiceError> {
    let invoice = self.find_owned_invoice(principal, invoice_id).await?;
    let customer = self
      .customer_repo
      .find_by_id(invoice.customer_id)
      .await?
      .ok_or(InvoiceError::CustomerNotFound(invoice.customer_id))?;

    Ok((invoice, customer))
  }

  /// Requests emission: DRAFT -> PENDING, then hands the invoice to the worker
  pub async fn emit_invoice(
    &self,
    principal: &AuthenticatedCompany,
    invoice_id: Uuid,
  ) -> Result<Invoice, InvoiceError> {
    let invoice = self.find_owned_invoice(principal, invoice_id).await?;

    if !invoice.status.is_emittable() {
      return Err(InvoiceError::NotEmittable(invoice.status));
    }

    // A concurrent emit may have won the race since the read above
    let pending = self
      .invoice_repo
      .mark_pending(invoice.id)
      .await?
      .ok_or(InvoiceError::NotEmittable(InvoiceStatus::Pending))?;

    // Without a job nothing would ever move it past PENDING
    if let Err(e) = self.emission_queue.enqueue(EmissionJob::new(pending.id)).await {
      tracing::error!(
        invoice_id = %pending.id,
        error = %e,
        "Failed to queue invoice, back to DRAFT"
      );
      if let Err(revert) = self.invoice_repo.revert_pending(pending.id).await {
        tracing::error!(
          invoice_id = %pending.id,
          error = %revert,
          "Failed to revert invoice to DRAFT"
        );
      }
      return Err(e);
    }
    tracing::info!(invoice_id = %pending.id, "Invoice queued for emission");

    Ok(pending)
  }

  /// Worker side of emission: calls the municipality and records the result
  pub async fn process_emission(&self, job: &EmissionJob) -> Result<EmissionOutcome, InvoiceError> {
    let Some(invoice) = self.invoice_repo.find_by_id(job.invoice_id).await? else {
      return Ok(EmissionOutcome::Skipped {
        invoice_id: job.invoice_id,
        reason: "invoice no longer exists".to_string(),
      });
    };

    if invoice.status != InvoiceStatus::Pending {
      return Ok(EmissionOutcome::Skipped {
        invoice_id: invoice.id,
        reason: format!("invoice is {}, expected PENDING", invoice.status),
      });
    }

    let authorization = self.nfse_gateway.authorize(&invoice).await?;

    match self
      .invoice_repo
      .authorize(
        invoice.id,
        &authorization.invoice_number,
        authorization.issued_at,
      )
      .await?
    {
      Some(authorized) => Ok(EmissionOutcome::Authorized(authorized)),
      None => Ok(EmissionOutcome::Skipped {
        invoice_id: invoice.id,
        reason: "invoice left PENDING while the gateway was answering".to_string(),
      }),
    }
  }

  /// Puts every PENDING invoice back on the queue. Returns how many were queued.
  pub async fn requeue_pending(&self) -> Result<usize, InvoiceError> {
    let pending = self
      .invoice_repo
      .find_by_status(InvoiceStatus::Pending)
      .await?;

    for invoice in &pending {
      self
        .emission_queue
        .enqueue(EmissionJob::new(invoice.id))
        .await?;
    }

    Ok(pending.len())
  }

  async fn find_owned_invoice(
    &self,
    principal: &AuthenticatedCompany,
    invoice_id: Uuid,
  ) -> Result<Invoice, InvoiceError> {
    let invoice = self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))?;

    if !principal.can_access(invoice.company_id) {
      return Err(InvoiceError::AccessDenied);
    }

    Ok(invoice)
  }

  async fn verify_company_access(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Uuid,
  ) -> Result<Company, InvoiceError> {
    let company = self
      .company_repo
      .find_by_id(company_id)
      .await
      .map_err(|e| InvoiceError::Repository(e.to_string()))?
      .ok_or(InvoiceError::CompanyNotFound(company_id))?;

    if !principal.can_access(company.id) {
      return Err(InvoiceError::AccessDenied);
    }

    Ok(company)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::infrastructure::nfse::SimulatedNfseGateway;
  use crate::test_support::{Fixture, customer_data};
  use rust_decimal_macros::dec;

  fn invoice_data(company_id: Uuid, customer_id: Uuid) -> InvoiceData {
    InvoiceData {
      company_id,
      customer_id,
      amount: Amount::new(dec!(1500.00)).unwrap(),
      description: InvoiceDescription::new("Desenvolvimento de sistema web").unwrap(),
      service_code: ServiceCode::new("1.03").unwrap(),
    }
  }

  #[tokio::test]
  async fn test_create_invoice_starts_as_draft() {
    let fx = Fixture::new().await;
    let customer = fx.customer().await;

    let (invoice, company, returned_customer) = fx
      .invoice_service
      .create_invoice(&fx.principal, invoice_data(fx.company.id, customer.id))
      .await
      .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.amount.value(), dec!(1500.00));
    assert_eq!(company.id, fx.company.id);
    assert_eq!(returned_customer.id, customer.id);
  }

  #[tokio::test]
  async fn test_create_invoice_rejects_foreign_customer() {
    let fx = Fixture::new().await;
    let other = fx.other_company().await;
    let foreign = fx
      .customers
      .create(Customer::new(other.id, customer_data("Cliente Alheio")))
      .await
      .unwrap();

    let result = fx
      .invoice_service
      .create_invoice(&fx.principal, invoice_data(fx.company.id, foreign.id))
      .await;

    assert!(matches!(result, Err(InvoiceError::CustomerNotInCompany)));
  }

  #[tokio::test]
  async fn test_create_invoice_checks_company() {
    let fx = Fixture::new().await;
    let customer = fx.customer().await;
    let other = fx.other_company().await;

    let missing = fx
      .invoice_service
      .create_invoice(&fx.principal, invoice_data(Uuid::new_v4(), customer.id))
      .await;
    assert!(matches!(missing, Err(InvoiceError::CompanyNotFound(_))));

    let foreign = fx
      .invoice_service
      .create_invoice(&fx.principal, invoice_data(other.id, customer.id))
      .await;
    assert!(matches!(foreign, Err(InvoiceError::AccessDenied)));

    let unknown_customer = fx
      .invoice_service
      .create_invoice(&fx.principal, invoice_data(fx.company.id, Uuid::new_v4()))
      .await;
    assert!(matches!(
      unknown_customer,
      Err(InvoiceError::CustomerNotFound(_))
    ));
  }

  #[tokio::test]
  async fn test_emit_moves_draft_to_pending_and_enqueues() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;

    let pending = fx
      .invoice_service
      .emit_invoice(&fx.principal, invoice.id)
      .await
      .unwrap();
    assert_eq!(pending.status, InvoiceStatus::Pending);

    let job = fx.queue.dequeue().await.unwrap().unwrap();
    assert_eq!(job.invoice_id, invoice.id);
  }

  #[tokio::test]
  async fn test_emit_twice_is_rejected() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;

    fx.invoice_service
      .emit_invoice(&fx.principal, invoice.id)
      .await
      .unwrap();
    let second = fx
      .invoice_service
      .emit_invoice(&fx.principal, invoice.id)
      .await;

    assert!(matches!(
      second,
      Err(InvoiceError::NotEmittable(InvoiceStatus::Pending))
    ));
  }

  #[tokio::test]
  async fn test_emit_foreign_invoice_is_denied() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;
    let intruder = AuthenticatedCompany::new(Uuid::new_v4(), "x@example.com");

    let result = fx.invoice_service.emit_invoice(&intruder, invoice.id).await;
    assert!(matches!(result, Err(InvoiceError::AccessDenied)));

    let missing = fx
      .invoice_service
      .emit_invoice(&fx.principal, Uuid::new_v4())
      .await;
    assert!(matches!(missing, Err(InvoiceError::InvoiceNotFound(_))));
  }

  struct UnavailableQueue;

  #[async_trait::async_trait]
  impl EmissionQueue for UnavailableQueue {
    async fn enqueue(&self, _job: EmissionJob) -> Result<(), InvoiceError> {
      Err(InvoiceError::Queue("redis down".to_string()))
    }

    async fn dequeue(&self) -> Result<Option<EmissionJob>, InvoiceError> {
      Ok(None)
    }
  }

  #[tokio::test]
  async fn test_emit_reverts_to_draft_when_queue_is_down() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;
    let service = InvoiceService::new(InvoiceServiceDependencies {
      invoice_repo: fx.invoices.clone(),
      customer_repo: fx.customers.clone(),
      company_repo: fx.companies.clone(),
      emission_queue: Arc::new(UnavailableQueue),
      nfse_gateway: Arc::new(SimulatedNfseGateway::new(std::time::Duration::ZERO)),
    });

    let result = service.emit_invoice(&fx.principal, invoice.id).await;
    assert!(matches!(result, Err(InvoiceError::Queue(_))));

    let stored = fx.invoices.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvoiceStatus::Draft);

    // Once the queue is back the invoice can be emitted again
    let pending = fx
      .invoice_service
      .emit_invoice(&fx.principal, invoice.id)
      .await
      .unwrap();
    assert_eq!(pending.status, InvoiceStatus::Pending);
  }

  #[tokio::test]
  async fn test_process_emission_authorizes_pending_invoice() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;
    fx.invoice_service
      .emit_invoice(&fx.principal, invoice.id)
      .await
      .unwrap();
    let job = fx.queue.dequeue().await.unwrap().unwrap();

    let outcome = fx.invoice_service.process_emission(&job).await.unwrap();

    let EmissionOutcome::Authorized(authorized) = outcome else {
      panic!("expected authorization, got {:?}", outcome);
    };
    assert_eq!(authorized.status, InvoiceStatus::Authorized);
    let number = authorized.invoice_number.unwrap();
    assert_eq!(number.value().len(), 10);
    assert!(
      number
        .value()
        .starts_with(&chrono::Utc::now().format("%Y").to_string())
    );
    assert!(authorized.issued_at.is_some());
  }

  #[tokio::test]
  async fn test_process_emission_skips_non_pending() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;

    let outcome = fx
      .invoice_service
      .process_emission(&EmissionJob::new(invoice.id))
      .await
      .unwrap();
    assert!(matches!(outcome, EmissionOutcome::Skipped { .. }));

    let stored = fx.invoices.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvoiceStatus::Draft);

    let gone = fx
      .invoice_service
      .process_emission(&EmissionJob::new(Uuid::new_v4()))
      .await
      .unwrap();
    assert!(matches!(gone, EmissionOutcome::Skipped { .. }));
  }

  #[tokio::test]
  async fn test_requeue_pending_enqueues_each_pending_invoice() {
    let fx = Fixture::new().await;
    let first = fx.draft_invoice().await;
    let _draft = fx.draft_invoice().await;
    fx.invoices.mark_pending(first.id).await.unwrap();

    let queued = fx.invoice_service.requeue_pending().await.unwrap();
    assert_eq!(queued, 1);

    let job = fx.queue.dequeue().await.unwrap().unwrap();
    assert_eq!(job.invoice_id, first.id);
  }

  #[tokio::test]
  async fn test_list_invoices_defaults_to_own_company() {
    let fx = Fixture::new().await;
    let older = fx.draft_invoice().await;
    let newer = fx.draft_invoice().await;

    let listed = fx
      .invoice_service
      .list_invoices(&fx.principal, None)
      .await
      .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].0.id, newer.id);
    assert_eq!(listed[1].0.id, older.id);
    assert!(listed.iter().all(|(_, customer)| customer.is_some()));

    let other = fx.other_company().await;
    let denied = fx
      .invoice_service
      .list_invoices(&fx.principal, Some(other.id))
      .await;
    assert!(matches!(denied, Err(InvoiceError::AccessDenied)));
  }

  #[tokio::test]
  async fn test_customers_are_tenant_scoped() {
    let fx = Fixture::new().await;
    let other = fx.other_company().await;

    let result = fx
      .invoice_service
      .create_customer(&fx.principal, other.id, customer_data("Cliente Novo"))
      .await;
    assert!(matches!(result, Err(InvoiceError::AccessDenied)));

    fx.invoice_service
      .create_customer(&fx.principal, fx.company.id, customer_data("Cliente Novo"))
      .await
      .unwrap();
    let customers = fx
      .invoice_service
      .list_customers(&fx.principal, fx.company.id)
      .await
      .unwrap();
    assert_eq!(customers.len(), 1);
  }
}
