use std::sync::Arc;
use uuid::Uuid;

use super::InvoiceDto;
use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::invoice::{InvoiceError, InvoiceService};

pub struct GetInvoiceDetailsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceDetailsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
    invoice_id: Uuid,
  ) -> Result<InvoiceDto, InvoiceError> {
    let (invoice, customer) = self
      .invoice_service
      .get_invoice(principal, invoice_id)
      .await?;

    Ok(InvoiceDto::from(invoice).with_customer(Some(&customer)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::Fixture;

  #[tokio::test]
  async fn test_details_include_customer_email() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;
    let use_case = GetInvoiceDetailsUseCase::new(fx.invoice_service.clone());

    let details = use_case.execute(&fx.principal, invoice.id).await.unwrap();

    assert_eq!(details.id, invoice.id);
    assert_eq!(
      details.customer.and_then(|c| c.email).as_deref(),
      Some("cliente@example.com")
    );
  }

  #[tokio::test]
  async fn test_unknown_invoice_is_not_found() {
    let fx = Fixture::new().await;
    let use_case = GetInvoiceDetailsUseCase::new(fx.invoice_service.clone());

    assert!(matches!(
      use_case.execute(&fx.principal, Uuid::new_v4()).await,
      Err(InvoiceError::InvoiceNotFound(_))
    ));
  }
}
