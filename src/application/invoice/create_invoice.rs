use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::InvoiceDto;
use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::invoice::{
  Amount, InvoiceData, InvoiceDescription, InvoiceError, InvoiceService, ServiceCode,
};

#[derive(Debug, Clone)]
pub struct CreateInvoiceCommand {
  pub company_id: Uuid,
  pub customer_id: Uuid,
  pub amount: Decimal,
  pub description: String,
  /// Municipal service list item; `1.03` when absent
  pub service_code: Option<String>,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
    command: CreateInvoiceCommand,
  ) -> Result<InvoiceDto, InvoiceError> {
    let service_code = match command.service_code {
      Some(code) if !code.trim().is_empty() => ServiceCode::new(code)?,
      _ => ServiceCode::new(ServiceCode::DEFAULT)?,
    };

    let data = InvoiceData {
      company_id: command.company_id,
      customer_id: command.customer_id,
      amount: Amount::new(command.amount)?,
      description: InvoiceDescription::new(command.description)?,
      service_code,
    };

    let (invoice, company, customer) = self
      .invoice_service
      .create_invoice(principal, data)
      .await?;

    Ok(
      InvoiceDto::from(invoice)
        .with_company(&company)
        .with_customer(Some(&customer)),
    )
  }
}
