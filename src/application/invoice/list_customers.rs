use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::invoice::{Customer, InvoiceError, InvoiceService};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
  pub id: Uuid,
  pub company_id: Uuid,
  pub name: String,
  /// Digits only
  pub document: String,
  /// "CPF" or "CNPJ"
  pub document_type: &'static str,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address_street: Option<String>,
  pub address_number: Option<String>,
  pub address_zip: Option<String>,
  pub address_city: Option<String>,
  pub address_state: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerDto {
  fn from(customer: Customer) -> Self {
    Self {
      id: customer.id,
      company_id: customer.company_id,
      name: customer.name.value().to_string(),
      document: customer.document.as_str().to_string(),
      document_type: customer.document.kind(),
      email: customer.email.map(|e| e.into_inner()),
      phone: customer.phone.map(|p| p.value().to_string()),
      address_street: customer.address.street,
      address_number: customer.address.number,
      address_zip: customer.address.zip,
      address_city: customer.address.city,
      address_state: customer.address.state.map(|s| s.as_str().to_string()),
      created_at: customer.created_at,
      updated_at: customer.updated_at,
    }
  }
}

pub struct ListCustomersUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListCustomersUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Uuid,
  ) -> Result<Vec<CustomerDto>, InvoiceError> {
    let customers = self
      .invoice_service
      .list_customers(principal, company_id)
      .await?;

    Ok(customers.into_iter().map(CustomerDto::from).collect())
  }
}
