use std::sync::Arc;
use uuid::Uuid;

use super::CustomerDto;
use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::auth::value_objects::Email;
use crate::domain::company::{Address, AddressInput, TaxDocument, ValidationError};
use crate::domain::invoice::{CustomerData, CustomerName, InvoiceError, InvoiceService, Phone};

#[derive(Debug, Clone, Default)]
pub struct CreateCustomerCommand {
  pub company_id: Uuid,
  pub name: String,
  /// CPF or CNPJ, punctuation allowed
  pub document: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address: AddressInput,
}

pub struct CreateCustomerUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateCustomerUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
    command: CreateCustomerCommand,
  ) -> Result<CustomerDto, InvoiceError> {
    let email = command
      .email
      .filter(|e| !e.trim().is_empty())
      .map(Email::new)
      .transpose()
      .map_err(ValidationError::from)?;
    let phone = command
      .phone
      .filter(|p| !p.trim().is_empty())
      .map(Phone::new)
      .transpose()?;

    let data = CustomerData {
      name: CustomerName::new(command.name)?,
      document: TaxDocument::parse(&command.document)?,
      email,
      phone,
      address: Address::new(command.address)?,
    };

    let customer = self
      .invoice_service
      .create_customer(principal, command.company_id, data)
      .await?;
    Ok(CustomerDto::from(customer))
  }
}
