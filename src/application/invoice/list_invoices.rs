use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::company::Company;
use crate::domain::invoice::{Customer, Invoice, InvoiceError, InvoiceService, InvoiceStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummaryDto {
  pub id: Uuid,
  pub legal_name: String,
  pub cnpj: String,
}

impl From<&Company> for CompanySummaryDto {
  fn from(company: &Company) -> Self {
    Self {
      id: company.id,
      legal_name: company.legal_name.as_str().to_string(),
      cnpj: company.cnpj.as_str().to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummaryDto {
  pub id: Uuid,
  pub name: String,
  pub document: String,
  pub email: Option<String>,
}

impl From<&Customer> for CustomerSummaryDto {
  fn from(customer: &Customer) -> Self {
    Self {
      id: customer.id,
      name: customer.name.value().to_string(),
      document: customer.document.as_str().to_string(),
      email: customer.email.as_ref().map(|e| e.as_str().to_string()),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
  pub id: Uuid,
  pub company_id: Uuid,
  pub customer_id: Uuid,
  pub amount: Decimal,
  pub description: String,
  pub service_code: String,
  pub status: InvoiceStatus,
  pub invoice_number: Option<String>,
  pub verification_code: Option<String>,
  pub external_id: Option<String>,
  pub pdf_url: Option<String>,
  pub xml_url: Option<String>,
  pub issued_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company: Option<CompanySummaryDto>,
  pub customer: Option<CustomerSummaryDto>,
}

impl From<Invoice> for InvoiceDto {
  fn from(invoice: Invoice) -> Self {
    Self {
      id: invoice.id,
      company_id: invoice.company_id,
      customer_id: invoice.customer_id,
      amount: invoice.amount.value(),
      description: invoice.description.value().to_string(),
      service_code: invoice.service_code.value().to_string(),
      status: invoice.status,
      invoice_number: invoice.invoice_number.map(|n| n.into_inner()),
      verification_code: invoice.verification_code,
      external_id: invoice.external_id,
      pdf_url: invoice.pdf_url,
      xml_url: invoice.xml_url,
      issued_at: invoice.issued_at,
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
      company: None,
      customer: None,
    }
  }
}

impl InvoiceDto {
  pub fn with_customer(mut self, customer: Option<&Customer>) -> Self {
    self.customer = customer.map(CustomerSummaryDto::from);
    self
  }

  pub fn with_company(mut self, company: &Company) -> Self {
    self.company = Some(CompanySummaryDto::from(company));
    self
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesCommand {
  /// Defaults to the signed-in company
  pub company_id: Option<Uuid>,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
    command: ListInvoicesCommand,
  ) -> Result<Vec<InvoiceDto>, InvoiceError> {
    let invoices = self
      .invoice_service
      .list_invoices(principal, command.company_id)
      .await?;

    Ok(
      invoices
        .into_iter()
        .map(|(invoice, customer)| InvoiceDto::from(invoice).with_customer(customer.as_ref()))
        .collect(),
    )
  }
}
