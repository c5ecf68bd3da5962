use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::company::{Company, CompanyError, CompanyService, TaxRegime};

/// Public view of a company; never carries the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
  pub id: Uuid,
  pub cnpj: String,
  pub legal_name: String,
  pub trade_name: Option<String>,
  pub email: String,
  pub municipal_registration: Option<String>,
  pub tax_regime: TaxRegime,
  pub address_street: Option<String>,
  pub address_number: Option<String>,
  pub address_zip: Option<String>,
  pub address_city: Option<String>,
  pub address_state: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyDto {
  fn from(company: Company) -> Self {
    Self {
      id: company.id,
      cnpj: company.cnpj.as_str().to_string(),
      legal_name: company.legal_name.into_inner(),
      trade_name: company.trade_name,
      email: company.email.into_inner(),
      municipal_registration: company.municipal_registration,
      tax_regime: company.tax_regime,
      address_street: company.address.street,
      address_number: company.address.number,
      address_zip: company.address.zip,
      address_city: company.address.city,
      address_state: company.address.state.map(|s| s.as_str().to_string()),
      created_at: company.created_at,
      updated_at: company.updated_at,
    }
  }
}

pub struct ListCompaniesUseCase {
  company_service: Arc<CompanyService>,
}

impl ListCompaniesUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
  ) -> Result<Vec<CompanyDto>, CompanyError> {
    let companies = self.company_service.list_companies(principal).await?;
    Ok(companies.into_iter().map(CompanyDto::from).collect())
  }
}
