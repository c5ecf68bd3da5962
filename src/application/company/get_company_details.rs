use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::CompanyDto;
use crate::application::invoice::CustomerDto;
use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::company::{CompanyError, CompanyService};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetailsResponse {
  #[serde(flatten)]
  pub company: CompanyDto,
  /// Newest first
  pub customers: Vec<CustomerDto>,
}

pub struct GetCompanyDetailsUseCase {
  company_service: Arc<CompanyService>,
}

impl GetCompanyDetailsUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Uuid,
  ) -> Result<CompanyDetailsResponse, CompanyError> {
    let (company, customers) = self
      .company_service
      .get_company_details(principal, company_id)
      .await?;

    Ok(CompanyDetailsResponse {
      company: CompanyDto::from(company),
      customers: customers.into_iter().map(CustomerDto::from).collect(),
    })
  }
}
