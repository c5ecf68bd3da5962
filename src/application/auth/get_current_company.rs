use std::sync::Arc;

use crate::application::company::CompanyDto;
use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;

/// Resolves access tokens into principals and principals into their company
pub struct GetCurrentCompanyUseCase {
  auth_service: Arc<AuthService>,
}

impl GetCurrentCompanyUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Validates a bearer or session token
  pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedCompany, AuthError> {
    self.auth_service.authenticate(token).await
  }

  pub async fn execute(&self, principal: &AuthenticatedCompany) -> Result<CompanyDto, AuthError> {
    let company = self.auth_service.current_company(principal).await?;
    Ok(CompanyDto::from(company))
  }
}
