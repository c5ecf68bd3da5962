use std::sync::Arc;
use tokio::sync::OnceCell;

use super::entities::{AuthenticatedCompany, IssuedToken};
use super::errors::AuthError;
use super::ports::{PasswordHasher, TokenIssuer};
use super::value_objects::{Email, Password, PasswordHash};
use crate::domain::company::entities::Company;
use crate::domain::company::ports::CompanyRepository;

/// Verified against when the email is unknown so both failure paths cost a hash
const TIMING_DUMMY_PASSWORD: &str = "timing-dummy-password";

/// Authentication service implementing core business logic
pub struct AuthService {
  company_repo: Arc<dyn CompanyRepository>,
  password_hasher: Arc<dyn PasswordHasher>,
  token_issuer: Arc<dyn TokenIssuer>,
  dummy_hash: OnceCell<PasswordHash>,
}

impl AuthService {
  /// Creates a new instance of AuthService
  pub fn new(
    company_repo: Arc<dyn CompanyRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_issuer: Arc<dyn TokenIssuer>,
  ) -> Self {
    Self {
      company_repo,
      password_hasher,
      token_issuer,
      dummy_hash: OnceCell::new(),
    }
  }

  /// Authenticates a company by email and password and signs an access token
  ///
  /// # Errors
  /// Returns `AuthError::InvalidCredentials` for an unknown email or a wrong
  /// password, without telling the two apart.
  pub async fn login(
    &self,
    email: Email,
    password: Password,
  ) -> Result<(Company, IssuedToken), AuthError> {
    let company = self
      .company_repo
      .find_by_email(&email)
      .await
      .map_err(|e| AuthError::Repository(e.to_string()))?;

    let Some(company) = company else {
      let dummy = self.dummy_hash().await?;
      let _ = self.password_hasher.verify(&password, dummy).await;
      tracing::debug!("Login attempt for unknown email");
      return Err(AuthError::InvalidCredentials);
    };

    if !self
      .password_hasher
      .verify(&password, &company.password_hash)
      .await?
    {
      tracing::debug!(company_id = %company.id, "Login attempt with wrong password");
      return Err(AuthError::InvalidCredentials);
    }

    let token = self.token_issuer.issue(company.id, &company.email)?;
    tracing::info!(company_id = %company.id, "Company logged in");

    Ok((company, token))
  }

  /// Verifies an access token and checks the company still exists
  pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedCompany, AuthError> {
    if token.trim().is_empty() {
      return Err(AuthError::InvalidToken);
    }

    let claims = self.token_issuer.verify(token)?;

    let company = self
      .company_repo
      .find_by_id(claims.company_id)
      .await
      .map_err(|e| AuthError::Repository(e.to_string()))?
      .ok_or(AuthError::CompanyNotFound)?;

    Ok(AuthenticatedCompany::new(company.id, company.email.as_str()))
  }

  /// Loads the full company record behind a principal
  pub async fn current_company(
    &self,
    principal: &AuthenticatedCompany,
  ) -> Result<Company, AuthError> {
    self
      .company_repo
      .find_by_id(principal.company_id)
      .await
      .map_err(|e| AuthError::Repository(e.to_string()))?
      .ok_or(AuthError::CompanyNotFound)
  }

  async fn dummy_hash(&self) -> Result<&PasswordHash, AuthError> {
    self
      .dummy_hash
      .get_or_try_init(|| async {
        let password = Password::new(TIMING_DUMMY_PASSWORD)?;
        self.password_hasher.hash(&password).await
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::company::ports::CompanyRepository;
  use crate::infrastructure::security::JwtTokenIssuer;
  use crate::test_support::{InMemoryCompanyRepository, PlainPasswordHasher, demo_company};

  async fn service_with_demo() -> (AuthService, Company) {
    let companies = Arc::new(InMemoryCompanyRepository::default());
    let company = companies.create(demo_company("admin123")).await.unwrap();

    let service = AuthService::new(
      companies,
      Arc::new(PlainPasswordHasher),
      Arc::new(JwtTokenIssuer::new("test-secret", chrono::Duration::hours(24))),
    );
    (service, company)
  }

  #[tokio::test]
  async fn test_login_success_issues_token_for_company() {
    let (service, company) = service_with_demo().await;

    let (logged_in, token) = service
      .login(
        Email::new("admin@devmei.com").unwrap(),
        Password::new("admin123").unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(logged_in.id, company.id);
    let principal = service.authenticate(&token.token).await.unwrap();
    assert_eq!(principal.company_id, company.id);
    assert_eq!(principal.email, "admin@devmei.com");
  }

  #[tokio::test]
  async fn test_login_wrong_password() {
    let (service, _) = service_with_demo().await;

    let result = service
      .login(
        Email::new("admin@devmei.com").unwrap(),
        Password::new("wrong-password").unwrap(),
      )
      .await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
  }

  #[tokio::test]
  async fn test_login_unknown_email() {
    let (service, _) = service_with_demo().await;

    let result = service
      .login(
        Email::new("nobody@devmei.com").unwrap(),
        Password::new("admin123").unwrap(),
      )
      .await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
  }

  #[tokio::test]
  async fn test_authenticate_rejects_garbage() {
    let (service, _) = service_with_demo().await;

    assert!(matches!(
      service.authenticate("").await,
      Err(AuthError::InvalidToken)
    ));
    assert!(matches!(
      service.authenticate("not.a.jwt").await,
      Err(AuthError::InvalidToken)
    ));
  }

  #[tokio::test]
  async fn test_authenticate_rejects_token_of_deleted_company() {
    let (service, _) = service_with_demo().await;
    let issuer = JwtTokenIssuer::new("test-secret", chrono::Duration::hours(1));
    let orphan = issuer
      .issue(uuid::Uuid::new_v4(), &Email::new("ghost@devmei.com").unwrap())
      .unwrap();

    assert!(matches!(
      service.authenticate(&orphan.token).await,
      Err(AuthError::CompanyNotFound)
    ));
  }
}
