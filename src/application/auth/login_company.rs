use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for logging in a company
#[derive(Debug, Clone)]
pub struct LoginCompanyCommand {
  pub email: String,
  pub password: String,
}

/// Token issued on login, in the OAuth-style shape API clients expect
#[derive(Debug, Clone, Serialize)]
pub struct LoginCompanyResponse {
  pub access_token: String,
  pub token_type: &'static str,
  pub expires_at: DateTime<Utc>,
  #[serde(skip)]
  pub company_id: Uuid,
}

pub struct LoginCompanyUseCase {
  auth_service: Arc<AuthService>,
}

impl LoginCompanyUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// # Errors
  /// `AuthError::InvalidCredentials` for anything that cannot be a valid login,
  /// including input that fails the email or password rules.
  pub async fn execute(
    &self,
    command: LoginCompanyCommand,
  ) -> Result<LoginCompanyResponse, AuthError> {
    let email = Email::new(command.email).map_err(|_| AuthError::InvalidCredentials)?;
    let password = Password::new(command.password).map_err(|_| AuthError::InvalidCredentials)?;

    let (company, token) = self.auth_service.login(email, password).await?;

    Ok(LoginCompanyResponse {
      access_token: token.token,
      token_type: "Bearer",
      expires_at: token.expires_at,
      company_id: company.id,
    })
  }
}
