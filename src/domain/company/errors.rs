use thiserror::Error;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::value_objects::ValueObjectError;

#[derive(Debug, Error)]
pub enum CompanyError {
  #[error("Company not found: {0}")]
  NotFound(Uuid),

  #[error("Access to this company is not allowed")]
  AccessDenied,

  #[error("A company with this CNPJ is already registered")]
  CnpjAlreadyRegistered,

  #[error("A company with this email is already registered")]
  EmailAlreadyRegistered,

  #[error("Repository error: {0}")]
  Repository(String),

  #[error("Validation error: {0}")]
  Validation(#[from] ValidationError),

  #[error("Auth error: {0}")]
  Auth(#[from] AuthError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Invalid CNPJ: {0}")]
  InvalidCnpj(String),

  #[error("Invalid CPF: {0}")]
  InvalidCpf(String),

  #[error("Document must be a CPF (11 digits) or a CNPJ (14 digits)")]
  InvalidDocument,

  #[error("Legal name must be between {min} and {max} characters")]
  LegalNameLength { min: usize, max: usize },

  #[error("Field '{field}' must be at most {max} characters")]
  FieldTooLong { field: String, max: usize },

  #[error("State must be a 2-letter UF code")]
  InvalidState,

  #[error("Unknown tax regime: {0}")]
  InvalidTaxRegime(String),

  #[error("{0}")]
  ValueObject(#[from] ValueObjectError),
}

impl From<sqlx::Error> for CompanyError {
  fn from(error: sqlx::Error) -> Self {
    if let sqlx::Error::Database(db_err) = &error {
      if db_err.is_unique_violation() {
        return match db_err.constraint() {
          Some(constraint) if constraint.contains("email") => CompanyError::EmailAlreadyRegistered,
          _ => CompanyError::CnpjAlreadyRegistered,
        };
      }
    }
    CompanyError::Repository(error.to_string())
  }
}
