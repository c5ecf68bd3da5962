use thiserror::Error;

use super::value_objects::ValueObjectError;

/// Main authentication error type
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Invalid credentials")]
  InvalidCredentials,

  #[error("Invalid or expired token")]
  InvalidToken,

  #[error("Company for this token no longer exists")]
  CompanyNotFound,

  #[error("Repository error: {0}")]
  Repository(String),

  #[error("Hash error: {0}")]
  Hash(#[from] HashError),

  #[error("Token error: {0}")]
  Token(String),

  #[error("Value object error: {0}")]
  ValueObject(#[from] ValueObjectError),
}

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum HashError {
  #[error("Failed to hash password: {0}")]
  HashingFailed(String),

  #[error("Failed to verify password: {0}")]
  VerificationFailed(String),
}
