use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{IssuedToken, TokenClaims};
use super::errors::AuthError;
use super::value_objects::{Email, Password, PasswordHash};

/// Trait for password hashing operations
#[async_trait]
pub trait PasswordHasher: Send + Sync {
  /// Hashes a plain text password
  async fn hash(&self, password: &Password) -> Result<PasswordHash, AuthError>;

  /// Verifies a plain text password against a stored hash
  async fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, AuthError>;
}

/// Trait for signing and verifying access tokens
pub trait TokenIssuer: Send + Sync {
  /// Signs a token for the given company
  fn issue(&self, company_id: Uuid, email: &Email) -> Result<IssuedToken, AuthError>;

  /// Verifies signature and expiry, returning the embedded claims
  fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}
