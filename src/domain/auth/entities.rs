use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The company a request acts on behalf of.
///
/// Companies are the login principal: every protected operation receives one
/// of these, built from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedCompany {
  pub company_id: Uuid,
  pub email: String,
}

impl AuthenticatedCompany {
  pub fn new(company_id: Uuid, email: impl Into<String>) -> Self {
    Self {
      company_id,
      email: email.into(),
    }
  }

  /// Whether this principal may act on resources owned by `company_id`
  pub fn can_access(&self, company_id: Uuid) -> bool {
    self.company_id == company_id
  }
}

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
  pub token: String,
  pub expires_at: DateTime<Utc>,
}

/// Claims recovered from a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
  pub company_id: Uuid,
  pub email: String,
  pub expires_at: DateTime<Utc>,
}
