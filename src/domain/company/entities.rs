use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::{Address, Cnpj, LegalName, TaxRegime};
use crate::domain::auth::value_objects::{Email, PasswordHash};

/// Fiscal profile fields of a company, validated
#[derive(Debug, Clone)]
pub struct CompanyProfile {
  pub cnpj: Cnpj,
  pub legal_name: LegalName,
  pub trade_name: Option<String>,
  pub email: Email,
  pub tax_regime: TaxRegime,
  pub municipal_registration: Option<String>,
  pub address: Address,
}

/// A registered company. It is also the login principal.
#[derive(Debug, Clone)]
pub struct Company {
  pub id: Uuid,
  pub cnpj: Cnpj,
  pub legal_name: LegalName,
  pub trade_name: Option<String>,
  pub email: Email,
  pub password_hash: PasswordHash,
  pub tax_regime: TaxRegime,
  pub municipal_registration: Option<String>,
  pub address: Address,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Company {
  pub fn new(profile: CompanyProfile, password_hash: PasswordHash) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      cnpj: profile.cnpj,
      legal_name: profile.legal_name,
      trade_name: profile.trade_name,
      email: profile.email,
      password_hash,
      tax_regime: profile.tax_regime,
      municipal_registration: profile.municipal_registration,
      address: profile.address,
      created_at: now,
      updated_at: now,
    }
  }

  /// Name shown in listings: trade name when present
  pub fn display_name(&self) -> &str {
    self.trade_name.as_deref().unwrap_or(self.legal_name.as_str())
  }
}
