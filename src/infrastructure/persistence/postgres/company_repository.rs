use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::auth::value_objects::{Email, PasswordHash};
use crate::domain::company::{
  entities::Company,
  errors::{CompanyError, ValidationError},
  ports::CompanyRepository,
  value_objects::{Address, Cnpj, LegalName, StateCode, TaxRegime},
};

const COMPANY_COLUMNS: &str = "id, cnpj, legal_name, trade_name, email, password_hash, tax_regime, \
   municipal_registration, street, number, zip, city, state, created_at, updated_at";

/// Database row structure for companies table
#[derive(Debug, FromRow)]
struct CompanyRow {
  id: Uuid,
  cnpj: String,
  legal_name: String,
  trade_name: Option<String>,
  email: String,
  password_hash: String,
  tax_regime: String,
  municipal_registration: Option<String>,
  street: Option<String>,
  number: Option<String>,
  zip: Option<String>,
  city: Option<String>,
  state: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
  type Error = CompanyError;

  fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
    Ok(Company {
      id: row.id,
      cnpj: Cnpj::new(&row.cnpj)?,
      legal_name: LegalName::new(row.legal_name)?,
      trade_name: row.trade_name,
      email: Email::new(row.email).map_err(ValidationError::from)?,
      password_hash: PasswordHash::from_hash(row.password_hash).map_err(ValidationError::from)?,
      tax_regime: row.tax_regime.parse::<TaxRegime>()?,
      municipal_registration: row.municipal_registration,
      address: Address {
        street: row.street,
        number: row.number,
        zip: row.zip,
        city: row.city,
        state: row.state.map(StateCode::new).transpose()?,
      },
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

/// PostgreSQL implementation of the CompanyRepository trait
pub struct PostgresCompanyRepository {
  pool: PgPool,
}

impl PostgresCompanyRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn find_one(&self, column: &str, value: &str) -> Result<Option<Company>, CompanyError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
      "SELECT {} FROM companies WHERE {} = $1",
      COMPANY_COLUMNS, column
    ))
    .bind(value)
    .fetch_optional(&self.pool)
    .await?;

    row.map(Company::try_from).transpose()
  }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
  async fn create(&self, company: Company) -> Result<Company, CompanyError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
      r#"
            INSERT INTO companies (
                id, cnpj, legal_name, trade_name, email, password_hash, tax_regime,
                municipal_registration, street, number, zip, city, state, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
      COMPANY_COLUMNS
    ))
    .bind(company.id)
    .bind(company.cnpj.as_str())
    .bind(company.legal_name.as_str())
    .bind(company.trade_name.as_deref())
    .bind(company.email.as_str())
    .bind(company.password_hash.as_str())
    .bind(company.tax_regime.as_str())
    .bind(company.municipal_registration.as_deref())
    .bind(company.address.street.as_deref())
    .bind(company.address.number.as_deref())
    .bind(company.address.zip.as_deref())
    .bind(company.address.city.as_deref())
    .bind(company.address.state.as_ref().map(|s| s.as_str()))
    .bind(company.created_at)
    .bind(company.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      tracing::warn!(cnpj = %company.cnpj, "Failed to insert company: {}", e);
      CompanyError::from(e)
    })?;

    row.try_into()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, CompanyError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
      "SELECT {} FROM companies WHERE id = $1",
      COMPANY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(Company::try_from).transpose()
  }

  async fn find_by_email(&self, email: &Email) -> Result<Option<Company>, CompanyError> {
    self.find_one("email", email.as_str()).await
  }

  async fn find_by_cnpj(&self, cnpj: &Cnpj) -> Result<Option<Company>, CompanyError> {
    self.find_one("cnpj", cnpj.as_str()).await
  }

  async fn update_password_hash(
    &self,
    id: Uuid,
    password_hash: &PasswordHash,
  ) -> Result<(), CompanyError> {
    let result =
      sqlx::query("UPDATE companies SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(password_hash.as_str())
        .execute(&self.pool)
        .await?;

    if result.rows_affected() == 0 {
      return Err(CompanyError::NotFound(id));
    }

    Ok(())
  }
}
