//! Creates the demo company used in development.
//!
//! Safe to run repeatedly: an existing company keeps its data and only gets
//! its password reset when it no longer matches.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meifin::{
  domain::auth::{Email, Password},
  domain::company::{
    Address, AddressInput, Cnpj, CompanyProfile, CompanyService, LegalName, TaxRegime,
  },
  infrastructure::{
    config::Config,
    persistence::postgres::{PostgresCompanyRepository, PostgresCustomerRepository},
    security::Argon2PasswordHasher,
  },
};

const DEMO_CNPJ: &str = "00000000000191";
const DEMO_EMAIL: &str = "admin@devmei.com";
const DEMO_PASSWORD: &str = "admin123";

fn demo_profile() -> anyhow::Result<CompanyProfile> {
  Ok(CompanyProfile {
    cnpj: Cnpj::new(DEMO_CNPJ)?,
    legal_name: LegalName::new("Dev MEI Ltda")?,
    trade_name: Some("Dev MEI".to_string()),
    email: Email::new(DEMO_EMAIL)?,
    tax_regime: TaxRegime::Mei,
    municipal_registration: Some("123456789".to_string()),
    address: Address::new(AddressInput {
      street: Some("Rua das Flores".to_string()),
      number: Some("123".to_string()),
      zip: Some("01310100".to_string()),
      city: Some("São Paulo".to_string()),
      state: Some("SP".to_string()),
    })?,
  })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meifin=info,seed=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::load().context("Failed to load configuration")?;

  let db_pool = PgPoolOptions::new()
    .max_connections(2)
    .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
    .connect(&config.database.url)
    .await
    .context("Could not connect to database")?;

  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;

  let company_service = CompanyService::new(
    Arc::new(PostgresCompanyRepository::new(db_pool.clone())),
    Arc::new(PostgresCustomerRepository::new(db_pool.clone())),
    Arc::new(Argon2PasswordHasher::new().context("Failed to create password hasher")?),
  );

  let profile = demo_profile()?;
  let password = Password::new(DEMO_PASSWORD)?;

  match company_service.find_by_cnpj(&profile.cnpj).await? {
    Some(company) => {
      if company_service.ensure_password(&company, &password).await? {
        tracing::info!(company_id = %company.id, "Demo company password reset");
      } else {
        tracing::info!(company_id = %company.id, "Demo company already up to date");
      }
    }
    None => {
      let company = company_service.create_company(profile, password).await?;
      tracing::info!(company_id = %company.id, "Demo company created");
    }
  }

  tracing::info!("Login with {} / {}", DEMO_EMAIL, DEMO_PASSWORD);
  Ok(())
}
