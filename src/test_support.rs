//! In-memory adapters and fixtures shared by the unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use testcontainers::ImageExt;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::redis::{REDIS_PORT, Redis};
use testcontainers_modules::testcontainers::{ContainerAsync, runners::AsyncRunner};
use uuid::Uuid;

use crate::domain::auth::{
  AuthError, AuthService, AuthenticatedCompany, Email, Password, PasswordHash, PasswordHasher,
  TokenIssuer,
};
use crate::domain::company::{
  Address, AddressInput, Cnpj, Company, CompanyError, CompanyProfile, CompanyRepository,
  CompanyService, LegalName, TaxDocument, TaxRegime,
};
use crate::domain::invoice::{
  Amount, Customer, CustomerData, CustomerName, CustomerRepository, Invoice, InvoiceData,
  InvoiceDescription, InvoiceError, InvoiceNumber, InvoiceRepository, InvoiceService,
  InvoiceServiceDependencies, InvoiceStatus, NfseAuthorization, Phone, ServiceCode,
};
use crate::infrastructure::nfse::SimulatedNfseGateway;
use crate::infrastructure::queue::InMemoryEmissionQueue;
use crate::infrastructure::security::JwtTokenIssuer;

pub const TEST_JWT_SECRET: &str = "test-secret";

// ============================================================================
// Password hasher
// ============================================================================

/// Reversible stand-in for Argon2 so service tests stay fast
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
  async fn hash(&self, password: &Password) -> Result<PasswordHash, AuthError> {
    Ok(PasswordHash::from_hash(format!(
      "$plain$v=1${}",
      password.as_str()
    ))?)
  }

  async fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, AuthError> {
    Ok(hash.as_str() == format!("$plain$v=1${}", password.as_str()))
  }
}

// ============================================================================
// Repositories
// ============================================================================

#[derive(Default)]
pub struct InMemoryCompanyRepository {
  companies: Mutex<Vec<Company>>,
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
  async fn create(&self, company: Company) -> Result<Company, CompanyError> {
    let mut companies = self.companies.lock().unwrap();
    if companies.iter().any(|c| c.cnpj == company.cnpj) {
      return Err(CompanyError::CnpjAlreadyRegistered);
    }
    if companies.iter().any(|c| c.email == company.email) {
      return Err(CompanyError::EmailAlreadyRegistered);
    }
    companies.push(company.clone());
    Ok(company)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, CompanyError> {
    let companies = self.companies.lock().unwrap();
    Ok(companies.iter().find(|c| c.id == id).cloned())
  }

  async fn find_by_email(&self, email: &Email) -> Result<Option<Company>, CompanyError> {
    let companies = self.companies.lock().unwrap();
    Ok(companies.iter().find(|c| &c.email == email).cloned())
  }

  async fn find_by_cnpj(&self, cnpj: &Cnpj) -> Result<Option<Company>, CompanyError> {
    let companies = self.companies.lock().unwrap();
    Ok(companies.iter().find(|c| &c.cnpj == cnpj).cloned())
  }

  async fn update_password_hash(
    &self,
    id: Uuid,
    password_hash: &PasswordHash,
  ) -> Result<(), CompanyError> {
    let mut companies = self.companies.lock().unwrap();
    let company = companies
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or(CompanyError::NotFound(id))?;
    company.password_hash = password_hash.clone();
    company.updated_at = Utc::now();
    Ok(())
  }
}

/// Newest first; entries created within the same instant keep reverse
/// insertion order
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
  let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
  sorted.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
  sorted
}

#[derive(Default)]
pub struct InMemoryCustomerRepository {
  customers: Mutex<Vec<Customer>>,
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
  async fn create(&self, customer: Customer) -> Result<Customer, InvoiceError> {
    self.customers.lock().unwrap().push(customer.clone());
    Ok(customer)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, InvoiceError> {
    let customers = self.customers.lock().unwrap();
    Ok(customers.iter().find(|c| c.id == id).cloned())
  }

  async fn find_by_company_id(&self, company_id: Uuid) -> Result<Vec<Customer>, InvoiceError> {
    let customers = self.customers.lock().unwrap();
    let owned: Vec<Customer> = customers
      .iter()
      .filter(|c| c.company_id == company_id)
      .cloned()
      .collect();
    Ok(newest_first(&owned, |c| c.created_at))
  }
}

#[derive(Default)]
pub struct InMemoryInvoiceRepository {
  invoices: Mutex<Vec<Invoice>>,
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    self.invoices.lock().unwrap().push(invoice.clone());
    Ok(invoice)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let invoices = self.invoices.lock().unwrap();
    Ok(invoices.iter().find(|i| i.id == id).cloned())
  }

  async fn find_by_company_id(&self, company_id: Uuid) -> Result<Vec<Invoice>, InvoiceError> {
    let invoices = self.invoices.lock().unwrap();
    let owned: Vec<Invoice> = invoices
      .iter()
      .filter(|i| i.company_id == company_id)
      .cloned()
      .collect();
    Ok(newest_first(&owned, |i| i.created_at))
  }

  async fn find_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>, InvoiceError> {
    let invoices = self.invoices.lock().unwrap();
    Ok(
      invoices
        .iter()
        .filter(|i| i.status == status)
        .cloned()
        .collect(),
    )
  }

  async fn mark_pending(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let mut invoices = self.invoices.lock().unwrap();
    match invoices
      .iter_mut()
      .find(|i| i.id == id && i.status == InvoiceStatus::Draft)
    {
      Some(invoice) => {
        invoice.change_status(InvoiceStatus::Pending)?;
        Ok(Some(invoice.clone()))
      }
      None => Ok(None),
    }
  }

  async fn revert_pending(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let mut invoices = self.invoices.lock().unwrap();
    match invoices
      .iter_mut()
      .find(|i| i.id == id && i.status == InvoiceStatus::Pending)
    {
      Some(invoice) => {
        invoice.status = InvoiceStatus::Draft;
        invoice.updated_at = Utc::now();
        Ok(Some(invoice.clone()))
      }
      None => Ok(None),
    }
  }

  async fn authorize(
    &self,
    id: Uuid,
    invoice_number: &InvoiceNumber,
    issued_at: DateTime<Utc>,
  ) -> Result<Option<Invoice>, InvoiceError> {
    let mut invoices = self.invoices.lock().unwrap();
    match invoices
      .iter_mut()
      .find(|i| i.id == id && i.status == InvoiceStatus::Pending)
    {
      Some(invoice) => {
        invoice.authorize(&NfseAuthorization {
          invoice_number: invoice_number.clone(),
          issued_at,
        })?;
        Ok(Some(invoice.clone()))
      }
      None => Ok(None),
    }
  }
}

// ============================================================================
// Sample data
// ============================================================================

pub fn demo_profile() -> CompanyProfile {
  CompanyProfile {
    cnpj: Cnpj::new("00000000000191").unwrap(),
    legal_name: LegalName::new("Dev MEI Ltda").unwrap(),
    trade_name: Some("Dev MEI".to_string()),
    email: Email::new("admin@devmei.com").unwrap(),
    tax_regime: TaxRegime::Mei,
    municipal_registration: Some("123456789".to_string()),
    address: Address::new(AddressInput {
      street: Some("Rua das Flores".to_string()),
      number: Some("123".to_string()),
      zip: Some("01310100".to_string()),
      city: Some("São Paulo".to_string()),
      state: Some("SP".to_string()),
    })
    .unwrap(),
  }
}

pub fn demo_company(password: &str) -> Company {
  Company::new(
    demo_profile(),
    PasswordHash::from_hash(format!("$plain$v=1${}", password)).unwrap(),
  )
}

pub fn customer_data(name: &str) -> CustomerData {
  CustomerData {
    name: CustomerName::new(name).unwrap(),
    document: TaxDocument::parse("52998224725").unwrap(),
    email: Some(Email::new("cliente@example.com").unwrap()),
    phone: Some(Phone::new("(11) 98765-4321").unwrap()),
    address: Address::new(AddressInput {
      city: Some("Campinas".to_string()),
      state: Some("SP".to_string()),
      ..AddressInput::default()
    })
    .unwrap(),
  }
}

// ============================================================================
// Fixture
// ============================================================================

/// Services wired to in-memory adapters, with the demo company registered and
/// signed in
pub struct Fixture {
  pub companies: Arc<InMemoryCompanyRepository>,
  pub customers: Arc<InMemoryCustomerRepository>,
  pub invoices: Arc<InMemoryInvoiceRepository>,
  pub queue: Arc<InMemoryEmissionQueue>,
  pub auth_service: Arc<AuthService>,
  pub company_service: Arc<CompanyService>,
  pub invoice_service: Arc<InvoiceService>,
  pub token_issuer: Arc<JwtTokenIssuer>,
  pub company: Company,
  pub principal: AuthenticatedCompany,
  pub token: String,
}

impl Fixture {
  pub async fn new() -> Self {
    let companies = Arc::new(InMemoryCompanyRepository::default());
    let customers = Arc::new(InMemoryCustomerRepository::default());
    let invoices = Arc::new(InMemoryInvoiceRepository::default());
    let queue = Arc::new(InMemoryEmissionQueue::new(Duration::from_millis(50)));
    let token_issuer = Arc::new(JwtTokenIssuer::new(
      TEST_JWT_SECRET,
      chrono::Duration::hours(24),
    ));

    let auth_service = Arc::new(AuthService::new(
      companies.clone(),
      Arc::new(PlainPasswordHasher),
      token_issuer.clone(),
    ));
    let company_service = Arc::new(CompanyService::new(
      companies.clone(),
      customers.clone(),
      Arc::new(PlainPasswordHasher),
    ));
    let invoice_service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
      invoice_repo: invoices.clone(),
      customer_repo: customers.clone(),
      company_repo: companies.clone(),
      emission_queue: queue.clone(),
      nfse_gateway: Arc::new(SimulatedNfseGateway::new(Duration::ZERO)),
    }));

    let company = companies.create(demo_company("admin123")).await.unwrap();
    let principal = AuthenticatedCompany::new(company.id, company.email.as_str());
    let token = token_issuer
      .issue(company.id, &company.email)
      .unwrap()
      .token;

    Self {
      companies,
      customers,
      invoices,
      queue,
      auth_service,
      company_service,
      invoice_service,
      token_issuer,
      company,
      principal,
      token,
    }
  }

  /// A second tenant, not signed in
  pub async fn other_company(&self) -> Company {
    let profile = CompanyProfile {
      cnpj: Cnpj::new("11222333000181").unwrap(),
      legal_name: LegalName::new("Outra Empresa Ltda").unwrap(),
      trade_name: None,
      email: Email::new("contato@outra.com.br").unwrap(),
      tax_regime: TaxRegime::SimplesNacional,
      municipal_registration: None,
      address: Address::default(),
    };
    let hash = PasswordHash::from_hash("$plain$v=1$outra-senha").unwrap();
    self
      .companies
      .create(Company::new(profile, hash))
      .await
      .unwrap()
  }

  pub async fn customer(&self) -> Customer {
    self
      .customers
      .create(Customer::new(self.company.id, customer_data("Maria Souza")))
      .await
      .unwrap()
  }

  pub async fn draft_invoice(&self) -> Invoice {
    let customer = self.customer().await;
    let (invoice, _, _) = self
      .invoice_service
      .create_invoice(
        &self.principal,
        InvoiceData {
          company_id: self.company.id,
          customer_id: customer.id,
          amount: Amount::new(dec!(1500.00)).unwrap(),
          description: InvoiceDescription::new("Desenvolvimento de sistema web").unwrap(),
          service_code: ServiceCode::new(ServiceCode::DEFAULT).unwrap(),
        },
      )
      .await
      .unwrap();
    invoice
  }
}

// ============================================================================
// Postgres
// ============================================================================

/// Fresh migrated database in a throwaway container
pub async fn postgres() -> (PgPool, ContainerAsync<Postgres>) {
  let container = Postgres::default()
    .with_tag("16-alpine")
    .start()
    .await
    .expect("Failed to start postgres container");

  let host = container.get_host().await.expect("Failed to get host");
  let port = container
    .get_host_port_ipv4(5432)
    .await
    .expect("Failed to get port");
  let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

  let pool = PgPoolOptions::new()
    .max_connections(5)
    .connect(&database_url)
    .await
    .expect("Failed to connect to test database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  (pool, container)
}

// ============================================================================
// Redis
// ============================================================================

/// Empty Redis in a throwaway container. BRPOP with a fractional timeout
/// needs Redis 6 or newer.
pub async fn redis_server() -> (redis::Client, ContainerAsync<Redis>) {
  let container = Redis::default()
    .with_tag("7-alpine")
    .start()
    .await
    .expect("Failed to start redis container");

  let host = container.get_host().await.expect("Failed to get host");
  let port = container
    .get_host_port_ipv4(REDIS_PORT)
    .await
    .expect("Failed to get port");

  let client =
    redis::Client::open(format!("redis://{}:{}", host, port)).expect("Invalid Redis URL");
  (client, container)
}
