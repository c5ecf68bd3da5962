use std::sync::Arc;
use uuid::Uuid;

use super::entities::{Company, CompanyProfile};
use super::errors::CompanyError;
use super::ports::CompanyRepository;
use super::value_objects::Cnpj;
use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::auth::errors::{AuthError, HashError};
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::value_objects::Password;
use crate::domain::invoice::entities::Customer;
use crate::domain::invoice::ports::CustomerRepository;

pub struct CompanyService {
  company_repo: Arc<dyn CompanyRepository>,
  customer_repo: Arc<dyn CustomerRepository>,
  password_hasher: Arc<dyn PasswordHasher>,
}

impl CompanyService {
  pub fn new(
    company_repo: Arc<dyn CompanyRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
  ) -> Self {
    Self {
      company_repo,
      customer_repo,
      password_hasher,
    }
  }

  /// Registers a company. CNPJ and email must both be unused.
  pub async fn create_company(
    &self,
    profile: CompanyProfile,
    password: Password,
  ) -> Result<Company, CompanyError> {
    if self.company_repo.find_by_cnpj(&profile.cnpj).await?.is_some() {
      return Err(CompanyError::CnpjAlreadyRegistered);
    }
    if self.company_repo.find_by_email(&profile.email).await?.is_some() {
      return Err(CompanyError::EmailAlreadyRegistered);
    }

    let password_hash = self.password_hasher.hash(&password).await?;
    let company = Company::new(profile, password_hash);

    let created = self.company_repo.create(company).await?;
    tracing::info!(company_id = %created.id, cnpj = %created.cnpj, "Company registered");
    Ok(created)
  }

  /// Loads a company the principal is allowed to see
  pub async fn get_company(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Uuid,
  ) -> Result<Company, CompanyError> {
    let company = self
      .company_repo
      .find_by_id(company_id)
      .await?
      .ok_or(CompanyError::NotFound(company_id))?;

    if !principal.can_access(company.id) {
      return Err(CompanyError::AccessDenied);
    }

    Ok(company)
  }

  /// Companies visible to the principal. A company only ever sees itself.
  pub async fn list_companies(
    &self,
    principal: &AuthenticatedCompany,
  ) -> Result<Vec<Company>, CompanyError> {
    let company = self.company_repo.find_by_id(principal.company_id).await?;
    Ok(company.into_iter().collect())
  }

  /// Company plus its customers, newest first
  pub async fn get_company_details(
    &self,
    principal: &AuthenticatedCompany,
    company_id: Uuid,
  ) -> Result<(Company, Vec<Customer>), CompanyError> {
    let company = self.get_company(principal, company_id).await?;
    let customers = self
      .customer_repo
      .find_by_company_id(company.id)
      .await
      .map_err(|e| CompanyError::Repository(e.to_string()))?;

    Ok((company, customers))
  }

  /// Makes sure the stored hash matches `password`, rehashing when it does not.
  /// Returns true when the hash was replaced.
  pub async fn ensure_password(
    &self,
    company: &Company,
    password: &Password,
  ) -> Result<bool, CompanyError> {
    match self
      .password_hasher
      .verify(password, &company.password_hash)
      .await
    {
      Ok(true) => return Ok(false),
      Ok(false) => {}
      // An unreadable stored hash is replaced like a stale one
      Err(AuthError::Hash(HashError::VerificationFailed(e))) => {
        tracing::warn!(company_id = %company.id, error = %e, "Stored password hash is unusable");
      }
      Err(e) => return Err(e.into()),
    }

    let password_hash = self.password_hasher.hash(password).await?;
    self
      .company_repo
      .update_password_hash(company.id, &password_hash)
      .await?;
    Ok(true)
  }

  pub async fn find_by_cnpj(&self, cnpj: &Cnpj) -> Result<Option<Company>, CompanyError> {
    self.company_repo.find_by_cnpj(cnpj).await
  }
}
