use async_trait::async_trait;
use uuid::Uuid;

use super::entities::Company;
use super::errors::CompanyError;
use super::value_objects::Cnpj;
use crate::domain::auth::value_objects::{Email, PasswordHash};

#[async_trait]
pub trait CompanyRepository: Send + Sync {
  async fn create(&self, company: Company) -> Result<Company, CompanyError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, CompanyError>;
  async fn find_by_email(&self, email: &Email) -> Result<Option<Company>, CompanyError>;
  async fn find_by_cnpj(&self, cnpj: &Cnpj) -> Result<Option<Company>, CompanyError>;
  async fn update_password_hash(
    &self,
    id: Uuid,
    password_hash: &PasswordHash,
  ) -> Result<(), CompanyError>;
}
