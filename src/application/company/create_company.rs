use std::sync::Arc;

use super::CompanyDto;
use crate::domain::auth::value_objects::{Email, Password};
use crate::domain::company::value_objects::optional_text;
use crate::domain::company::{
  Address, AddressInput, Cnpj, CompanyError, CompanyProfile, CompanyService, LegalName,
  TaxRegime, ValidationError,
};

/// Registration input, as typed by the user
#[derive(Debug, Clone, Default)]
pub struct CreateCompanyCommand {
  pub cnpj: String,
  pub legal_name: String,
  pub trade_name: Option<String>,
  pub email: String,
  pub password: String,
  pub tax_regime: Option<String>,
  pub municipal_registration: Option<String>,
  pub address: AddressInput,
}

pub struct CreateCompanyUseCase {
  company_service: Arc<CompanyService>,
}

impl CreateCompanyUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(&self, command: CreateCompanyCommand) -> Result<CompanyDto, CompanyError> {
    let tax_regime = match command.tax_regime.as_deref().map(str::trim) {
      Some(value) if !value.is_empty() => value.parse::<TaxRegime>()?,
      _ => TaxRegime::default(),
    };

    let profile = CompanyProfile {
      cnpj: Cnpj::new(&command.cnpj)?,
      legal_name: LegalName::new(command.legal_name)?,
      trade_name: optional_text(command.trade_name, "tradeName", 255)?,
      email: Email::new(command.email).map_err(ValidationError::from)?,
      tax_regime,
      municipal_registration: optional_text(
        command.municipal_registration,
        "municipalRegistration",
        50,
      )?,
      address: Address::new(command.address)?,
    };
    let password = Password::new(command.password).map_err(ValidationError::from)?;

    let company = self
      .company_service
      .create_company(profile, password)
      .await?;
    Ok(CompanyDto::from(company))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::Fixture;

  fn command() -> CreateCompanyCommand {
    CreateCompanyCommand {
      cnpj: "11.222.333/0001-81".to_string(),
      legal_name: "Nova Empresa Ltda".to_string(),
      trade_name: Some("  ".to_string()),
      email: "Contato@NovaEmpresa.com.br".to_string(),
      password: "senha-segura".to_string(),
      tax_regime: None,
      municipal_registration: None,
      address: AddressInput {
        city: Some("Recife".to_string()),
        state: Some("pe".to_string()),
        ..AddressInput::default()
      },
    }
  }

  #[tokio::test]
  async fn test_registration_normalizes_input() {
    let fx = Fixture::new().await;
    let use_case = CreateCompanyUseCase::new(fx.company_service.clone());

    let company = use_case.execute(command()).await.unwrap();

    assert_eq!(company.cnpj, "11222333000181");
    assert_eq!(company.email, "contato@novaempresa.com.br");
    assert_eq!(company.tax_regime, TaxRegime::Mei);
    assert_eq!(company.trade_name, None);
    assert_eq!(company.address_state.as_deref(), Some("PE"));
  }

  #[tokio::test]
  async fn test_invalid_fields_are_validation_errors() {
    let fx = Fixture::new().await;
    let use_case = CreateCompanyUseCase::new(fx.company_service.clone());

    let bad_cnpj = CreateCompanyCommand {
      cnpj: "11.222.333/0001-82".to_string(),
      ..command()
    };
    assert!(matches!(
      use_case.execute(bad_cnpj).await,
      Err(CompanyError::Validation(ValidationError::InvalidCnpj(_)))
    ));

    let short_password = CreateCompanyCommand {
      password: "123".to_string(),
      ..command()
    };
    assert!(matches!(
      use_case.execute(short_password).await,
      Err(CompanyError::Validation(ValidationError::ValueObject(_)))
    ));

    let bad_regime = CreateCompanyCommand {
      tax_regime: Some("LUCRO_REAL".to_string()),
      ..command()
    };
    assert!(matches!(
      use_case.execute(bad_regime).await,
      Err(CompanyError::Validation(ValidationError::InvalidTaxRegime(_)))
    ));
  }

  #[tokio::test]
  async fn test_existing_cnpj_conflicts() {
    let fx = Fixture::new().await;
    let use_case = CreateCompanyUseCase::new(fx.company_service.clone());

    let duplicate = CreateCompanyCommand {
      cnpj: "00000000000191".to_string(),
      ..command()
    };
    assert!(matches!(
      use_case.execute(duplicate).await,
      Err(CompanyError::CnpjAlreadyRegistered)
    ));
  }
}
