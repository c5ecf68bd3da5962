use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::application::company::CreateCompanyCommand;
use crate::application::invoice::{CreateCustomerCommand, CreateInvoiceCommand};
use crate::domain::company::AddressInput;

/// Request for company login
///
/// Not validated here: malformed input answers 401 like any other bad login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

/// Request for company registration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
  #[validate(length(min = 14, max = 18, message = "CNPJ must have 14 digits"))]
  pub cnpj: String,

  #[validate(length(
    min = 3,
    max = 255,
    message = "Legal name must be between 3 and 255 characters"
  ))]
  pub legal_name: String,

  #[validate(length(max = 255, message = "Trade name must be at most 255 characters"))]
  pub trade_name: Option<String>,

  #[validate(email(message = "Invalid email format"))]
  pub email: String,

  #[validate(length(
    min = 8,
    max = 128,
    message = "Password must be between 8 and 128 characters"
  ))]
  pub password: String,

  /// Defaults to MEI
  pub tax_regime: Option<String>,

  pub municipal_registration: Option<String>,
  pub address_street: Option<String>,
  pub address_number: Option<String>,
  pub address_zip: Option<String>,
  pub address_city: Option<String>,
  pub address_state: Option<String>,
}

impl From<CreateCompanyRequest> for CreateCompanyCommand {
  fn from(request: CreateCompanyRequest) -> Self {
    CreateCompanyCommand {
      cnpj: request.cnpj,
      legal_name: request.legal_name,
      trade_name: request.trade_name,
      email: request.email,
      password: request.password,
      tax_regime: request.tax_regime,
      municipal_registration: request.municipal_registration,
      address: AddressInput {
        street: request.address_street,
        number: request.address_number,
        zip: request.address_zip,
        city: request.address_city,
        state: request.address_state,
      },
    }
  }
}

/// Request for creating a customer (tomador) under a company
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
  #[validate(length(
    min = 3,
    max = 255,
    message = "Name must be between 3 and 255 characters"
  ))]
  pub name: String,

  /// CPF or CNPJ, with or without punctuation
  #[validate(length(min = 11, max = 18, message = "Document must be a CPF or a CNPJ"))]
  pub document: String,

  #[validate(email(message = "Invalid email format"))]
  pub email: Option<String>,

  pub phone: Option<String>,
  pub address_street: Option<String>,
  pub address_number: Option<String>,
  pub address_zip: Option<String>,
  pub address_city: Option<String>,
  pub address_state: Option<String>,
}

impl CreateCustomerRequest {
  pub fn into_command(self, company_id: Uuid) -> CreateCustomerCommand {
    CreateCustomerCommand {
      company_id,
      name: self.name,
      document: self.document,
      email: self.email,
      phone: self.phone,
      address: AddressInput {
        street: self.address_street,
        number: self.address_number,
        zip: self.address_zip,
        city: self.address_city,
        state: self.address_state,
      },
    }
  }
}

/// Request for creating a DRAFT invoice
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
  pub company_id: Uuid,
  pub customer_id: Uuid,

  /// Accepts a JSON number or a decimal string
  pub amount: Decimal,

  #[validate(length(min = 1, message = "Description is required"))]
  pub description: String,

  /// LC 116 service item, "1.03" when omitted
  pub service_code: Option<String>,
}

impl From<CreateInvoiceRequest> for CreateInvoiceCommand {
  fn from(request: CreateInvoiceRequest) -> Self {
    CreateInvoiceCommand {
      company_id: request.company_id,
      customer_id: request.customer_id,
      amount: request.amount,
      description: request.description,
      service_code: request.service_code,
    }
  }
}

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional additional details
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

/// Dashboard login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
  pub email: String,
  pub password: String,
}

/// Dashboard "Cadastrar empresa" form. Serialized back into the page when
/// registration fails, without the password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
  pub cnpj: String,
  pub legal_name: String,
  #[serde(default)]
  pub trade_name: String,
  pub email: String,
  #[serde(default, skip_serializing)]
  pub password: String,
  #[serde(default)]
  pub tax_regime: String,
  #[serde(default)]
  pub municipal_registration: String,
  #[serde(default)]
  pub street: String,
  #[serde(default)]
  pub number: String,
  #[serde(default)]
  pub zip: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub state: String,
}

impl RegisterForm {
  pub fn to_command(&self) -> CreateCompanyCommand {
    CreateCompanyCommand {
      cnpj: self.cnpj.clone(),
      legal_name: self.legal_name.clone(),
      trade_name: non_blank(self.trade_name.clone()),
      email: self.email.clone(),
      password: self.password.clone(),
      tax_regime: non_blank(self.tax_regime.clone()),
      municipal_registration: non_blank(self.municipal_registration.clone()),
      address: AddressInput {
        street: non_blank(self.street.clone()),
        number: non_blank(self.number.clone()),
        zip: non_blank(self.zip.clone()),
        city: non_blank(self.city.clone()),
        state: non_blank(self.state.clone()),
      },
    }
  }
}

/// Dashboard "Novo cliente" form; empty inputs arrive as empty strings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerForm {
  pub name: String,
  pub document: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub street: String,
  #[serde(default)]
  pub number: String,
  #[serde(default)]
  pub zip: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub state: String,
}

fn non_blank(value: String) -> Option<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

impl CustomerForm {
  pub fn into_command(self, company_id: Uuid) -> CreateCustomerCommand {
    CreateCustomerCommand {
      company_id,
      name: self.name,
      document: self.document,
      email: non_blank(self.email),
      phone: non_blank(self.phone),
      address: AddressInput {
        street: non_blank(self.street),
        number: non_blank(self.number),
        zip: non_blank(self.zip),
        city: non_blank(self.city),
        state: non_blank(self.state),
      },
    }
  }
}

/// Dashboard "Nova nota fiscal" form
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceForm {
  pub customer_id: String,
  /// Typed by hand, "1.234,56" and "1234.56" are both accepted
  pub amount: String,
  pub description: String,
  #[serde(default)]
  pub service_code: String,
}

impl InvoiceForm {
  pub fn into_command(self, company_id: Uuid) -> Result<CreateInvoiceCommand, String> {
    let customer_id =
      Uuid::parse_str(self.customer_id.trim()).map_err(|_| "Selecione um cliente".to_string())?;
    let amount = parse_amount(&self.amount).ok_or_else(|| "Valor inválido".to_string())?;

    Ok(CreateInvoiceCommand {
      company_id,
      customer_id,
      amount,
      description: self.description,
      service_code: non_blank(self.service_code),
    })
  }
}

/// "Emitir" button; the hidden company id only decides where to go back to
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmitInvoiceForm {
  #[serde(default)]
  pub company_id: String,
}

impl EmitInvoiceForm {
  pub fn return_path(&self) -> String {
    match Uuid::parse_str(self.company_id.trim()) {
      Ok(id) => format!("/companies/{}", id),
      Err(_) => "/".to_string(),
    }
  }
}

/// Parses a money amount in Brazilian ("1.234,56") or plain ("1234.56") notation
pub fn parse_amount(input: &str) -> Option<Decimal> {
  let cleaned = input.trim().trim_start_matches("R$").trim();
  if cleaned.is_empty() {
    return None;
  }

  let normalized = if cleaned.contains(',') {
    cleaned.replace('.', "").replace(',', ".")
  } else {
    cleaned.to_string()
  };

  Decimal::from_str(&normalized).ok()
}

/// Flash message carried in the query string after a dashboard form redirect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlashQuery {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notice: Option<String>,
  /// Which tab the company page opens on
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tab: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_create_company_request_validation() {
    let request: CreateCompanyRequest = serde_json::from_value(serde_json::json!({
      "cnpj": "11.222.333/0001-81",
      "legalName": "AB",
      "email": "not-an-email",
      "password": "123"
    }))
    .unwrap();

    let errors = request.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("legal_name"));
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
    assert!(!fields.contains_key("cnpj"));
  }

  #[test]
  fn test_create_company_request_maps_flat_address() {
    let request: CreateCompanyRequest = serde_json::from_value(serde_json::json!({
      "cnpj": "11222333000181",
      "legalName": "Outra Empresa Ltda",
      "email": "contato@outra.com.br",
      "password": "secret123",
      "addressCity": "Campinas",
      "addressState": "SP"
    }))
    .unwrap();
    assert!(request.validate().is_ok());

    let command = CreateCompanyCommand::from(request);
    assert_eq!(command.address.city.as_deref(), Some("Campinas"));
    assert_eq!(command.address.state.as_deref(), Some("SP"));
    assert!(command.tax_regime.is_none());
  }

  #[test]
  fn test_create_invoice_request_accepts_number_or_string() {
    let company_id = Uuid::new_v4();
    let customer_id = Uuid::new_v4();

    let from_number: CreateInvoiceRequest = serde_json::from_value(serde_json::json!({
      "companyId": company_id,
      "customerId": customer_id,
      "amount": 150.5,
      "description": "Desenvolvimento de software"
    }))
    .unwrap();
    assert_eq!(from_number.amount, dec!(150.5));
    assert!(from_number.service_code.is_none());

    let from_string: CreateInvoiceRequest = serde_json::from_value(serde_json::json!({
      "companyId": company_id,
      "customerId": customer_id,
      "amount": "1500.00",
      "description": "Consultoria",
      "serviceCode": "1.07"
    }))
    .unwrap();
    assert_eq!(from_string.amount, dec!(1500.00));
    assert_eq!(from_string.service_code.as_deref(), Some("1.07"));
  }

  #[test]
  fn test_parse_amount() {
    assert_eq!(parse_amount("1.234,56"), Some(dec!(1234.56)));
    assert_eq!(parse_amount("1234,5"), Some(dec!(1234.5)));
    assert_eq!(parse_amount("R$ 99.90"), Some(dec!(99.90)));
    assert_eq!(parse_amount("  "), None);
    assert_eq!(parse_amount("abc"), None);
  }

  #[test]
  fn test_customer_form_blank_fields_become_none() {
    let form = CustomerForm {
      name: "Maria Souza".to_string(),
      document: "529.982.247-25".to_string(),
      email: "  ".to_string(),
      city: "Campinas".to_string(),
      ..Default::default()
    };

    let command = form.into_command(Uuid::new_v4());
    assert!(command.email.is_none());
    assert!(command.phone.is_none());
    assert_eq!(command.address.city.as_deref(), Some("Campinas"));
    assert!(command.address.street.is_none());
  }

  #[test]
  fn test_register_form_keeps_password_out_of_the_page() {
    let form = RegisterForm {
      cnpj: "11.222.333/0001-81".to_string(),
      legal_name: "Nova Empresa Ltda".to_string(),
      email: "contato@novaempresa.com.br".to_string(),
      password: "senha-segura".to_string(),
      tax_regime: "SIMPLES_NACIONAL".to_string(),
      city: "Recife".to_string(),
      ..Default::default()
    };

    let command = form.to_command();
    assert_eq!(command.password, "senha-segura");
    assert_eq!(command.tax_regime.as_deref(), Some("SIMPLES_NACIONAL"));
    assert!(command.trade_name.is_none());
    assert_eq!(command.address.city.as_deref(), Some("Recife"));

    let echoed = serde_json::to_value(&form).unwrap();
    assert!(echoed.get("password").is_none());
    assert_eq!(echoed["legal_name"], "Nova Empresa Ltda");
  }

  #[test]
  fn test_emit_form_return_path() {
    let id = Uuid::new_v4();
    let form = EmitInvoiceForm {
      company_id: id.to_string(),
    };
    assert_eq!(form.return_path(), format!("/companies/{}", id));
    assert_eq!(EmitInvoiceForm::default().return_path(), "/");
  }

  #[test]
  fn test_invoice_form_rejects_missing_customer() {
    let form = InvoiceForm {
      customer_id: String::new(),
      amount: "100,00".to_string(),
      description: "Serviço".to_string(),
      service_code: String::new(),
    };
    assert_eq!(
      form.into_command(Uuid::new_v4()).unwrap_err(),
      "Selecione um cliente"
    );
  }
}
