use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
  static ref SERVICE_CODE_PATTERN: Regex =
    Regex::new(r"^\d{1,2}\.\d{2}$").expect("service code pattern is a valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid customer name: {0}")]
  InvalidCustomerName(String),
  #[error("Invalid phone: {0}")]
  InvalidPhone(String),
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),
  #[error("Invalid description: {0}")]
  InvalidDescription(String),
  #[error("Invalid service code: {0}")]
  InvalidServiceCode(String),
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Unknown invoice status: {0}")]
  InvalidStatus(String),
}

// Customer Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerName(String);

impl CustomerName {
  pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let trimmed = value.into().trim().to_string();
    let length = trimmed.chars().count();
    if length < 3 {
      return Err(ValueObjectError::InvalidCustomerName(
        "Customer name must have at least 3 characters".to_string(),
      ));
    }
    if length > 255 {
      return Err(ValueObjectError::InvalidCustomerName(
        "Customer name cannot exceed 255 characters".to_string(),
      ));
    }
    Ok(Self(trimmed))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CustomerName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Phone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone(String);

impl Phone {
  pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.chars().count() > 20 {
      return Err(ValueObjectError::InvalidPhone(
        "Phone cannot exceed 20 characters".to_string(),
      ));
    }
    if !trimmed
      .chars()
      .all(|c| c.is_ascii_digit() || " +-()".contains(c))
    {
      return Err(ValueObjectError::InvalidPhone(
        "Phone may only contain digits, spaces, +, -, ( and )".to_string(),
      ));
    }
    Ok(Self(trimmed))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Amount - BRL, exact to the centavo
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
  const MIN: Decimal = dec!(0.01);
  const MAX: Decimal = dec!(9999999999.99);

  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    let mut normalized = value.normalize();
    if normalized.scale() > 2 {
      return Err(ValueObjectError::InvalidAmount(
        "Amount cannot have more than 2 decimal places".to_string(),
      ));
    }
    if normalized < Self::MIN {
      return Err(ValueObjectError::InvalidAmount(
        "Amount must be at least 0.01".to_string(),
      ));
    }
    if normalized > Self::MAX {
      return Err(ValueObjectError::InvalidAmount(
        "Amount is too large".to_string(),
      ));
    }
    normalized.rescale(2);
    Ok(Self(normalized))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.2}", self.0)
  }
}

// Service description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDescription(String);

impl InvoiceDescription {
  pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot be empty".to_string(),
      ));
    }
    if trimmed.chars().count() > 500 {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot exceed 500 characters".to_string(),
      ));
    }
    Ok(Self(trimmed))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Municipal service list item, e.g. "1.03"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCode(String);

impl ServiceCode {
  pub const DEFAULT: &'static str = "1.03";

  pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let trimmed = value.into().trim().to_string();
    if !SERVICE_CODE_PATTERN.is_match(&trimmed) {
      return Err(ValueObjectError::InvalidServiceCode(format!(
        "'{}' is not a service list item like 1.03",
        trimmed
      )));
    }
    Ok(Self(trimmed))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
  Draft,
  Pending,
  Processing,
  Authorized,
  Error,
  Canceled,
}

impl InvoiceStatus {
  /// Only emission (Draft -> Pending) and its completion (Pending -> Authorized) exist
  pub fn can_transition_to(&self, new_status: InvoiceStatus) -> bool {
    matches!(
      (self, new_status),
      (InvoiceStatus::Draft, InvoiceStatus::Pending)
        | (InvoiceStatus::Pending, InvoiceStatus::Authorized)
    )
  }

  pub fn is_emittable(&self) -> bool {
    matches!(self, InvoiceStatus::Draft)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "DRAFT",
      InvoiceStatus::Pending => "PENDING",
      InvoiceStatus::Processing => "PROCESSING",
      InvoiceStatus::Authorized => "AUTHORIZED",
      InvoiceStatus::Error => "ERROR",
      InvoiceStatus::Canceled => "CANCELED",
    }
  }

  /// Portuguese label used by the dashboard
  pub fn label(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "Rascunho",
      InvoiceStatus::Pending => "Pendente",
      InvoiceStatus::Processing => "Processando",
      InvoiceStatus::Authorized => "Autorizada",
      InvoiceStatus::Error => "Erro",
      InvoiceStatus::Canceled => "Cancelada",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "DRAFT" => Ok(InvoiceStatus::Draft),
      "PENDING" => Ok(InvoiceStatus::Pending),
      "PROCESSING" => Ok(InvoiceStatus::Processing),
      "AUTHORIZED" => Ok(InvoiceStatus::Authorized),
      "ERROR" => Ok(InvoiceStatus::Error),
      "CANCELED" => Ok(InvoiceStatus::Canceled),
      _ => Err(ValueObjectError::InvalidStatus(s.to_string())),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Invoice Number - assigned by the municipality on authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 50 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 50 characters".to_string(),
      ));
    }
    Ok(Self(trimmed))
  }

  /// `<year><sequence zero-padded to 6>`, the format the simulated municipality hands out
  pub fn fictitious(year: i32, sequence: u32) -> Self {
    Self(format!("{}{:06}", year, sequence % 1_000_000))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
