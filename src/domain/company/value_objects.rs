use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ValidationError;

fn digits_only(value: &str) -> String {
  value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn to_digits(value: &str) -> Vec<u32> {
  value.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
  digits.windows(2).all(|pair| pair[0] == pair[1])
}

/// Trims an optional free-text field, mapping blank input to `None`
pub(crate) fn optional_text(
  value: Option<String>,
  field: &str,
  max: usize,
) -> Result<Option<String>, ValidationError> {
  match value {
    Some(s) => {
      let trimmed = s.trim().to_string();
      if trimmed.is_empty() {
        Ok(None)
      } else if trimmed.chars().count() > max {
        Err(ValidationError::FieldTooLong {
          field: field.to_string(),
          max,
        })
      } else {
        Ok(Some(trimmed))
      }
    }
    None => Ok(None),
  }
}

// ============================================================================
// CNPJ
// ============================================================================

/// Brazilian company tax id: 14 digits, the last two being check digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cnpj(String);

impl Cnpj {
  const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
  const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

  /// Parses a CNPJ, accepting the usual `XX.XXX.XXX/XXXX-XX` punctuation
  pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
    let raw = value.as_ref();
    let digits = digits_only(raw);
    let numbers = to_digits(&digits);

    if numbers.len() != 14 || all_same(&numbers) {
      return Err(ValidationError::InvalidCnpj(raw.to_string()));
    }

    let first = Self::check_digit(&numbers[..12], &Self::FIRST_WEIGHTS);
    let second = Self::check_digit(&numbers[..13], &Self::SECOND_WEIGHTS);
    if numbers[12] != first || numbers[13] != second {
      return Err(ValidationError::InvalidCnpj(raw.to_string()));
    }

    Ok(Self(digits))
  }

  fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
      0 | 1 => 0,
      rest => 11 - rest,
    }
  }

  /// Digits only
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// `XX.XXX.XXX/XXXX-XX`
  pub fn formatted(&self) -> String {
    let d = &self.0;
    format!(
      "{}.{}.{}/{}-{}",
      &d[0..2],
      &d[2..5],
      &d[5..8],
      &d[8..12],
      &d[12..14]
    )
  }
}

impl fmt::Display for Cnpj {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ============================================================================
// CPF
// ============================================================================

/// Brazilian individual tax id: 11 digits, the last two being check digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cpf(String);

impl Cpf {
  pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
    let raw = value.as_ref();
    let digits = digits_only(raw);
    let numbers = to_digits(&digits);

    if numbers.len() != 11 || all_same(&numbers) {
      return Err(ValidationError::InvalidCpf(raw.to_string()));
    }

    if numbers[9] != Self::check_digit(&numbers[..9]) || numbers[10] != Self::check_digit(&numbers[..10])
    {
      return Err(ValidationError::InvalidCpf(raw.to_string()));
    }

    Ok(Self(digits))
  }

  // Weights run from len+1 down to 2
  fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
      .iter()
      .enumerate()
      .map(|(i, d)| d * (top - i as u32))
      .sum();
    match (sum * 10) % 11 {
      10 => 0,
      rest => rest,
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// `XXX.XXX.XXX-XX`
  pub fn formatted(&self) -> String {
    let d = &self.0;
    format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
  }
}

// ============================================================================
// Tax document (customer identification)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxDocument {
  Cpf(Cpf),
  Cnpj(Cnpj),
}

impl TaxDocument {
  /// Picks CPF or CNPJ from the digit count
  pub fn parse(value: impl AsRef<str>) -> Result<Self, ValidationError> {
    let raw = value.as_ref();
    match digits_only(raw).len() {
      11 => Ok(TaxDocument::Cpf(Cpf::new(raw)?)),
      14 => Ok(TaxDocument::Cnpj(Cnpj::new(raw)?)),
      _ => Err(ValidationError::InvalidDocument),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      TaxDocument::Cpf(cpf) => cpf.as_str(),
      TaxDocument::Cnpj(cnpj) => cnpj.as_str(),
    }
  }

  pub fn formatted(&self) -> String {
    match self {
      TaxDocument::Cpf(cpf) => cpf.formatted(),
      TaxDocument::Cnpj(cnpj) => cnpj.formatted(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      TaxDocument::Cpf(_) => "CPF",
      TaxDocument::Cnpj(_) => "CNPJ",
    }
  }
}

// ============================================================================
// Legal name
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalName(String);

impl LegalName {
  const MIN_LENGTH: usize = 3;
  const MAX_LENGTH: usize = 255;

  pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
    let name = name.into().trim().to_string();
    let length = name.chars().count();

    if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
      return Err(ValidationError::LegalNameLength {
        min: Self::MIN_LENGTH,
        max: Self::MAX_LENGTH,
      });
    }

    Ok(Self(name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

// ============================================================================
// Tax regime
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxRegime {
  #[default]
  Mei,
  SimplesNacional,
  LucroPresumido,
}

impl TaxRegime {
  pub fn as_str(&self) -> &'static str {
    match self {
      TaxRegime::Mei => "MEI",
      TaxRegime::SimplesNacional => "SIMPLES_NACIONAL",
      TaxRegime::LucroPresumido => "LUCRO_PRESUMIDO",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      TaxRegime::Mei => "MEI",
      TaxRegime::SimplesNacional => "Simples Nacional",
      TaxRegime::LucroPresumido => "Lucro Presumido",
    }
  }
}

impl FromStr for TaxRegime {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "MEI" => Ok(TaxRegime::Mei),
      "SIMPLES_NACIONAL" => Ok(TaxRegime::SimplesNacional),
      "LUCRO_PRESUMIDO" => Ok(TaxRegime::LucroPresumido),
      _ => Err(ValidationError::InvalidTaxRegime(s.to_string())),
    }
  }
}

impl fmt::Display for TaxRegime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ============================================================================
// State (UF)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCode(String);

impl StateCode {
  const CODES: [&'static str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
  ];

  pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
    let code = value.as_ref().trim().to_uppercase();
    if !Self::CODES.contains(&code.as_str()) {
      return Err(ValidationError::InvalidState);
    }
    Ok(Self(code))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

// ============================================================================
// Address
// ============================================================================

/// Raw address input, every part optional
#[derive(Debug, Clone, Default)]
pub struct AddressInput {
  pub street: Option<String>,
  pub number: Option<String>,
  pub zip: Option<String>,
  pub city: Option<String>,
  pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub street: Option<String>,
  pub number: Option<String>,
  pub zip: Option<String>,
  pub city: Option<String>,
  pub state: Option<StateCode>,
}

impl Address {
  pub fn new(input: AddressInput) -> Result<Self, ValidationError> {
    let zip = optional_text(input.zip, "zip", 10)?.map(|z| digits_only(&z));
    let state = optional_text(input.state, "state", 2)?
      .map(StateCode::new)
      .transpose()?;

    Ok(Self {
      street: optional_text(input.street, "street", 255)?,
      number: optional_text(input.number, "number", 20)?,
      zip: zip.filter(|z| !z.is_empty()),
      city: optional_text(input.city, "city", 100)?,
      state,
    })
  }

  /// "City/UF" for listings, if either part is known
  pub fn city_state(&self) -> Option<String> {
    match (&self.city, &self.state) {
      (Some(city), Some(state)) => Some(format!("{}/{}", city, state.as_str())),
      (Some(city), None) => Some(city.clone()),
      (None, Some(state)) => Some(state.as_str().to_string()),
      (None, None) => None,
    }
  }
}
