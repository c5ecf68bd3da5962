use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tera::{Tera, Value};

use crate::domain::company::{TaxDocument, TaxRegime};
use crate::domain::invoice::InvoiceStatus;

/// Template engine wrapper for rendering HTML templates
///
/// Registers the Brazilian formatting filters used by the dashboard:
/// `document` (CPF/CNPJ punctuation), `brl` (`R$ 1.234,56`), `date_br`
/// (`dd/mm/yyyy` in Brasília time), `status_label` and `regime_label`.
#[derive(Clone)]
pub struct TemplateEngine {
  tera: Arc<Tera>,
}

impl TemplateEngine {
  /// Create a new template engine instance from `templates/`
  pub fn new() -> Result<Self, tera::Error> {
    Self::from_glob("templates/**/*.html.tera")
  }

  pub fn from_glob(glob: &str) -> Result<Self, tera::Error> {
    let mut tera = Tera::new(glob)?;
    tera.autoescape_on(vec!["html.tera", ".html"]);
    tera.register_filter("document", document_filter);
    tera.register_filter("brl", brl_filter);
    tera.register_filter("date_br", date_br_filter);
    tera.register_filter("status_label", status_label_filter);
    tera.register_filter("regime_label", regime_label_filter);

    Ok(Self {
      tera: Arc::new(tera),
    })
  }

  /// Render a template with the given context
  pub fn render(&self, template: &str, context: &tera::Context) -> Result<String, tera::Error> {
    self.tera.render(template, context)
  }
}

fn as_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

/// CPF or CNPJ with punctuation; anything else is passed through
fn document_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
  let raw = as_text(value);
  Ok(Value::String(
    TaxDocument::parse(&raw)
      .map(|d| d.formatted())
      .unwrap_or(raw),
  ))
}

/// Formats an amount the Brazilian way: `R$ 1.234,56`
pub fn format_brl(amount: Decimal) -> String {
  let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
  let text = format!("{:.2}", rounded.abs());
  let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

  let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
  for (i, digit) in int_part.chars().enumerate() {
    if i > 0 && (int_part.len() - i) % 3 == 0 {
      grouped.push('.');
    }
    grouped.push(digit);
  }

  let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
    "-"
  } else {
    ""
  };
  format!("{}R$ {},{}", sign, grouped, frac_part)
}

fn brl_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
  let amount = match value {
    Value::Number(n) => Decimal::from_str(&n.to_string()),
    other => Decimal::from_str(&as_text(other)),
  }
  .map_err(|e| tera::Error::msg(format!("brl: not an amount: {}", e)))?;

  Ok(Value::String(format_brl(amount)))
}

/// `dd/mm/yyyy` in Brasília time (UTC-3, no daylight saving since 2019)
fn date_br_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
  let raw = as_text(value);
  if raw.is_empty() {
    return Ok(Value::String(String::new()));
  }

  let parsed = DateTime::parse_from_rfc3339(&raw)
    .map_err(|e| tera::Error::msg(format!("date_br: invalid date {:?}: {}", raw, e)))?
    .with_timezone(&Utc);
  let formatted = match FixedOffset::west_opt(3 * 3600) {
    Some(brasilia) => parsed.with_timezone(&brasilia).format("%d/%m/%Y").to_string(),
    None => parsed.format("%d/%m/%Y").to_string(),
  };

  Ok(Value::String(formatted))
}

fn status_label_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
  let raw = as_text(value);
  Ok(Value::String(
    InvoiceStatus::from_str(&raw)
      .map(|s| s.label().to_string())
      .unwrap_or(raw),
  ))
}

fn regime_label_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
  let raw = as_text(value);
  Ok(Value::String(
    TaxRegime::from_str(&raw)
      .map(|r| r.label().to_string())
      .unwrap_or(raw),
  ))
}

#[cfg(test)]
pub(crate) fn test_engine() -> TemplateEngine {
  TemplateEngine::from_glob(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/templates/**/*.html.tera"
  ))
  .expect("templates should parse")
}
