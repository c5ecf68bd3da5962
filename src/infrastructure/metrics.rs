use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, TextEncoder, register_int_counter};

lazy_static! {
  pub static ref EMISSION_REQUESTED: IntCounter = register_int_counter!(
    "meifin_invoices_emission_requested_total",
    "Invoices moved from DRAFT to PENDING"
  )
  .expect("metric can be registered");
  pub static ref INVOICES_AUTHORIZED: IntCounter = register_int_counter!(
    "meifin_invoices_authorized_total",
    "Invoices authorized by the NFS-e gateway"
  )
  .expect("metric can be registered");
  pub static ref EMISSION_FAILURES: IntCounter = register_int_counter!(
    "meifin_emission_failures_total",
    "Emission jobs that failed in the worker"
  )
  .expect("metric can be registered");
}

/// Registers the counters so they show up (at zero) before the first event
pub fn init() {
  lazy_static::initialize(&EMISSION_REQUESTED);
  lazy_static::initialize(&INVOICES_AUTHORIZED);
  lazy_static::initialize(&EMISSION_FAILURES);
}

/// Default registry in the Prometheus text exposition format
pub fn render() -> Result<String, String> {
  let mut buffer = Vec::new();
  TextEncoder::new()
    .encode(&prometheus::gather(), &mut buffer)
    .map_err(|e| e.to_string())?;
  String::from_utf8(buffer).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_render_lists_emission_counters() {
    init();
    INVOICES_AUTHORIZED.inc();

    let text = render().unwrap();
    assert!(text.contains("meifin_invoices_emission_requested_total"));
    assert!(text.contains("meifin_invoices_authorized_total"));
    assert!(text.contains("meifin_emission_failures_total"));
  }
}
