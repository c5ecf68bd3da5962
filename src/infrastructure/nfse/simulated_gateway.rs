use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rand::Rng;
use std::time::Duration;

use crate::domain::invoice::entities::{Invoice, NfseAuthorization};
use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::NfseGateway;
use crate::domain::invoice::value_objects::InvoiceNumber;

/// Stand-in for the municipal web service.
///
/// Waits `delay` to mimic the round trip, then authorizes every invoice with a
/// fictitious `YYYY` + six digit number.
pub struct SimulatedNfseGateway {
  delay: Duration,
}

impl SimulatedNfseGateway {
  pub fn new(delay: Duration) -> Self {
    Self { delay }
  }
}

#[async_trait]
impl NfseGateway for SimulatedNfseGateway {
  async fn authorize(&self, invoice: &Invoice) -> Result<NfseAuthorization, InvoiceError> {
    tracing::debug!(
      invoice_id = %invoice.id,
      delay_ms = self.delay.as_millis() as u64,
      "Submitting invoice to simulated NFS-e service"
    );
    tokio::time::sleep(self.delay).await;

    let issued_at = Utc::now();
    let sequence: u32 = rand::thread_rng().gen_range(0..1_000_000);

    Ok(NfseAuthorization {
      invoice_number: InvoiceNumber::fictitious(issued_at.year(), sequence),
      issued_at,
    })
  }
}
