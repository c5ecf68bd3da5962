//! Background emission worker.
//!
//! Pulls jobs off the emission queue and drives each invoice from PENDING to
//! AUTHORIZED through the NFS-e gateway. Failures are logged and counted; the
//! job is dropped and the loop keeps going.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::invoice::entities::{EmissionJob, EmissionOutcome};
use crate::domain::invoice::ports::EmissionQueue;
use crate::domain::invoice::services::InvoiceService;
use crate::infrastructure::metrics;

const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

pub struct EmissionWorker {
  invoice_service: Arc<InvoiceService>,
  queue: Arc<dyn EmissionQueue>,
  shutdown: CancellationToken,
}

impl EmissionWorker {
  pub fn new(
    invoice_service: Arc<InvoiceService>,
    queue: Arc<dyn EmissionQueue>,
    shutdown: CancellationToken,
  ) -> Self {
    Self {
      invoice_service,
      queue,
      shutdown,
    }
  }

  pub fn spawn(self) -> JoinHandle<()> {
    tokio::spawn(async move { self.run().await })
  }

  /// Runs until the shutdown token is cancelled. A job already being processed
  /// is finished before the loop observes the cancellation.
  pub async fn run(&self) {
    info!("Emission worker started");

    loop {
      let next = tokio::select! {
        biased;

        _ = self.shutdown.cancelled() => break,
        next = self.queue.dequeue() => next,
      };

      match next {
        Ok(Some(job)) => self.handle(job).await,
        Ok(None) => continue,
        Err(e) => {
          error!(error = %e, "Failed to read from emission queue");
          tokio::select! {
            _ = self.shutdown.cancelled() => break,
            _ = tokio::time::sleep(QUEUE_ERROR_BACKOFF) => {}
          }
        }
      }
    }

    info!("Emission worker stopped");
  }

  async fn handle(&self, job: EmissionJob) {
    info!(invoice_id = %job.invoice_id, "Processing emission job");

    match self.invoice_service.process_emission(&job).await {
      Ok(EmissionOutcome::Authorized(invoice)) => {
        metrics::INVOICES_AUTHORIZED.inc();
        info!(
          invoice_id = %invoice.id,
          invoice_number = invoice.invoice_number.as_ref().map(|n| n.value()).unwrap_or_default(),
          "Invoice authorized"
        );
      }
      Ok(EmissionOutcome::Skipped { invoice_id, reason }) => {
        warn!(invoice_id = %invoice_id, reason = %reason, "Emission job skipped");
      }
      Err(e) => {
        metrics::EMISSION_FAILURES.inc();
        error!(invoice_id = %job.invoice_id, error = %e, "Emission failed");
      }
    }
  }
}
