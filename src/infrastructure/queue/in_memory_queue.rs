use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

use crate::domain::invoice::entities::EmissionJob;
use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::EmissionQueue;

/// Process-local queue on a tokio channel. Jobs do not survive a restart;
/// the startup requeue of PENDING invoices covers that.
pub struct InMemoryEmissionQueue {
  sender: mpsc::UnboundedSender<EmissionJob>,
  receiver: Mutex<mpsc::UnboundedReceiver<EmissionJob>>,
  poll_timeout: Duration,
}

impl InMemoryEmissionQueue {
  pub fn new(poll_timeout: Duration) -> Self {
    let (sender, receiver) = mpsc::unbounded_channel();
    Self {
      sender,
      receiver: Mutex::new(receiver),
      poll_timeout,
    }
  }
}

#[async_trait]
impl EmissionQueue for InMemoryEmissionQueue {
  async fn enqueue(&self, job: EmissionJob) -> Result<(), InvoiceError> {
    let invoice_id = job.invoice_id;
    self
      .sender
      .send(job)
      .map_err(|_| InvoiceError::Queue("emission queue is closed".to_string()))?;

    tracing::debug!(invoice_id = %invoice_id, "Emission job enqueued");
    Ok(())
  }

  async fn dequeue(&self) -> Result<Option<EmissionJob>, InvoiceError> {
    let mut receiver = self.receiver.lock().await;
    match tokio::time::timeout(self.poll_timeout, receiver.recv()).await {
      Ok(job) => Ok(job),
      Err(_) => Ok(None),
    }
  }
}
