use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

use crate::domain::invoice::entities::EmissionJob;
use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::EmissionQueue;

/// Redis list used as a FIFO: producers LPUSH, the worker BRPOPs.
///
/// BRPOP parks the connection it runs on, so the consumer side needs its own
/// `ConnectionManager`; sharing one would stall every enqueue behind it.
pub struct RedisEmissionQueue {
  producer: ConnectionManager,
  consumer: ConnectionManager,
  key: String,
  poll_timeout: Duration,
}

impl RedisEmissionQueue {
  pub fn new(
    producer: ConnectionManager,
    consumer: ConnectionManager,
    key: impl Into<String>,
    poll_timeout: Duration,
  ) -> Self {
    Self {
      producer,
      consumer,
      key: key.into(),
      poll_timeout,
    }
  }
}

#[async_trait]
impl EmissionQueue for RedisEmissionQueue {
  async fn enqueue(&self, job: EmissionJob) -> Result<(), InvoiceError> {
    let payload = serde_json::to_string(&job)
      .map_err(|e| InvoiceError::Queue(format!("Failed to encode job: {}", e)))?;

    let mut conn = self.producer.clone();
    let _: i64 = conn.lpush(&self.key, payload).await.map_err(|e| {
      tracing::error!(invoice_id = %job.invoice_id, "Failed to enqueue emission job: {}", e);
      InvoiceError::Queue(e.to_string())
    })?;

    tracing::debug!(invoice_id = %job.invoice_id, key = %self.key, "Emission job enqueued");
    Ok(())
  }

  async fn dequeue(&self) -> Result<Option<EmissionJob>, InvoiceError> {
    let mut conn = self.consumer.clone();
    let popped: Option<(String, String)> = conn
      .brpop(&self.key, self.poll_timeout.as_secs_f64())
      .await
      .map_err(|e| InvoiceError::Queue(e.to_string()))?;

    let Some((_, payload)) = popped else {
      return Ok(None);
    };

    match serde_json::from_str::<EmissionJob>(&payload) {
      Ok(job) => Ok(Some(job)),
      Err(e) => {
        // Unreadable payloads are dropped so they cannot wedge the queue
        tracing::error!(payload = %payload, "Discarding malformed emission job: {}", e);
        Ok(None)
      }
    }
  }
}
