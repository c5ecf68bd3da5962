use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::AuthenticatedCompany;
use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceStatus};
use crate::infrastructure::metrics;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitInvoiceResponse {
  pub message: String,
  pub invoice_id: Uuid,
  pub status: InvoiceStatus,
}

/// Moves a DRAFT invoice to PENDING and hands it to the emission worker
pub struct EmitInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl EmitInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    principal: &AuthenticatedCompany,
    invoice_id: Uuid,
  ) -> Result<EmitInvoiceResponse, InvoiceError> {
    let invoice = self
      .invoice_service
      .emit_invoice(principal, invoice_id)
      .await?;
    metrics::EMISSION_REQUESTED.inc();

    Ok(EmitInvoiceResponse {
      message: "invoice sent for processing".to_string(),
      invoice_id: invoice.id,
      status: invoice.status,
    })
  }
}
