use actix_web::HttpResponse;
use serde_json::json;

use crate::adapters::http::errors::ApiError;
use crate::infrastructure::metrics;

/// GET /health
pub async fn health_check() -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

/// GET /metrics in the Prometheus text format
pub async fn metrics_handler() -> Result<HttpResponse, ApiError> {
  let body = metrics::render().map_err(|e| ApiError::Internal(format!("Metrics error: {}", e)))?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/plain; version=0.0.4")
      .body(body),
  )
}
