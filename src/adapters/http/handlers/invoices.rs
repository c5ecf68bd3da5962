use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::adapters::http::{dtos::CreateInvoiceRequest, errors::ApiError, middleware::AuthCompany};
use crate::application::invoice::{
  CreateInvoiceUseCase, EmitInvoiceUseCase, GetInvoiceDetailsUseCase, ListInvoicesCommand,
  ListInvoicesUseCase,
};

/// Handler for creating a DRAFT invoice
///
/// POST /api/v1/invoices
/// Body: CreateInvoiceRequest (JSON)
/// Response: InvoiceDto with company and customer summaries, status 201
pub async fn create_invoice_handler(
  req: HttpRequest,
  request: web::Json<CreateInvoiceRequest>,
  use_case: web::Data<Arc<CreateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  request.validate()?;

  let invoice = use_case
    .execute(&principal, request.into_inner().into())
    .await?;
  tracing::info!(invoice_id = %invoice.id, amount = %invoice.amount, "Invoice drafted");

  Ok(HttpResponse::Created().json(invoice))
}

/// Handler for listing invoices, newest first
///
/// GET /api/v1/invoices?companyId={uuid}
pub async fn list_invoices_handler(
  req: HttpRequest,
  query: web::Query<ListInvoicesCommand>,
  use_case: web::Data<Arc<ListInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let invoices = use_case.execute(&principal, query.into_inner()).await?;
  Ok(HttpResponse::Ok().json(invoices))
}

/// GET /api/v1/invoices/{invoice_id}
pub async fn get_invoice_handler(
  req: HttpRequest,
  path: web::Path<Uuid>,
  use_case: web::Data<Arc<GetInvoiceDetailsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let invoice = use_case.execute(&principal, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(invoice))
}

/// Handler for requesting emission of a DRAFT invoice
///
/// POST /api/v1/invoices/{invoice_id}/emit
/// Response: 202 Accepted; authorization happens in the background
pub async fn emit_invoice_handler(
  req: HttpRequest,
  path: web::Path<Uuid>,
  use_case: web::Data<Arc<EmitInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let response = use_case.execute(&principal, path.into_inner()).await?;
  Ok(HttpResponse::Accepted().json(response))
}
