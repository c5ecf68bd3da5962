//! Dashboard form posts. Every outcome is a 303 back to a page, with the
//! result carried as a flash message in the query string.

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use super::redirect_with_flash;
use crate::adapters::http::{
  dtos::{CustomerForm, EmitInvoiceForm, FlashQuery, InvoiceForm},
  errors::ApiError,
  middleware::AuthCompany,
};
use crate::application::invoice::{CreateCustomerUseCase, CreateInvoiceUseCase, EmitInvoiceUseCase};

fn flash(path: &str, tab: &str, result: Result<String, String>) -> HttpResponse {
  let (notice, error) = match result {
    Ok(notice) => (Some(notice), None),
    Err(error) => (None, Some(error)),
  };
  redirect_with_flash(
    path,
    &FlashQuery {
      error,
      notice,
      tab: Some(tab.to_string()),
    },
  )
}

/// Client errors become a flash message; internal ones still fail the request
fn user_facing(error: impl Into<ApiError>) -> Result<String, ApiError> {
  match error.into() {
    ApiError::Internal(msg) => Err(ApiError::Internal(msg)),
    other => Ok(other.public_message()),
  }
}

/// POST /companies/{company_id}/customers
pub async fn create_customer_submit(
  req: HttpRequest,
  path: web::Path<Uuid>,
  form: web::Form<CustomerForm>,
  use_case: web::Data<Arc<CreateCustomerUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let company_id = path.into_inner();
  let back = format!("/companies/{}", company_id);

  let command = form.into_inner().into_command(company_id);
  let result = match use_case.execute(&principal, command).await {
    Ok(customer) => {
      tracing::info!(%company_id, customer_id = %customer.id, "Customer created from dashboard");
      Ok(format!("Cliente {} cadastrado", customer.name))
    }
    Err(e) => Err(user_facing(e)?),
  };

  Ok(flash(&back, "customers", result))
}

/// POST /companies/{company_id}/invoices
pub async fn create_invoice_submit(
  req: HttpRequest,
  path: web::Path<Uuid>,
  form: web::Form<InvoiceForm>,
  use_case: web::Data<Arc<CreateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let company_id = path.into_inner();
  let back = format!("/companies/{}", company_id);

  let command = match form.into_inner().into_command(company_id) {
    Ok(command) => command,
    Err(message) => return Ok(flash(&back, "invoices", Err(message))),
  };

  let result = match use_case.execute(&principal, command).await {
    Ok(invoice) => {
      tracing::info!(%company_id, invoice_id = %invoice.id, "Invoice drafted from dashboard");
      Ok("Nota fiscal criada como rascunho".to_string())
    }
    Err(e) => Err(user_facing(e)?),
  };

  Ok(flash(&back, "invoices", result))
}

/// POST /invoices/{invoice_id}/emit
pub async fn emit_invoice_submit(
  req: HttpRequest,
  path: web::Path<Uuid>,
  form: web::Form<EmitInvoiceForm>,
  use_case: web::Data<Arc<EmitInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let back = form.return_path();

  let result = match use_case.execute(&principal, path.into_inner()).await {
    Ok(response) => {
      tracing::info!(invoice_id = %response.invoice_id, "Emission requested from dashboard");
      Ok("Nota fiscal enviada para processamento".to_string())
    }
    Err(e) => Err(user_facing(e)?),
  };

  Ok(flash(&back, "invoices", result))
}
