pub mod auth;
pub mod company;
pub mod forms;
pub mod invoices;
pub mod pages;
pub mod system;
pub mod web_auth;

use actix_web::{HttpResponse, http::header};

use crate::adapters::http::{dtos::FlashQuery, errors::ApiError, templates::TemplateEngine};

/// Render a dashboard template into a 200 HTML response
pub(crate) fn render_html(
  templates: &TemplateEngine,
  template: &str,
  context: &tera::Context,
) -> Result<HttpResponse, ApiError> {
  let html = templates
    .render(template, context)
    .map_err(|e| ApiError::Internal(format!("Template error: {:?}", e)))?;

  Ok(
    HttpResponse::Ok()
      .content_type("text/html; charset=utf-8")
      .body(html),
  )
}

/// 303 See Other, so a POSTed form is followed by a GET
pub(crate) fn see_other(location: &str) -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, location))
    .finish()
}

/// Redirect carrying a flash message in the query string
pub(crate) fn redirect_with_flash(path: &str, flash: &FlashQuery) -> HttpResponse {
  match serde_urlencoded::to_string(flash) {
    Ok(query) if !query.is_empty() => see_other(&format!("{}?{}", path, query)),
    _ => see_other(path),
  }
}
