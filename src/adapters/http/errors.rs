use actix_web::{
  HttpRequest, HttpResponse,
  error::{JsonPayloadError, PathError, QueryPayloadError, ResponseError},
  http::{StatusCode, header::ContentType},
};
use std::fmt;

use crate::domain::auth::errors::AuthError;
use crate::domain::company::CompanyError;
use crate::domain::invoice::InvoiceError;

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug)]
pub enum ApiError {
  /// Validation error (400 Bad Request)
  Validation(String),

  /// Authentication error (401 Unauthorized or 429 Too Many Requests)
  Auth(AuthErrorKind),

  /// Resource belongs to another company (403 Forbidden)
  Forbidden(String),

  /// Resource does not exist (404 Not Found)
  NotFound(String),

  /// Unique constraint hit (409 Conflict)
  Conflict(String),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

/// Authentication error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
  /// Invalid credentials (401)
  InvalidCredentials,

  /// Missing, malformed or expired token (401)
  InvalidToken,

  /// Rate limit exceeded (429)
  RateLimitExceeded,
}

impl ApiError {
  /// Machine-readable error code sent in the `error` field
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Validation(_) => "validation_error",
      ApiError::Auth(AuthErrorKind::InvalidCredentials) => "invalid_credentials",
      ApiError::Auth(AuthErrorKind::InvalidToken) => "invalid_token",
      ApiError::Auth(AuthErrorKind::RateLimitExceeded) => "rate_limit_exceeded",
      ApiError::Forbidden(_) => "forbidden",
      ApiError::NotFound(_) => "not_found",
      ApiError::Conflict(_) => "conflict",
      ApiError::Internal(_) => "internal_error",
    }
  }

  /// Message safe to show to the caller; internal details are never exposed
  pub fn public_message(&self) -> String {
    match self {
      ApiError::Validation(msg)
      | ApiError::Forbidden(msg)
      | ApiError::NotFound(msg)
      | ApiError::Conflict(msg) => msg.clone(),
      ApiError::Auth(AuthErrorKind::InvalidCredentials) => "Invalid email or password".to_string(),
      ApiError::Auth(AuthErrorKind::InvalidToken) => {
        "Invalid or missing authorization token".to_string()
      }
      ApiError::Auth(AuthErrorKind::RateLimitExceeded) => {
        "Too many login attempts. Please try again later".to_string()
      }
      ApiError::Internal(_) => "An internal server error occurred".to_string(),
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::Auth(kind) => write!(f, "Authentication error: {:?}", kind),
      ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
      ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
      ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Auth(kind) => match kind {
        AuthErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthErrorKind::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthErrorKind::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
      },
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    if let ApiError::Internal(msg) = self {
      // Don't expose internal error details
      tracing::error!("Internal error: {}", msg);
    }

    let error_response = ErrorResponse {
      error: self.code().to_string(),
      message: self.public_message(),
      details: None,
    };

    HttpResponse::build(self.status_code())
      .content_type(ContentType::json())
      .json(error_response)
  }
}

/// Rewrites the rate limiter's plain-text 429 into the API error body
///
/// The limiter answers with an error rather than a response, so this is
/// applied through `wrap_fn` on the rate-limited resources.
pub fn rate_limit_to_api_error(error: actix_web::Error) -> actix_web::Error {
  if error.as_response_error().status_code() == StatusCode::TOO_MANY_REQUESTS {
    tracing::warn!("Login rate limit exceeded");
    ApiError::Auth(AuthErrorKind::RateLimitExceeded).into()
  } else {
    error
  }
}

/// Rejected JSON bodies answer 400 with the API error body
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  ApiError::Validation(format!("Invalid request body: {}", error)).into()
}

/// Rejected query strings answer 400 with the API error body
pub fn query_error_handler(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  ApiError::Validation(format!("Invalid query string: {}", error)).into()
}

/// A malformed path id is a bad request, not a missing resource
pub fn path_error_handler(error: PathError, _req: &HttpRequest) -> actix_web::Error {
  ApiError::Validation(format!("Invalid path parameter: {}", error)).into()
}

/// Convert AuthError to ApiError
impl From<AuthError> for ApiError {
  fn from(error: AuthError) -> Self {
    match error {
      AuthError::InvalidCredentials => ApiError::Auth(AuthErrorKind::InvalidCredentials),
      AuthError::InvalidToken | AuthError::CompanyNotFound => {
        ApiError::Auth(AuthErrorKind::InvalidToken)
      }
      AuthError::ValueObject(err) => ApiError::Validation(err.to_string()),
      AuthError::Repository(err) => ApiError::Internal(format!("Repository error: {}", err)),
      AuthError::Hash(err) => ApiError::Internal(err.to_string()),
      AuthError::Token(err) => ApiError::Internal(format!("Token error: {}", err)),
    }
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut messages: Vec<String> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errors)| {
        errors
          .iter()
          .map(|error| {
            error
              .message
              .as_ref()
              .map(|m| m.to_string())
              .unwrap_or_else(|| format!("Invalid field: {}", field))
          })
          .collect::<Vec<_>>()
      })
      .collect();
    messages.sort();

    ApiError::Validation(messages.join(", "))
  }
}

/// Convert CompanyError to ApiError
impl From<CompanyError> for ApiError {
  fn from(error: CompanyError) -> Self {
    match error {
      CompanyError::NotFound(_) => ApiError::NotFound("Company not found".to_string()),
      CompanyError::AccessDenied => ApiError::Forbidden(error.to_string()),
      CompanyError::CnpjAlreadyRegistered | CompanyError::EmailAlreadyRegistered => {
        ApiError::Conflict(error.to_string())
      }
      CompanyError::Repository(e) => ApiError::Internal(format!("Repository error: {}", e)),
      CompanyError::Validation(e) => ApiError::Validation(e.to_string()),
      CompanyError::Auth(e) => ApiError::from(e),
    }
  }
}

/// Convert InvoiceError to ApiError
impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::Validation(e) => ApiError::Validation(e.to_string()),
      InvoiceError::InvalidField(e) => ApiError::Validation(e.to_string()),
      InvoiceError::CompanyNotFound(_) => ApiError::NotFound("Company not found".to_string()),
      InvoiceError::CustomerNotFound(_) => ApiError::NotFound("Customer not found".to_string()),
      InvoiceError::InvoiceNotFound(_) => ApiError::NotFound("Invoice not found".to_string()),
      InvoiceError::CustomerNotInCompany => ApiError::NotFound(error.to_string()),
      InvoiceError::AccessDenied => ApiError::Forbidden(error.to_string()),
      InvoiceError::NotEmittable(_) | InvoiceError::InvalidStatusTransition { .. } => {
        ApiError::Validation(error.to_string())
      }
      InvoiceError::Queue(_)
      | InvoiceError::Gateway(_)
      | InvoiceError::Repository(_)
      | InvoiceError::Database(_) => ApiError::Internal(error.to_string()),
    }
  }
}
