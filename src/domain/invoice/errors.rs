use super::value_objects::{InvoiceStatus, ValueObjectError};
use crate::domain::company::errors::ValidationError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Validation error: {0}")]
  InvalidField(#[from] ValidationError),

  #[error("Company not found: {0}")]
  CompanyNotFound(Uuid),

  #[error("Customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("Customer not found for this company")]
  CustomerNotInCompany,

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Access to this company is not allowed")]
  AccessDenied,

  #[error("Only DRAFT invoices can be emitted (current status: {0})")]
  NotEmittable(InvoiceStatus),

  #[error("Invalid status transition: {from} -> {to}")]
  InvalidStatusTransition {
    from: InvoiceStatus,
    to: InvoiceStatus,
  },

  #[error("Emission queue error: {0}")]
  Queue(String),

  #[error("NFS-e gateway error: {0}")]
  Gateway(String),

  #[error("Repository error: {0}")]
  Repository(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}
