use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::invoice::{
  Amount, Invoice, InvoiceDescription, InvoiceNumber, InvoiceStatus, ServiceCode,
  errors::InvoiceError, ports::InvoiceRepository,
};

const INVOICE_COLUMNS: &str = "id, company_id, customer_id, amount, description, service_code, \
   status, invoice_number, verification_code, external_id, pdf_url, xml_url, issued_at, \
   created_at, updated_at";

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  company_id: Uuid,
  customer_id: Uuid,
  amount: Decimal,
  description: String,
  service_code: String,
  status: String,
  invoice_number: Option<String>,
  verification_code: Option<String>,
  external_id: Option<String>,
  pdf_url: Option<String>,
  xml_url: Option<String>,
  issued_at: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    Ok(Invoice {
      id: row.id,
      company_id: row.company_id,
      customer_id: row.customer_id,
      amount: Amount::new(row.amount)?,
      description: InvoiceDescription::new(row.description)?,
      service_code: ServiceCode::new(row.service_code)?,
      status: row.status.parse::<InvoiceStatus>()?,
      invoice_number: row.invoice_number.map(InvoiceNumber::new).transpose()?,
      verification_code: row.verification_code,
      external_id: row.external_id,
      pdf_url: row.pdf_url,
      xml_url: row.xml_url,
      issued_at: row.issued_at,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            INSERT INTO invoices (
                id, company_id, customer_id, amount, description, service_code, status,
                invoice_number, verification_code, external_id, pdf_url, xml_url, issued_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
      INVOICE_COLUMNS
    ))
    .bind(invoice.id)
    .bind(invoice.company_id)
    .bind(invoice.customer_id)
    .bind(invoice.amount.value())
    .bind(invoice.description.value())
    .bind(invoice.service_code.value())
    .bind(invoice.status.as_str())
    .bind(invoice.invoice_number.as_ref().map(|n| n.value()))
    .bind(invoice.verification_code.as_deref())
    .bind(invoice.external_id.as_deref())
    .bind(invoice.pdf_url.as_deref())
    .bind(invoice.xml_url.as_deref())
    .bind(invoice.issued_at)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {} FROM invoices WHERE id = $1",
      INVOICE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_by_company_id(&self, company_id: Uuid) -> Result<Vec<Invoice>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {} FROM invoices WHERE company_id = $1 ORDER BY created_at DESC",
      INVOICE_COLUMNS
    ))
    .bind(company_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn find_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {} FROM invoices WHERE status = $1 ORDER BY created_at ASC",
      INVOICE_COLUMNS
    ))
    .bind(status.as_str())
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn mark_pending(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            UPDATE invoices
            SET status = 'PENDING', updated_at = NOW()
            WHERE id = $1 AND status = 'DRAFT'
            RETURNING {}
            "#,
      INVOICE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn revert_pending(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            UPDATE invoices
            SET status = 'DRAFT', updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {}
            "#,
      INVOICE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn authorize(
    &self,
    id: Uuid,
    invoice_number: &InvoiceNumber,
    issued_at: DateTime<Utc>,
  ) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            UPDATE invoices
            SET status = 'AUTHORIZED', invoice_number = $2, issued_at = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {}
            "#,
      INVOICE_COLUMNS
    ))
    .bind(id)
    .bind(invoice_number.value())
    .bind(issued_at)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }
}
