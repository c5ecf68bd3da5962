use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::auth::value_objects::Email;
use crate::domain::company::errors::ValidationError;
use crate::domain::company::value_objects::{Address, StateCode, TaxDocument};
use crate::domain::invoice::{
  Customer, CustomerName, Phone, errors::InvoiceError, ports::CustomerRepository,
};

#[derive(Debug, FromRow)]
struct CustomerRow {
  id: Uuid,
  company_id: Uuid,
  name: String,
  document: String,
  email: Option<String>,
  phone: Option<String>,
  street: Option<String>,
  number: Option<String>,
  zip: Option<String>,
  city: Option<String>,
  state: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
  type Error = InvoiceError;

  fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
    let email = row
      .email
      .map(Email::new)
      .transpose()
      .map_err(ValidationError::from)?;

    Ok(Customer {
      id: row.id,
      company_id: row.company_id,
      name: CustomerName::new(row.name)?,
      document: TaxDocument::parse(&row.document)?,
      email,
      phone: row.phone.map(Phone::new).transpose()?,
      address: Address {
        street: row.street,
        number: row.number,
        zip: row.zip,
        city: row.city,
        state: row.state.map(StateCode::new).transpose()?,
      },
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub struct PostgresCustomerRepository {
  pool: PgPool,
}

impl PostgresCustomerRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
  async fn create(&self, customer: Customer) -> Result<Customer, InvoiceError> {
    let row = sqlx::query_as::<_, CustomerRow>(
      r#"
            INSERT INTO customers (
                id, company_id, name, document, email, phone,
                street, number, zip, city, state, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, company_id, name, document, email, phone,
                      street, number, zip, city, state, created_at, updated_at
            "#,
    )
    .bind(customer.id)
    .bind(customer.company_id)
    .bind(customer.name.value())
    .bind(customer.document.as_str())
    .bind(customer.email.as_ref().map(|e| e.as_str()))
    .bind(customer.phone.as_ref().map(|p| p.value()))
    .bind(customer.address.street.as_deref())
    .bind(customer.address.number.as_deref())
    .bind(customer.address.zip.as_deref())
    .bind(customer.address.city.as_deref())
    .bind(customer.address.state.as_ref().map(|s| s.as_str()))
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, InvoiceError> {
    let row = sqlx::query_as::<_, CustomerRow>(
      r#"
            SELECT id, company_id, name, document, email, phone,
                   street, number, zip, city, state, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_by_company_id(&self, company_id: Uuid) -> Result<Vec<Customer>, InvoiceError> {
    let rows = sqlx::query_as::<_, CustomerRow>(
      r#"
            SELECT id, company_id, name, document, email, phone,
                   street, number, zip, city, state, created_at, updated_at
            FROM customers
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
    )
    .bind(company_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }
}
