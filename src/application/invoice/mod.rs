//! Customer and invoice use cases

mod create_customer;
mod create_invoice;
mod emit_invoice;
mod get_invoice_details;
mod list_customers;
mod list_invoices;

pub use create_customer::{CreateCustomerCommand, CreateCustomerUseCase};
pub use create_invoice::{CreateInvoiceCommand, CreateInvoiceUseCase};
pub use emit_invoice::{EmitInvoiceResponse, EmitInvoiceUseCase};
pub use get_invoice_details::GetInvoiceDetailsUseCase;
pub use list_customers::{CustomerDto, ListCustomersUseCase};
pub use list_invoices::{
  CompanySummaryDto, CustomerSummaryDto, InvoiceDto, ListInvoicesCommand, ListInvoicesUseCase,
};
