pub mod company_repository;
pub mod customer_repository;
pub mod invoice_repository;

pub use company_repository::PostgresCompanyRepository;
pub use customer_repository::PostgresCustomerRepository;
pub use invoice_repository::PostgresInvoiceRepository;
