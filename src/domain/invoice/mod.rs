pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  Customer, CustomerData, EmissionJob, EmissionOutcome, Invoice, NfseAuthorization,
};
pub use errors::InvoiceError;
pub use ports::{CustomerRepository, EmissionQueue, InvoiceRepository, NfseGateway};
pub use services::{InvoiceData, InvoiceService, InvoiceServiceDependencies};
pub use value_objects::{
  Amount, CustomerName, InvoiceDescription, InvoiceNumber, InvoiceStatus, Phone, ServiceCode,
  ValueObjectError,
};
