pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Company, CompanyProfile};
pub use errors::{CompanyError, ValidationError};
pub use ports::CompanyRepository;
pub use services::CompanyService;
pub use value_objects::{
  Address, AddressInput, Cnpj, Cpf, LegalName, StateCode, TaxDocument, TaxRegime,
};
