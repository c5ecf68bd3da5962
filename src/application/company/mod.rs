//! Company use cases

mod create_company;
mod get_company_details;
mod list_companies;

pub use create_company::{CreateCompanyCommand, CreateCompanyUseCase};
pub use get_company_details::{CompanyDetailsResponse, GetCompanyDetailsUseCase};
pub use list_companies::{CompanyDto, ListCompaniesUseCase};
