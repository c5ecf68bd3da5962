//! Authentication use cases

mod get_current_company;
mod login_company;

pub use get_current_company::GetCurrentCompanyUseCase;
pub use login_company::{LoginCompanyCommand, LoginCompanyResponse, LoginCompanyUseCase};
