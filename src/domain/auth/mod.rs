pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{AuthenticatedCompany, IssuedToken, TokenClaims};
pub use errors::{AuthError, HashError};
pub use ports::{PasswordHasher, TokenIssuer};
pub use services::AuthService;
pub use value_objects::{Email, Password, PasswordHash, ValueObjectError};
