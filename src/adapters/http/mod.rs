pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod templates;

// Re-export commonly used types
pub use dtos::{ErrorResponse, FlashQuery, LoginRequest};
pub use errors::{ApiError, AuthErrorKind, rate_limit_to_api_error};
pub use handlers::auth::login_handler;
pub use handlers::web_auth::{SessionSettings, login_submit, rate_limit_to_login_redirect};
pub use middleware::{
  AuthCompany, AuthMiddleware, RequestId, RequestIdExt, RequestIdMiddleware, WebAuthMiddleware,
};
pub use routes::{
  UseCases, WebRouteDependencies, configure_api_routes, configure_system_routes,
  configure_web_routes,
};
pub use templates::TemplateEngine;
