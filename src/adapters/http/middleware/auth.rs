use actix_web::{
  Error, HttpMessage, ResponseError,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};

use crate::{
  adapters::http::errors::{ApiError, AuthErrorKind},
  application::auth::GetCurrentCompanyUseCase,
  domain::auth::entities::AuthenticatedCompany,
};

/// Authentication middleware that validates bearer tokens and attaches the
/// company principal to the request
///
/// This middleware:
/// 1. Extracts the access token from the Authorization header
/// 2. Validates it using GetCurrentCompanyUseCase (signature, expiry, company still exists)
/// 3. Attaches the AuthenticatedCompany to request extensions for downstream handlers
/// 4. Returns 401 Unauthorized with a JSON error body otherwise
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use meifin::application::auth::GetCurrentCompanyUseCase;
/// # use meifin::adapters::http::middleware::auth::AuthMiddleware;
///
/// # async fn example(use_case: Arc<GetCurrentCompanyUseCase>) {
/// let app = App::new()
///   .wrap(AuthMiddleware::new(use_case))
///   .service(
///     web::resource("/protected")
///       .route(web::get().to(|| async { "Protected endpoint" }))
///   );
/// # }
/// ```
pub struct AuthMiddleware {
  use_case: Arc<GetCurrentCompanyUseCase>,
}

impl AuthMiddleware {
  pub fn new(use_case: Arc<GetCurrentCompanyUseCase>) -> Self {
    Self { use_case }
  }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = AuthMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(AuthMiddlewareService {
      service: Rc::new(service),
      use_case: self.use_case.clone(),
    }))
  }
}

pub struct AuthMiddlewareService<S> {
  service: Rc<S>,
  use_case: Arc<GetCurrentCompanyUseCase>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let use_case = self.use_case.clone();

    Box::pin(async move {
      let token = match extract_bearer_token(&req) {
        Ok(token) => token,
        Err(e) => {
          let (request, _) = req.into_parts();
          let response = e.error_response().map_into_right_body();
          return Ok(ServiceResponse::new(request, response));
        }
      };

      let principal = match use_case.authenticate(&token).await {
        Ok(principal) => principal,
        Err(e) => {
          tracing::debug!(path = %req.path(), "Rejected bearer token: {}", e);
          let (request, _) = req.into_parts();
          let api_error: ApiError = e.into();
          let response = api_error.error_response().map_into_right_body();
          return Ok(ServiceResponse::new(request, response));
        }
      };

      req.extensions_mut().insert(principal);

      let res = service.call(req).await?;
      Ok(res.map_into_left_body())
    })
  }
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Result<String, ApiError> {
  req
    .headers()
    .get("Authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .ok_or(ApiError::Auth(AuthErrorKind::InvalidToken))
}

/// Extension trait to extract the authenticated company from request extensions
pub trait AuthCompany {
  /// Fails with 401 when no auth middleware ran for this route
  fn principal(&self) -> Result<AuthenticatedCompany, ApiError>;
}

impl AuthCompany for actix_web::HttpRequest {
  fn principal(&self) -> Result<AuthenticatedCompany, ApiError> {
    let principal = self.extensions().get::<AuthenticatedCompany>().cloned();

    if principal.is_none() {
      tracing::warn!(
        "principal: AuthenticatedCompany not found in request extensions for path {}",
        self.path()
      );
    }

    principal.ok_or(ApiError::Auth(AuthErrorKind::InvalidToken))
  }
}
