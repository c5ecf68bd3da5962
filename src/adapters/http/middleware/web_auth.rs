use actix_web::{
  Error, HttpMessage, HttpResponse,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{future::ready, rc::Rc, sync::Arc};

use crate::application::auth::GetCurrentCompanyUseCase;

/// Name of the cookie holding the dashboard's access token
pub const SESSION_COOKIE: &str = "session";

/// Web authentication middleware using the cookie session
pub struct WebAuthMiddleware {
  use_case: Arc<GetCurrentCompanyUseCase>,
}

impl WebAuthMiddleware {
  pub fn new(use_case: Arc<GetCurrentCompanyUseCase>) -> Self {
    Self { use_case }
  }
}

impl<S, B> Transform<S, ServiceRequest> for WebAuthMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type InitError = ();
  type Transform = WebAuthMiddlewareService<S>;
  type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(WebAuthMiddlewareService {
      service: Rc::new(service),
      use_case: self.use_case.clone(),
    }))
  }
}

pub struct WebAuthMiddlewareService<S> {
  service: Rc<S>,
  use_case: Arc<GetCurrentCompanyUseCase>,
}

fn redirect_to_login<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
  req
    .into_response(
      HttpResponse::Found()
        .insert_header(("Location", "/login"))
        .finish(),
    )
    .map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for WebAuthMiddlewareService<S>
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
    let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

    let use_case = self.use_case.clone();
    let service = Rc::clone(&self.service);

    Box::pin(async move {
      let Some(token) = token else {
        return Ok(redirect_to_login(req));
      };

      match use_case.authenticate(&token).await {
        Ok(principal) => {
          req.extensions_mut().insert(principal);
          let res = service.call(req).await?;
          Ok(res.map_into_left_body())
        }
        Err(e) => {
          // Expired or revoked session
          tracing::debug!(path = %req.path(), "Session rejected: {}", e);
          Ok(redirect_to_login(req))
        }
      }
    })
  }
}
