use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::adapters::http::{dtos::LoginRequest, errors::ApiError, middleware::AuthCompany};
use crate::application::auth::{GetCurrentCompanyUseCase, LoginCompanyCommand, LoginCompanyUseCase};

/// Handler for company login
///
/// POST /api/v1/auth/login
/// Body: LoginRequest (JSON)
/// Response: `{ access_token, token_type, expires_at }` with status 200
pub async fn login_handler(
  request: web::Json<LoginRequest>,
  use_case: web::Data<Arc<LoginCompanyUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let request = request.into_inner();
  let command = LoginCompanyCommand {
    email: request.email,
    password: request.password,
  };

  let response = use_case.execute(command).await?;
  tracing::info!(company_id = %response.company_id, "Company logged in");

  Ok(HttpResponse::Ok().json(response))
}

/// Handler for the signed-in company's profile
///
/// GET /api/v1/auth/me
/// Requires: Bearer token
pub async fn me_handler(
  req: HttpRequest,
  use_case: web::Data<Arc<GetCurrentCompanyUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let company = use_case.execute(&principal).await?;
  Ok(HttpResponse::Ok().json(company))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::http::middleware::AuthMiddleware;
  use crate::test_support::Fixture;
  use actix_web::{
    App,
    http::StatusCode,
    test::{self, TestRequest},
  };
  use serde_json::json;

  #[actix_web::test]
  async fn test_login_returns_bearer_token() {
    let fx = Fixture::new().await;
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(Arc::new(LoginCompanyUseCase::new(
          fx.auth_service.clone(),
        ))))
        .route("/auth/login", web::post().to(login_handler)),
    )
    .await;

    let req = TestRequest::post()
      .uri("/auth/login")
      .set_json(json!({ "email": "admin@devmei.com", "password": "admin123" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["expires_at"].is_string());
    assert!(body.get("company_id").is_none());
  }

  #[actix_web::test]
  async fn test_login_failures_are_indistinguishable() {
    let fx = Fixture::new().await;
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(Arc::new(LoginCompanyUseCase::new(
          fx.auth_service.clone(),
        ))))
        .route("/auth/login", web::post().to(login_handler)),
    )
    .await;

    for (email, password) in [
      ("admin@devmei.com", "wrong-password"),
      ("nobody@devmei.com", "admin123"),
      ("not-an-email", "x"),
    ] {
      let req = TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
      let resp = test::call_service(&app, req).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", email);
      let body: serde_json::Value = test::read_body_json(resp).await;
      assert_eq!(body["error"], "invalid_credentials");
    }
  }

  #[actix_web::test]
  async fn test_me_returns_company_profile() {
    let fx = Fixture::new().await;
    let use_case = Arc::new(GetCurrentCompanyUseCase::new(fx.auth_service.clone()));
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(use_case.clone()))
        .service(
          web::scope("/auth")
            .wrap(AuthMiddleware::new(use_case))
            .route("/me", web::get().to(me_handler)),
        ),
    )
    .await;

    let req = TestRequest::get()
      .uri("/auth/me")
      .insert_header(("Authorization", format!("Bearer {}", fx.token)))
      .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], fx.company.id.to_string());
    assert_eq!(body["cnpj"], "00000000000191");
    assert_eq!(body["taxRegime"], "MEI");
    assert!(body.get("passwordHash").is_none());
  }
}
