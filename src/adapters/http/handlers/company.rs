use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::adapters::http::{
  dtos::{CreateCompanyRequest, CreateCustomerRequest},
  errors::ApiError,
  middleware::AuthCompany,
};
use crate::application::company::{
  CreateCompanyUseCase, GetCompanyDetailsUseCase, ListCompaniesUseCase,
};
use crate::application::invoice::{CreateCustomerUseCase, ListCustomersUseCase};

/// Handler for company registration
///
/// POST /api/v1/companies
/// Body: CreateCompanyRequest (JSON)
/// Response: CompanyDto (JSON) with status 201
pub async fn create_company_handler(
  request: web::Json<CreateCompanyRequest>,
  use_case: web::Data<Arc<CreateCompanyUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let company = use_case.execute(request.into_inner().into()).await?;
  tracing::info!(company_id = %company.id, cnpj = %company.cnpj, "Company registered");

  Ok(HttpResponse::Created().json(company))
}

/// Handler for listing companies visible to the caller
///
/// GET /api/v1/companies
pub async fn list_companies_handler(
  req: HttpRequest,
  use_case: web::Data<Arc<ListCompaniesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let companies = use_case.execute(&principal).await?;
  Ok(HttpResponse::Ok().json(companies))
}

/// Handler for a company with its customers
///
/// GET /api/v1/companies/{company_id}
pub async fn get_company_handler(
  req: HttpRequest,
  path: web::Path<Uuid>,
  use_case: web::Data<Arc<GetCompanyDetailsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let details = use_case.execute(&principal, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(details))
}

/// GET /api/v1/companies/{company_id}/customers
pub async fn list_customers_handler(
  req: HttpRequest,
  path: web::Path<Uuid>,
  use_case: web::Data<Arc<ListCustomersUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let customers = use_case.execute(&principal, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(customers))
}

/// POST /api/v1/companies/{company_id}/customers
pub async fn create_customer_handler(
  req: HttpRequest,
  path: web::Path<Uuid>,
  request: web::Json<CreateCustomerRequest>,
  use_case: web::Data<Arc<CreateCustomerUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  request.validate()?;

  let command = request.into_inner().into_command(path.into_inner());
  let customer = use_case.execute(&principal, command).await?;
  tracing::info!(
    company_id = %customer.company_id,
    customer_id = %customer.id,
    "Customer created"
  );

  Ok(HttpResponse::Created().json(customer))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::http::middleware::AuthMiddleware;
  use crate::application::auth::GetCurrentCompanyUseCase;
  use crate::test_support::Fixture;
  use actix_web::{
    App, guard,
    http::StatusCode,
    test::{self, TestRequest},
  };
  use serde_json::json;

  macro_rules! company_app {
    ($fx:expr) => {{
      let auth = Arc::new(GetCurrentCompanyUseCase::new($fx.auth_service.clone()));
      test::init_service(
        App::new()
          .app_data(web::Data::new(Arc::new(CreateCompanyUseCase::new(
            $fx.company_service.clone(),
          ))))
          .app_data(web::Data::new(Arc::new(ListCompaniesUseCase::new(
            $fx.company_service.clone(),
          ))))
          .app_data(web::Data::new(Arc::new(GetCompanyDetailsUseCase::new(
            $fx.company_service.clone(),
          ))))
          .app_data(web::Data::new(Arc::new(ListCustomersUseCase::new(
            $fx.invoice_service.clone(),
          ))))
          .app_data(web::Data::new(Arc::new(CreateCustomerUseCase::new(
            $fx.invoice_service.clone(),
          ))))
          .service(
            web::resource("/companies")
              .guard(guard::Post())
              .to(create_company_handler),
          )
          .service(
            web::scope("/companies")
              .wrap(AuthMiddleware::new(auth))
              .route("", web::get().to(list_companies_handler))
              .route("/{company_id}", web::get().to(get_company_handler))
              .route(
                "/{company_id}/customers",
                web::get().to(list_customers_handler),
              )
              .route(
                "/{company_id}/customers",
                web::post().to(create_customer_handler),
              ),
          ),
      )
      .await
    }};
  }

  fn bearer(fx: &Fixture) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", fx.token))
  }

  #[actix_web::test]
  async fn test_register_company_and_conflicts() {
    let fx = Fixture::new().await;
    let app = company_app!(fx);
    let payload = json!({
      "cnpj": "11.222.333/0001-81",
      "legalName": "Outra Empresa Ltda",
      "email": "contato@outra.com.br",
      "password": "secret123",
      "addressCity": "Campinas",
      "addressState": "sp"
    });

    let req = TestRequest::post()
      .uri("/companies")
      .set_json(&payload)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["cnpj"], "11222333000181");
    assert_eq!(body["taxRegime"], "MEI");
    assert_eq!(body["addressState"], "SP");
    assert!(body.get("password").is_none());

    let req = TestRequest::post()
      .uri("/companies")
      .set_json(&payload)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[actix_web::test]
  async fn test_register_company_validation() {
    let fx = Fixture::new().await;
    let app = company_app!(fx);

    let req = TestRequest::post()
      .uri("/companies")
      .set_json(json!({
        "cnpj": "11.222.333/0001-00",
        "legalName": "Empresa Inválida",
        "email": "x@y.com",
        "password": "secret123"
      }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
  }

  #[actix_web::test]
  async fn test_company_routes_require_token() {
    let fx = Fixture::new().await;
    let app = company_app!(fx);

    let resp = test::call_service(&app, TestRequest::get().uri("/companies").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[actix_web::test]
  async fn test_list_and_details() {
    let fx = Fixture::new().await;
    fx.customer().await;
    let app = company_app!(fx);

    let req = TestRequest::get()
      .uri("/companies")
      .insert_header(bearer(&fx))
      .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));
    assert_eq!(body[0]["legalName"], "Dev MEI Ltda");

    let req = TestRequest::get()
      .uri(&format!("/companies/{}", fx.company.id))
      .insert_header(bearer(&fx))
      .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["customers"][0]["name"], "Maria Souza");
    assert_eq!(body["customers"][0]["documentType"], "CPF");
  }

  #[actix_web::test]
  async fn test_other_tenant_is_forbidden_and_unknown_is_not_found() {
    let fx = Fixture::new().await;
    let other = fx.other_company().await;
    let app = company_app!(fx);

    let req = TestRequest::get()
      .uri(&format!("/companies/{}/customers", other.id))
      .insert_header(bearer(&fx))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::get()
      .uri(&format!("/companies/{}", Uuid::new_v4()))
      .insert_header(bearer(&fx))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[actix_web::test]
  async fn test_create_customer() {
    let fx = Fixture::new().await;
    let app = company_app!(fx);

    let req = TestRequest::post()
      .uri(&format!("/companies/{}/customers", fx.company.id))
      .insert_header(bearer(&fx))
      .set_json(json!({
        "name": "Acme Serviços",
        "document": "11.222.333/0001-81",
        "email": "financeiro@acme.com.br",
        "addressCity": "Campinas"
      }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["document"], "11222333000181");
    assert_eq!(body["documentType"], "CNPJ");
    assert_eq!(body["companyId"], fx.company.id.to_string());

    let req = TestRequest::post()
      .uri(&format!("/companies/{}/customers", fx.company.id))
      .insert_header(bearer(&fx))
      .set_json(json!({ "name": "Sem Documento", "document": "123.456.789-00" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
