use actix_web::{HttpRequest, HttpResponse, http::header, web};
use std::sync::Arc;
use uuid::Uuid;

use super::{redirect_with_flash, render_html};
use crate::adapters::http::{
  dtos::{FlashQuery, RegisterForm},
  errors::ApiError,
  middleware::{AuthCompany, SESSION_COOKIE},
  templates::TemplateEngine,
};
use crate::application::auth::GetCurrentCompanyUseCase;
use crate::application::company::{GetCompanyDetailsUseCase, ListCompaniesUseCase};
use crate::application::invoice::{ListInvoicesCommand, ListInvoicesUseCase};

const TABS: [&str; 2] = ["customers", "invoices"];

fn insert_flash(context: &mut tera::Context, flash: &FlashQuery) {
  context.insert("error", &flash.error);
  context.insert("notice", &flash.notice);
}

/// Render login page; a still-valid session goes straight to the dashboard
pub async fn login_page(
  req: HttpRequest,
  templates: web::Data<TemplateEngine>,
  use_case: web::Data<Arc<GetCurrentCompanyUseCase>>,
  query: web::Query<FlashQuery>,
) -> Result<HttpResponse, ApiError> {
  if let Some(cookie) = req.cookie(SESSION_COOKIE) {
    if use_case.authenticate(cookie.value()).await.is_ok() {
      return Ok(
        HttpResponse::Found()
          .insert_header((header::LOCATION, "/"))
          .finish(),
      );
    }
  }

  let mut context = tera::Context::new();
  context.insert("title", "Entrar");
  context.insert("email", "");
  insert_flash(&mut context, &query);

  render_html(&templates, "pages/login.html.tera", &context)
}

/// GET /register - company sign-up; open with or without a session
pub async fn register_page(
  templates: web::Data<TemplateEngine>,
  query: web::Query<FlashQuery>,
) -> Result<HttpResponse, ApiError> {
  let mut context = tera::Context::new();
  context.insert("title", "Cadastrar empresa");
  context.insert("form", &RegisterForm::default());
  insert_flash(&mut context, &query);

  render_html(&templates, "pages/register.html.tera", &context)
}

/// GET / - companies of the signed-in account
pub async fn dashboard_page(
  req: HttpRequest,
  templates: web::Data<TemplateEngine>,
  use_case: web::Data<Arc<ListCompaniesUseCase>>,
  query: web::Query<FlashQuery>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let companies = use_case.execute(&principal).await?;

  let mut context = tera::Context::new();
  context.insert("title", "Empresas MEI");
  context.insert("principal_email", &principal.email);
  context.insert("companies", &companies);
  insert_flash(&mut context, &query);

  render_html(&templates, "pages/dashboard.html.tera", &context)
}

/// GET /companies/{company_id} - "Clientes" and "Notas Fiscais" tabs
pub async fn company_page(
  req: HttpRequest,
  path: web::Path<Uuid>,
  templates: web::Data<TemplateEngine>,
  details_use_case: web::Data<Arc<GetCompanyDetailsUseCase>>,
  invoices_use_case: web::Data<Arc<ListInvoicesUseCase>>,
  query: web::Query<FlashQuery>,
) -> Result<HttpResponse, ApiError> {
  let principal = req.principal()?;
  let company_id = path.into_inner();

  let details = match details_use_case.execute(&principal, company_id).await {
    Ok(details) => details,
    Err(e) => {
      let api_error = ApiError::from(e);
      if matches!(api_error, ApiError::Internal(_)) {
        return Err(api_error);
      }
      return Ok(redirect_with_flash(
        "/",
        &FlashQuery {
          error: Some(api_error.public_message()),
          ..Default::default()
        },
      ));
    }
  };

  let invoices = invoices_use_case
    .execute(
      &principal,
      ListInvoicesCommand {
        company_id: Some(company_id),
      },
    )
    .await?;

  let tab = query
    .tab
    .as_deref()
    .filter(|t| TABS.contains(t))
    .unwrap_or("customers");

  let mut context = tera::Context::new();
  context.insert("title", &details.company.legal_name);
  context.insert("principal_email", &principal.email);
  context.insert("company", &details.company);
  context.insert("customers", &details.customers);
  context.insert("invoices", &invoices);
  context.insert("tab", tab);
  insert_flash(&mut context, &query);

  render_html(&templates, "pages/company.html.tera", &context)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::http::middleware::WebAuthMiddleware;
  use crate::adapters::http::templates::test_engine;
  use crate::test_support::Fixture;
  use actix_web::{
    App,
    cookie::Cookie,
    http::StatusCode,
    test::{self, TestRequest},
  };

  macro_rules! pages_app {
    ($fx:expr) => {{
      let auth = Arc::new(GetCurrentCompanyUseCase::new($fx.auth_service.clone()));
      test::init_service(
        App::new()
          .app_data(web::Data::new(test_engine()))
          .app_data(web::Data::new(auth.clone()))
          .app_data(web::Data::new(Arc::new(ListCompaniesUseCase::new(
            $fx.company_service.clone(),
          ))))
          .app_data(web::Data::new(Arc::new(GetCompanyDetailsUseCase::new(
            $fx.company_service.clone(),
          ))))
          .app_data(web::Data::new(Arc::new(ListInvoicesUseCase::new(
            $fx.invoice_service.clone(),
          ))))
          .route("/login", web::get().to(login_page))
          .service(
            web::scope("")
              .wrap(WebAuthMiddleware::new(auth))
              .route("/", web::get().to(dashboard_page))
              .route("/companies/{company_id}", web::get().to(company_page)),
          ),
      )
      .await
    }};
  }

  async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
  }

  #[actix_web::test]
  async fn test_login_page_renders_and_redirects_when_signed_in() {
    let fx = Fixture::new().await;
    let app = pages_app!(fx);

    let resp = test::call_service(
      &app,
      TestRequest::get()
        .uri("/login?error=Credenciais+inv%C3%A1lidas")
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Credenciais inválidas"));

    let req = TestRequest::get()
      .uri("/login")
      .cookie(Cookie::new(SESSION_COOKIE, fx.token.clone()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
  }

  #[actix_web::test]
  async fn test_dashboard_lists_company_with_formatted_cnpj() {
    let fx = Fixture::new().await;
    let app = pages_app!(fx);

    let req = TestRequest::get()
      .uri("/")
      .cookie(Cookie::new(SESSION_COOKIE, fx.token.clone()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Dev MEI Ltda"));
    assert!(html.contains("00.000.000/0001-91"));
    assert!(html.contains("São Paulo/SP"));
    assert!(html.contains(&format!("/companies/{}", fx.company.id)));
  }

  #[actix_web::test]
  async fn test_dashboard_requires_session() {
    let fx = Fixture::new().await;
    let app = pages_app!(fx);

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
  }

  #[actix_web::test]
  async fn test_company_page_formats_customers_and_invoices() {
    let fx = Fixture::new().await;
    let invoice = fx.draft_invoice().await;
    let app = pages_app!(fx);

    let req = TestRequest::get()
      .uri(&format!("/companies/{}?tab=invoices", fx.company.id))
      .cookie(Cookie::new(SESSION_COOKIE, fx.token.clone()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;

    assert!(html.contains("Clientes"));
    assert!(html.contains("Notas Fiscais"));
    assert!(html.contains("529.982.247-25"));
    assert!(html.contains("R$ 1.500,00"));
    assert!(html.contains("Rascunho"));
    assert!(html.contains(&format!("/invoices/{}/emit", invoice.id)));
  }

  #[actix_web::test]
  async fn test_foreign_company_redirects_home_with_error() {
    let fx = Fixture::new().await;
    let other = fx.other_company().await;
    let app = pages_app!(fx);

    let req = TestRequest::get()
      .uri(&format!("/companies/{}", other.id))
      .cookie(Cookie::new(SESSION_COOKIE, fx.token.clone()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
      .headers()
      .get(header::LOCATION)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(location.starts_with("/?error="));
  }
}
