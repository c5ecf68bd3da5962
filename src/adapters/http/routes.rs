use actix_web::{guard, web};
use std::sync::Arc;

use crate::application::auth::{GetCurrentCompanyUseCase, LoginCompanyUseCase};
use crate::application::company::{
  CreateCompanyUseCase, GetCompanyDetailsUseCase, ListCompaniesUseCase,
};
use crate::application::invoice::{
  CreateCustomerUseCase, CreateInvoiceUseCase, EmitInvoiceUseCase, GetInvoiceDetailsUseCase,
  ListCustomersUseCase, ListInvoicesUseCase,
};
use crate::domain::auth::AuthService;
use crate::domain::company::CompanyService;
use crate::domain::invoice::InvoiceService;

use super::errors::{json_error_handler, path_error_handler, query_error_handler};
use super::handlers::auth::me_handler;
use super::handlers::company::{
  create_company_handler, create_customer_handler, get_company_handler, list_companies_handler,
  list_customers_handler,
};
use super::handlers::invoices::{
  create_invoice_handler, emit_invoice_handler, get_invoice_handler, list_invoices_handler,
};
use super::handlers::web_auth::SessionSettings;
use super::handlers::{forms, pages, system, web_auth};
use super::middleware::{AuthMiddleware, WebAuthMiddleware};
use super::templates::TemplateEngine;

/// Every use case the HTTP layer calls, built once and shared by the JSON API
/// and the dashboard
#[derive(Clone)]
pub struct UseCases {
  pub login: Arc<LoginCompanyUseCase>,
  pub current_company: Arc<GetCurrentCompanyUseCase>,
  pub create_company: Arc<CreateCompanyUseCase>,
  pub list_companies: Arc<ListCompaniesUseCase>,
  pub company_details: Arc<GetCompanyDetailsUseCase>,
  pub create_customer: Arc<CreateCustomerUseCase>,
  pub list_customers: Arc<ListCustomersUseCase>,
  pub create_invoice: Arc<CreateInvoiceUseCase>,
  pub list_invoices: Arc<ListInvoicesUseCase>,
  pub invoice_details: Arc<GetInvoiceDetailsUseCase>,
  pub emit_invoice: Arc<EmitInvoiceUseCase>,
}

impl UseCases {
  pub fn new(
    auth_service: Arc<AuthService>,
    company_service: Arc<CompanyService>,
    invoice_service: Arc<InvoiceService>,
  ) -> Self {
    Self {
      login: Arc::new(LoginCompanyUseCase::new(auth_service.clone())),
      current_company: Arc::new(GetCurrentCompanyUseCase::new(auth_service)),
      create_company: Arc::new(CreateCompanyUseCase::new(company_service.clone())),
      list_companies: Arc::new(ListCompaniesUseCase::new(company_service.clone())),
      company_details: Arc::new(GetCompanyDetailsUseCase::new(company_service)),
      create_customer: Arc::new(CreateCustomerUseCase::new(invoice_service.clone())),
      list_customers: Arc::new(ListCustomersUseCase::new(invoice_service.clone())),
      create_invoice: Arc::new(CreateInvoiceUseCase::new(invoice_service.clone())),
      list_invoices: Arc::new(ListInvoicesUseCase::new(invoice_service.clone())),
      invoice_details: Arc::new(GetInvoiceDetailsUseCase::new(invoice_service.clone())),
      emit_invoice: Arc::new(EmitInvoiceUseCase::new(invoice_service)),
    }
  }

  fn register(&self, cfg: &mut web::ServiceConfig) {
    cfg
      .app_data(web::Data::new(self.login.clone()))
      .app_data(web::Data::new(self.current_company.clone()))
      .app_data(web::Data::new(self.create_company.clone()))
      .app_data(web::Data::new(self.list_companies.clone()))
      .app_data(web::Data::new(self.company_details.clone()))
      .app_data(web::Data::new(self.create_customer.clone()))
      .app_data(web::Data::new(self.list_customers.clone()))
      .app_data(web::Data::new(self.create_invoice.clone()))
      .app_data(web::Data::new(self.list_invoices.clone()))
      .app_data(web::Data::new(self.invoice_details.clone()))
      .app_data(web::Data::new(self.emit_invoice.clone()));
  }
}

/// Configure the JSON API
///
/// Mounted under `/api/v1`. `POST /auth/login` is registered by the caller,
/// wrapped in the login rate limiter. Extractor failures answer with the
/// same JSON error body as the handlers.
///
/// # Routes
///
/// - POST /companies - Register a company (public)
/// - GET /auth/me - Signed-in company
/// - GET /companies - Companies visible to the caller
/// - GET /companies/:company_id - Company with its customers
/// - GET|POST /companies/:company_id/customers - List or create customers
/// - GET|POST /invoices - List (optionally `?companyId=`) or draft invoices
/// - GET /invoices/:invoice_id - Invoice details
/// - POST /invoices/:invoice_id/emit - Request emission (202)
pub fn configure_api_routes(cfg: &mut web::ServiceConfig, use_cases: &UseCases) {
  use_cases.register(cfg);
  let auth = use_cases.current_company.clone();

  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler));

  cfg
    .service(
      web::resource("/companies")
        .guard(guard::Post())
        .to(create_company_handler),
    )
    .service(
      web::resource("/auth/me")
        .wrap(AuthMiddleware::new(auth.clone()))
        .route(web::get().to(me_handler)),
    )
    .service(
      web::scope("/companies")
        .wrap(AuthMiddleware::new(auth.clone()))
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
    )
    .service(
      web::scope("/invoices")
        .wrap(AuthMiddleware::new(auth))
        .route("", web::post().to(create_invoice_handler))
        .route("", web::get().to(list_invoices_handler))
        .route("/{invoice_id}", web::get().to(get_invoice_handler))
        .route("/{invoice_id}/emit", web::post().to(emit_invoice_handler)),
    );
}

/// Everything the dashboard needs
#[derive(Clone)]
pub struct WebRouteDependencies {
  pub use_cases: UseCases,
  pub templates: TemplateEngine,
  pub session: SessionSettings,
}

/// Configure web UI routes
///
/// `POST /login` is registered by the caller, wrapped in the login rate
/// limiter. `/register` is public and signs the new company in. Pages behind the session cookie redirect to `/login` when it is
/// missing or expired.
pub fn configure_web_routes(cfg: &mut web::ServiceConfig, deps: &WebRouteDependencies) {
  deps.use_cases.register(cfg);
  cfg
    .app_data(web::Data::new(deps.templates.clone()))
    .app_data(web::Data::new(deps.session));

  // Public routes
  cfg
    .route("/login", web::get().to(pages::login_page))
    .route("/register", web::get().to(pages::register_page))
    .route("/register", web::post().to(web_auth::register_submit))
    .route("/logout", web::post().to(web_auth::logout));

  // Protected routes
  let session = || WebAuthMiddleware::new(deps.use_cases.current_company.clone());
  cfg
    .service(
      web::resource("/")
        .wrap(session())
        .route(web::get().to(pages::dashboard_page)),
    )
    .service(
      web::resource("/companies/{company_id}")
        .wrap(session())
        .route(web::get().to(pages::company_page)),
    )
    .service(
      web::resource("/companies/{company_id}/customers")
        .wrap(session())
        .route(web::post().to(forms::create_customer_submit)),
    )
    .service(
      web::resource("/companies/{company_id}/invoices")
        .wrap(session())
        .route(web::post().to(forms::create_invoice_submit)),
    )
    .service(
      web::resource("/invoices/{invoice_id}/emit")
        .wrap(session())
        .route(web::post().to(forms::emit_invoice_submit)),
    );
}

/// Liveness and Prometheus endpoints
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(system::health_check))
    .route("/metrics", web::get().to(system::metrics_handler));
}
