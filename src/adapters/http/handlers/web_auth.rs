use actix_web::{
  HttpResponse, ResponseError,
  cookie::{Cookie, SameSite, time::Duration as CookieDuration},
  error::InternalError,
  http::StatusCode,
  web,
};
use chrono::Utc;
use std::sync::Arc;

use super::{redirect_with_flash, see_other};
use crate::adapters::http::{
  dtos::{FlashQuery, LoginForm, RegisterForm},
  errors::ApiError,
  middleware::SESSION_COOKIE,
  templates::TemplateEngine,
};
use crate::application::auth::{LoginCompanyCommand, LoginCompanyResponse, LoginCompanyUseCase};
use crate::application::company::CreateCompanyUseCase;
use crate::domain::auth::AuthError;

const INVALID_LOGIN: &str = "E-mail ou senha inválidos";
const TOO_MANY_ATTEMPTS: &str = "Muitas tentativas de login. Aguarde alguns instantes.";

/// Session cookie attributes that depend on the deployment
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSettings {
  pub cookie_secure: bool,
}

/// Handle login form submission
///
/// On success the access token is stored in the `session` cookie, which
/// expires together with the token.
pub async fn login_submit(
  form: web::Form<LoginForm>,
  use_case: web::Data<Arc<LoginCompanyUseCase>>,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<SessionSettings>,
) -> Result<HttpResponse, ApiError> {
  let form = form.into_inner();
  let command = LoginCompanyCommand {
    email: form.email.clone(),
    password: form.password,
  };

  match use_case.execute(command).await {
    Ok(response) => {
      tracing::info!(company_id = %response.company_id, "Dashboard login");
      signed_in(see_other("/"), response, &settings)
    }
    Err(AuthError::InvalidCredentials) => {
      let mut context = tera::Context::new();
      context.insert("title", "Entrar");
      context.insert("email", &form.email);
      context.insert("error", INVALID_LOGIN);
      context.insert("notice", &None::<String>);

      let html = templates
        .render("pages/login.html.tera", &context)
        .map_err(|e| ApiError::Internal(format!("Template error: {:?}", e)))?;

      Ok(
        HttpResponse::Unauthorized()
          .content_type("text/html; charset=utf-8")
          .body(html),
      )
    }
    Err(e) => Err(e.into()),
  }
}

/// Handle the registration form
///
/// The new company is signed in right away, replacing any current session.
/// Rejected input re-renders the form with what was typed, minus the password.
pub async fn register_submit(
  form: web::Form<RegisterForm>,
  create_company: web::Data<Arc<CreateCompanyUseCase>>,
  login: web::Data<Arc<LoginCompanyUseCase>>,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<SessionSettings>,
) -> Result<HttpResponse, ApiError> {
  let form = form.into_inner();

  let company = match create_company.execute(form.to_command()).await {
    Ok(company) => company,
    Err(e) => {
      let api_error = ApiError::from(e);
      if matches!(api_error, ApiError::Internal(_)) {
        return Err(api_error);
      }

      let mut context = tera::Context::new();
      context.insert("title", "Cadastrar empresa");
      context.insert("form", &form);
      context.insert("error", &api_error.public_message());
      context.insert("notice", &None::<String>);

      let html = templates
        .render("pages/register.html.tera", &context)
        .map_err(|e| ApiError::Internal(format!("Template error: {:?}", e)))?;

      return Ok(
        HttpResponse::build(api_error.status_code())
          .content_type("text/html; charset=utf-8")
          .body(html),
      );
    }
  };
  tracing::info!(company_id = %company.id, "Company registered from dashboard");

  let response = login
    .execute(LoginCompanyCommand {
      email: company.email.clone(),
      password: form.password,
    })
    .await?;

  let welcome = redirect_with_flash(
    "/",
    &FlashQuery {
      notice: Some(format!("Empresa {} cadastrada", company.legal_name)),
      ..Default::default()
    },
  );
  signed_in(welcome, response, &settings)
}

/// Stores the access token in the `session` cookie, expiring with the token
fn signed_in(
  mut redirect: HttpResponse,
  response: LoginCompanyResponse,
  settings: &SessionSettings,
) -> Result<HttpResponse, ApiError> {
  let seconds = (response.expires_at - Utc::now()).num_seconds().max(0);
  let cookie = Cookie::build(SESSION_COOKIE, response.access_token)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(settings.cookie_secure)
    .max_age(CookieDuration::seconds(seconds))
    .finish();

  redirect
    .add_cookie(&cookie)
    .map_err(|e| ApiError::Internal(format!("Cookie error: {}", e)))?;
  Ok(redirect)
}

/// Handle logout
pub async fn logout() -> HttpResponse {
  let cookie = Cookie::build(SESSION_COOKIE, "")
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(CookieDuration::seconds(0))
    .finish();

  HttpResponse::SeeOther()
    .cookie(cookie)
    .insert_header(("Location", "/login"))
    .finish()
}

/// Turns the throttled login form into a redirect back to the login page
pub fn rate_limit_to_login_redirect(error: actix_web::Error) -> actix_web::Error {
  if error.as_response_error().status_code() != StatusCode::TOO_MANY_REQUESTS {
    return error;
  }

  tracing::warn!("Dashboard login rate limit exceeded");
  let response = redirect_with_flash(
    "/login",
    &FlashQuery {
      error: Some(TOO_MANY_ATTEMPTS.to_string()),
      ..Default::default()
    },
  );
  InternalError::from_response(TOO_MANY_ATTEMPTS, response).into()
}
