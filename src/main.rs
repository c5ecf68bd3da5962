use actix_files as fs;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{App, HttpServer, dev::Service, guard, middleware::Logger, web};
use anyhow::{Context, anyhow};
use futures_util::TryFutureExt;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meifin::{
  adapters::http::{
    RequestIdMiddleware, SessionSettings, TemplateEngine, UseCases, WebRouteDependencies,
    configure_api_routes, configure_system_routes, configure_web_routes, login_handler,
    login_submit, rate_limit_to_api_error, rate_limit_to_login_redirect,
  },
  domain::auth::AuthService,
  domain::company::CompanyService,
  domain::invoice::{EmissionQueue, InvoiceService, InvoiceServiceDependencies},
  infrastructure::{
    config::{Config, QueueBackend, RedisConfig},
    metrics,
    nfse::SimulatedNfseGateway,
    persistence::postgres::{
      PostgresCompanyRepository, PostgresCustomerRepository, PostgresInvoiceRepository,
    },
    queue::{InMemoryEmissionQueue, RedisEmissionQueue},
    security::{Argon2PasswordHasher, JwtTokenIssuer},
    worker::EmissionWorker,
  },
};

async fn connect_redis(config: &RedisConfig) -> anyhow::Result<ConnectionManager> {
  let client = redis::Client::open(config.url.clone()).context("Invalid Redis URL")?;

  tokio::time::timeout(
    Duration::from_secs(config.connect_timeout_seconds),
    client.get_connection_manager(),
  )
  .await
  .map_err(|_| {
    anyhow!(
      "Redis connection timed out after {} seconds. Is Redis running?",
      config.connect_timeout_seconds
    )
  })?
  .with_context(|| format!("Could not connect to Redis at {}", config.url))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meifin=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting MEI Fin");

  let config = Config::load().context("Failed to load configuration")?;
  if config.security.uses_dev_secret() {
    tracing::warn!("Using the development JWT secret; set MEIFIN_SECURITY__JWT_SECRET");
  }

  // Database
  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .map_err(|_| {
    anyhow!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Could not connect to database")?;
  tracing::info!("Database connection pool created");

  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  // Emission queue
  let queue: Arc<dyn EmissionQueue> = match config.queue.backend {
    QueueBackend::Redis => {
      let producer = connect_redis(&config.redis).await?;
      let consumer = connect_redis(&config.redis).await?;
      tracing::info!(key = %config.queue.key, "Redis emission queue ready");
      Arc::new(RedisEmissionQueue::new(
        producer,
        consumer,
        config.queue.key.clone(),
        config.queue.poll_timeout(),
      ))
    }
    QueueBackend::Memory => {
      tracing::warn!("Using the in-memory emission queue; jobs are lost on restart");
      Arc::new(InMemoryEmissionQueue::new(config.queue.poll_timeout()))
    }
  };

  // Repositories and services
  let company_repo = Arc::new(PostgresCompanyRepository::new(db_pool.clone()));
  let customer_repo = Arc::new(PostgresCustomerRepository::new(db_pool.clone()));
  let invoice_repo = Arc::new(PostgresInvoiceRepository::new(db_pool.clone()));

  let password_hasher =
    Arc::new(Argon2PasswordHasher::new().context("Failed to create password hasher")?);
  let token_issuer = Arc::new(JwtTokenIssuer::new(
    &config.security.jwt_secret,
    chrono::Duration::seconds(config.security.token_ttl_seconds as i64),
  ));

  let auth_service = Arc::new(AuthService::new(
    company_repo.clone(),
    password_hasher.clone(),
    token_issuer,
  ));
  let company_service = Arc::new(CompanyService::new(
    company_repo.clone(),
    customer_repo.clone(),
    password_hasher,
  ));
  let invoice_service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
    invoice_repo,
    customer_repo,
    company_repo,
    emission_queue: queue.clone(),
    nfse_gateway: Arc::new(SimulatedNfseGateway::new(config.worker.emission_delay())),
  }));

  metrics::init();

  // Background worker
  if config.worker.requeue_pending_on_startup {
    match invoice_service.requeue_pending().await {
      Ok(0) => {}
      Ok(count) => tracing::info!(count, "Re-enqueued pending invoices"),
      Err(e) => tracing::error!(error = %e, "Failed to re-enqueue pending invoices"),
    }
  }

  let shutdown = CancellationToken::new();
  let worker = EmissionWorker::new(invoice_service.clone(), queue, shutdown.clone()).spawn();

  // HTTP
  let use_cases = UseCases::new(auth_service, company_service, invoice_service);
  let web_deps = WebRouteDependencies {
    use_cases: use_cases.clone(),
    templates: TemplateEngine::new().context("Failed to load templates")?,
    session: SessionSettings {
      cookie_secure: config.security.cookie_secure,
    },
  };

  // Shared by the API and dashboard logins, keyed by peer IP
  let login_limit = GovernorConfigBuilder::default()
    .period(Duration::from_secs(config.rate_limit.login_period_seconds.max(1)))
    .burst_size(config.rate_limit.login_burst.max(1))
    .finish()
    .context("Invalid login rate limit configuration")?;

  let server_host = config.server.host.clone();
  let server_port = config.server.port;
  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    App::new()
      .wrap(RequestIdMiddleware::new())
      .wrap(Logger::default())
      .configure(configure_system_routes)
      .service(fs::Files::new("/static", "./static"))
      .service(
        web::scope("/api/v1")
          .service(
            web::resource("/auth/login")
              .wrap(Governor::new(&login_limit))
              .wrap_fn(|req, srv| srv.call(req).map_err(rate_limit_to_api_error))
              .route(web::post().to(login_handler)),
          )
          .configure(|cfg| configure_api_routes(cfg, &use_cases)),
      )
      .service(
        web::resource("/login")
          .guard(guard::Post())
          .wrap(Governor::new(&login_limit))
          .wrap_fn(|req, srv| srv.call(req).map_err(rate_limit_to_login_redirect))
          .to(login_submit),
      )
      .configure(|cfg| configure_web_routes(cfg, &web_deps))
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await?;

  tracing::info!("HTTP server stopped, waiting for the emission worker");
  shutdown.cancel();
  if let Err(e) = worker.await {
    tracing::error!(error = %e, "Emission worker panicked");
  }

  Ok(())
}
