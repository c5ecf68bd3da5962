use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEV_JWT_SECRET: &str = "dev-secret";

fn default_db_connect_timeout() -> u64 {
  5
}

fn default_db_acquire_timeout() -> u64 {
  3
}

fn default_redis_connect_timeout() -> u64 {
  5
}

fn default_jwt_secret() -> String {
  DEV_JWT_SECRET.to_string()
}

fn default_token_ttl() -> u64 {
  24 * 60 * 60
}

fn default_login_burst() -> u32 {
  5
}

fn default_login_period() -> u64 {
  12
}

fn default_queue_backend() -> QueueBackend {
  QueueBackend::Redis
}

fn default_queue_key() -> String {
  "meifin:emission:jobs".to_string()
}

fn default_poll_timeout() -> u64 {
  1
}

fn default_emission_delay() -> u64 {
  3000
}

fn default_true() -> bool {
  true
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  pub database: DatabaseConfig,
  pub redis: RedisConfig,
  #[serde(default)]
  pub security: SecurityConfig,
  #[serde(default)]
  pub rate_limit: RateLimitConfig,
  #[serde(default)]
  pub queue: QueueConfig,
  #[serde(default)]
  pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
  pub url: String,
  pub max_connections: u32,
  #[serde(default = "default_db_connect_timeout")]
  pub connect_timeout_seconds: u64,
  #[serde(default = "default_db_acquire_timeout")]
  pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
  pub url: String,
  #[serde(default = "default_redis_connect_timeout")]
  pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
  /// HMAC key for access tokens
  #[serde(default = "default_jwt_secret")]
  pub jwt_secret: String,
  #[serde(default = "default_token_ttl")]
  pub token_ttl_seconds: u64,
  /// Set the `Secure` flag on the session cookie (enable behind HTTPS)
  #[serde(default)]
  pub cookie_secure: bool,
}

impl Default for SecurityConfig {
  fn default() -> Self {
    Self {
      jwt_secret: default_jwt_secret(),
      token_ttl_seconds: default_token_ttl(),
      cookie_secure: false,
    }
  }
}

impl SecurityConfig {
  pub fn uses_dev_secret(&self) -> bool {
    self.jwt_secret == DEV_JWT_SECRET
  }
}

/// Login throttling per peer IP: `login_burst` attempts, one more every
/// `login_period_seconds`
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
  #[serde(default = "default_login_burst")]
  pub login_burst: u32,
  #[serde(default = "default_login_period")]
  pub login_period_seconds: u64,
}

impl Default for RateLimitConfig {
  fn default() -> Self {
    Self {
      login_burst: default_login_burst(),
      login_period_seconds: default_login_period(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
  Redis,
  Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
  #[serde(default = "default_queue_backend")]
  pub backend: QueueBackend,
  #[serde(default = "default_queue_key")]
  pub key: String,
  /// How long one dequeue blocks before the worker re-checks for shutdown
  #[serde(default = "default_poll_timeout")]
  pub poll_timeout_seconds: u64,
}

impl Default for QueueConfig {
  fn default() -> Self {
    Self {
      backend: default_queue_backend(),
      key: default_queue_key(),
      poll_timeout_seconds: default_poll_timeout(),
    }
  }
}

impl QueueConfig {
  pub fn poll_timeout(&self) -> Duration {
    Duration::from_secs(self.poll_timeout_seconds.max(1))
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
  /// Simulated municipal response time
  #[serde(default = "default_emission_delay")]
  pub emission_delay_ms: u64,
  #[serde(default = "default_true")]
  pub requeue_pending_on_startup: bool,
}

impl Default for WorkerConfig {
  fn default() -> Self {
    Self {
      emission_delay_ms: default_emission_delay(),
      requeue_pending_on_startup: true,
    }
  }
}

impl WorkerConfig {
  pub fn emission_delay(&self) -> Duration {
    Duration::from_millis(self.emission_delay_ms)
  }
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Later sources override earlier ones:
  /// 1. config/default.toml
  /// 2. config/local.toml (if exists)
  /// 3. config/{RUN_MODE}.toml (if exists)
  /// 4. Environment variables with the MEIFIN_ prefix, sections separated by
  ///    double underscores: `MEIFIN_SERVER__PORT=8080`,
  ///    `MEIFIN_SECURITY__JWT_SECRET=...`, `MEIFIN_QUEUE__BACKEND=memory`
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      .add_source(File::with_name("config/default").required(true))
      .add_source(File::with_name("config/local").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      .add_source(
        Environment::with_prefix("MEIFIN")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    config.try_deserialize()
  }
}
