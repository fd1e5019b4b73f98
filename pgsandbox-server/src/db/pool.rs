//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits and fail-fast timeouts.
//! Connection establishment is retried at startup only; once serving,
//! store failures go straight back to the caller.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default for acquiring a connection and for server-side statements.
const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to reach PostgreSQL.
///
/// `url` wins when set; otherwise the discrete fields are used.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub dbname: String,
    pub max_connections: u32,
    /// Bounds pool acquisition and every statement on the server.
    pub statement_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            dbname: "sandbox".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }
}

impl DbConfig {
    /// Build sqlx connect options, applying `statement_timeout` server-side.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        let options = match &self.url {
            Some(url) => url.parse::<PgConnectOptions>()?,
            None => {
                let options = PgConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .username(&self.user)
                    .database(&self.dbname)
                    .ssl_mode(PgSslMode::Disable);
                match &self.password {
                    Some(password) => options.password(password),
                    None => options,
                }
            }
        };

        let statement_timeout = format!("{}ms", self.statement_timeout.as_millis());
        Ok(options.options([("statement_timeout", statement_timeout.as_str())]))
    }

    /// Connection target without credentials, for logs.
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}@{}:{}/{}", self.user, self.host, self.port, self.dbname),
        }
    }
}

/// How often to try reaching the database before giving up at startup.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// Create a PostgreSQL connection pool.
///
/// Establishes one connection eagerly so an unreachable database is
/// reported here rather than on the first request.
///
/// # Errors
///
/// Returns an error if the options are invalid or the connection fails.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.statement_timeout)
        .connect_with(config.connect_options()?)
        .await
}

/// [`create_pool`] with retry-on-startup.
///
/// Returns the last error once `policy.attempts` is exhausted.
pub async fn connect_with_retry(
    config: &DbConfig,
    policy: RetryPolicy,
) -> Result<PgPool, sqlx::Error> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match create_pool(config).await {
            Ok(pool) => {
                tracing::info!(db = %config.display_target(), attempt, "Database connected");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    attempts,
                    error = %e,
                    "Database not reachable, retrying in {:?}",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
