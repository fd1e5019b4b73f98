//! Arguments and startup shared by every service command

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use pgsandbox_server::db::{connect_with_retry, DbConfig, PgPool, RetryPolicy};
use pgsandbox_server::ServerConfig;

/// HTTP listener options
#[derive(Args, Debug, Clone)]
pub struct HttpArgs {
    /// Address to bind to (default depends on the service)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Abort a request that takes longer than this many seconds
    #[arg(long, default_value = "30")]
    pub request_timeout_secs: u64,
}

impl HttpArgs {
    pub fn server_config(&self, default_port: u16) -> ServerConfig {
        ServerConfig {
            bind_addr: self
                .bind
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], default_port))),
            cors_permissive: self.cors_permissive,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// PostgreSQL connection options
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Database URL (overrides the discrete --db-* options)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Database host
    #[arg(long, env = "PGHOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "PGPORT", default_value = "5432")]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "PGUSER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "PGDATABASE", default_value = "sandbox")]
    pub db_name: String,

    /// Maximum pooled connections
    #[arg(long, default_value = "10")]
    pub max_connections: u32,

    /// Bound on a single database round-trip, in milliseconds
    #[arg(long, default_value = "5000", value_parser = clap::value_parser!(u64).range(1..))]
    pub store_timeout_ms: u64,

    /// Connection attempts at startup before giving up
    #[arg(long, default_value = "5")]
    pub connect_attempts: u32,

    /// Pause between connection attempts, in milliseconds
    #[arg(long, default_value = "2000")]
    pub connect_delay_ms: u64,
}

impl DbArgs {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.database_url.clone(),
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            dbname: self.db_name.clone(),
            max_connections: self.max_connections,
            statement_timeout: self.store_timeout(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.connect_attempts,
            delay: Duration::from_millis(self.connect_delay_ms),
        }
    }

    /// Connect, retrying while the database comes up.
    pub async fn connect(&self) -> Result<PgPool> {
        let config = self.db_config();
        tracing::info!("Connecting to {}", config.display_target());

        connect_with_retry(&config, self.retry_policy())
            .await
            .with_context(|| format!("Failed to connect to {}", config.display_target()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches, Parser};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        http: HttpArgs,
        #[command(flatten)]
        db: DbArgs,
    }

    // PG* and DATABASE_URL from the surrounding shell must not leak in
    fn try_parse(args: &[&str]) -> Result<TestCli, clap::Error> {
        let matches = TestCli::command()
            .mut_args(|arg| arg.env(None::<&str>))
            .try_get_matches_from(args)?;
        TestCli::from_arg_matches(&matches)
    }

    fn parse(args: &[&str]) -> TestCli {
        try_parse(args).unwrap()
    }

    #[test]
    fn bind_falls_back_to_service_port() {
        let cli = parse(&["test"]);
        assert_eq!(cli.http.server_config(8083).bind_addr.port(), 8083);

        let cli = parse(&["test", "--bind", "127.0.0.1:9000"]);
        assert_eq!(cli.http.server_config(8083).bind_addr.port(), 9000);
    }

    #[test]
    fn db_defaults_match_local_sandbox() {
        let config = parse(&["test"]).db.db_config();
        assert_eq!(config.url, None);
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "sandbox");
        assert_eq!(config.statement_timeout, Duration::from_secs(5));
    }

    #[test]
    fn store_timeout_bounds_statements() {
        let cli = parse(&["test", "--store-timeout-ms", "250", "--db-name", "counts"]);
        let config = cli.db.db_config();
        assert_eq!(config.statement_timeout, Duration::from_millis(250));
        assert_eq!(config.dbname, "counts");
    }

    #[test]
    fn zero_store_timeout_is_rejected() {
        assert!(try_parse(&["test", "--store-timeout-ms", "0"]).is_err());
        assert!(try_parse(&["test", "--store-timeout-ms", "1"]).is_ok());
    }
}
