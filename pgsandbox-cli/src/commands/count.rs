//! `pgsandbox count` - shared counter service

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use pgsandbox_server::db::migrations;
use pgsandbox_server::http::{count_app, run_server};
use pgsandbox_server::{CounterService, CounterStore, MemoryStore, PgCounterStore};

use super::serve::{DbArgs, HttpArgs};

const DEFAULT_PORT: u16 = 8082;

/// Arguments for the count command
#[derive(Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    pub http: HttpArgs,

    #[command(flatten)]
    pub db: DbArgs,

    /// Keep the counter in process memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,
}

/// Run the counter service
pub async fn run_count(args: CountArgs) -> Result<()> {
    let config = args.http.server_config(DEFAULT_PORT);

    let store: Arc<dyn CounterStore> = if args.in_memory {
        tracing::warn!("Using in-memory counter store; the value is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = args.db.connect().await?;
        migrations::counter(&pool)
            .await
            .context("Failed to create counter table")?;
        Arc::new(PgCounterStore::new(pool))
    };

    let counter = CounterService::with_timeout(store, args.db.store_timeout());
    counter
        .initialize()
        .await
        .context("Failed to initialize counter")?;

    run_server(count_app(counter, &config), &config)
        .await
        .context("Server error")?;

    Ok(())
}
