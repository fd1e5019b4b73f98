//! `pgsandbox query` - user lookup service

use anyhow::{Context, Result};
use clap::Args;

use pgsandbox_server::db::migrations;
use pgsandbox_server::http::{query_app, run_server};

use super::serve::{DbArgs, HttpArgs};

const DEFAULT_PORT: u16 = 8083;

/// Arguments for the query command
#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub http: HttpArgs,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Run the user lookup service
pub async fn run_query(args: QueryArgs) -> Result<()> {
    let config = args.http.server_config(DEFAULT_PORT);

    let pool = args.db.connect().await?;
    migrations::users(&pool)
        .await
        .context("Failed to create users table")?;

    run_server(query_app(pool, &config), &config)
        .await
        .context("Server error")?;

    Ok(())
}
