//! `pgsandbox hello` - random quote service

use anyhow::{Context, Result};
use clap::Args;

use pgsandbox_server::db::migrations;
use pgsandbox_server::http::{hello_app, run_server};

use super::serve::{DbArgs, HttpArgs};

const DEFAULT_PORT: u16 = 8081;

/// Arguments for the hello command
#[derive(Args, Debug)]
pub struct HelloArgs {
    #[command(flatten)]
    pub http: HttpArgs,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Run the random quote service
pub async fn run_hello(args: HelloArgs) -> Result<()> {
    let config = args.http.server_config(DEFAULT_PORT);

    let pool = args.db.connect().await?;
    migrations::quotes(&pool)
        .await
        .context("Failed to create hello table")?;

    run_server(hello_app(pool, &config), &config)
        .await
        .context("Server error")?;

    Ok(())
}
