//! pgsandbox CLI - runs one of the PostgreSQL-backed sandbox services
//!
//! - `count`: shared counter (GET/POST /count), default port 8082
//! - `hello`: random quotes (GET /get, POST /post), default port 8081
//! - `query`: user lookup (GET/POST /api/user), default port 8083

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "pgsandbox",
    author,
    version,
    about = "Small PostgreSQL-backed HTTP services: counter, quotes, user lookup"
)]
struct Cli {
    /// Debug logging (when RUST_LOG is not set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the shared counter service
    Count(commands::count::CountArgs),
    /// Run the random quote service
    Hello(commands::hello::HelloArgs),
    /// Run the user lookup service
    Query(commands::query::QueryArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

impl Commands {
    fn service_name(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::Hello(_) => "hello",
            Self::Query(_) => "query",
            Self::Completions(_) => "cli",
        }
    }
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so clap's `env` fallbacks see .env values
    let env_files = config::load_dotenv();
    let cli = Cli::parse();

    if let Commands::Completions(args) = &cli.command {
        return run_completions(args);
    }

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
        service: cli.command.service_name(),
    })?;

    for path in &env_files {
        info!("Loaded environment from {}", path.display());
    }

    let result = match cli.command {
        Commands::Count(args) => commands::run_count(args).await,
        Commands::Hello(args) => commands::run_hello(args).await,
        Commands::Query(args) => commands::run_query(args).await,
        Commands::Completions(_) => Ok(()),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: &CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
