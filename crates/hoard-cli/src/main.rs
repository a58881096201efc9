//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use hoard_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env before reading RUST_LOG or HOARD_* variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = CliConfig::resolve(cli.data_dir)?;
    let ctx = bootstrap(config);

    let found = match command {
        Commands::Status { json } => {
            handlers::status::execute(&ctx, json).await?;
            true
        }
        Commands::Locate { track } => handlers::locate::execute(&ctx, &track).await?,
        Commands::MarkPlayed { track } => handlers::mark_played::execute(&ctx, &track).await?,
        Commands::Purge { yes } => {
            handlers::purge::execute(&ctx, yes).await?;
            true
        }
        Commands::Paths => {
            handlers::paths::execute(&ctx)?;
            true
        }
    };

    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
