use std::process::ExitCode;

use clap::Parser;
use engine::{Ledger, Session};

use crate::{
    client::HttpStore,
    commands::Command,
    error::{AppError, Result},
};

mod client;
mod commands;
mod config;
mod error;
mod export;

/// Concrete pour cost and revenue tracker.
#[derive(Debug, Parser)]
#[command(name = "pourtrack", disable_version_flag = true)]
struct Cli {
    #[command(flatten)]
    overrides: config::Overrides,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let AppError::Engine(engine_err) = &err
                && engine_err.is_auth_expired()
            {
                eprintln!("the server rejected the token; set POURTRACK_CLI_TOKEN and retry");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.overrides)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "pourtrack_cli={level},engine={level}",
            level = config.level
        ))
        .init();

    if config.token.trim().is_empty() {
        return Err(AppError::Usage(
            "no token configured (token in the config file or POURTRACK_CLI_TOKEN)".to_string(),
        ));
    }
    let session = Session::new(config.token.trim());
    let store = HttpStore::new(&config.base_url)?;

    let mut ledger = Ledger::new();
    ledger.refresh(&store, &session).await?;
    tracing::debug!(
        pours = ledger.pours().len(),
        consumables = ledger.catalog().len(),
        "ledger loaded"
    );

    let mut stdout = std::io::stdout().lock();
    commands::execute(cli.command, &mut ledger, &store, &session, &config, &mut stdout).await
}
