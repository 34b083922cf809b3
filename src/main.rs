mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::check::{self, CheckArgs};
use crate::cmd::render::{self, RenderArgs};
use crate::error::AppResult;

#[derive(Parser)]
#[command(
    name = "apidiff-gate",
    author,
    version,
    about = "Report Go API compatibility changes on pull requests"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two revisions, publish the report, and gate on breaking changes.
    Check(CheckArgs),
    /// Render a report from saved apidiff output.
    Render(RenderArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error!("Action failed: {error}");
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands) -> AppResult<i32> {
    match command {
        Commands::Check(args) => {
            let status = check::run(args).await?;
            Ok(status.exit_code())
        }
        Commands::Render(args) => {
            println!("{}", render::run(args)?);
            Ok(0)
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
