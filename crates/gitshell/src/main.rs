//! gitshell - a thin front end over the git command line.

mod commands;
mod context;
mod errors;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use gitshell_core::config::FileConfig;
use gitshell_git::GitError;
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::context::Context;
use crate::errors::NegativeResult;

/// Process exit codes.
mod exit_codes {
    pub const OK: i32 = 0;
    pub const ERROR: i32 = 1;
    pub const NEGATIVE: i32 = 2;
    pub const NOT_A_REPOSITORY: i32 = 3;
}

/// Run git operations against a repository directory.
#[derive(Debug, Parser)]
#[command(name = "gitshell", version, about)]
struct Cli {
    /// Repository directory.
    #[arg(short = 'C', global = true, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GITSHELL_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => exit_codes::OK,
        Err(e) => exit_code_for(&e),
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = FileConfig::load()?;
    let mut ctx = Context::new(Box::new(config), cli.dir, cli.json);

    let mut stdout = std::io::stdout().lock();
    cli.command.run(&mut ctx, &mut stdout).await?;
    stdout.flush()?;
    Ok(())
}

/// Report `e` and pick the exit code for it.
fn exit_code_for(e: &anyhow::Error) -> i32 {
    if let Some(negative) = e.downcast_ref::<NegativeResult>() {
        eprintln!("{negative}");
        return exit_codes::NEGATIVE;
    }

    tracing::error!("{e:#}");
    match e.downcast_ref::<GitError>() {
        Some(git) if git.is_not_a_repository() => exit_codes::NOT_A_REPOSITORY,
        _ => exit_codes::ERROR,
    }
}
