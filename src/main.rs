// ABOUTME: Entry point for the ferry CLI application.
// ABOUTME: Parses arguments, loads configuration and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use ferry::config::Options;
use ferry::error::{Error, Result};
use ferry::output::Output;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = cli.output_mode();
    let result = run(cli).await;

    if let Err(e) = result {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(cli.output_mode());
    let file = load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Build { target } => {
            commands::build(file.merge(target.into_options()), output).await
        }
        Commands::Deploy { target } => {
            commands::deploy(file.merge(target.into_options()), output).await
        }
        Commands::Rollback {
            target,
            target_commit,
        } => commands::rollback(file.merge(target.into_options()), target_commit, output).await,
        Commands::List { target, max_items } => {
            commands::list(file.merge(target.into_options()), max_items, output).await
        }
    }
}

/// Read the explicit config file, or discover one in the current directory.
fn load_options(explicit: Option<&Path>) -> Result<Options> {
    match explicit {
        Some(path) if !path.exists() => Err(Error::ConfigNotFound(path.to_path_buf())),
        Some(path) => Options::load(path),
        None => {
            let cwd = env::current_dir()?;
            Ok(Options::discover(&cwd)?.unwrap_or_default())
        }
    }
}
