// ABOUTME: Entry point for the shipline CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use shipline::config::{self, Config};
use shipline::error::Result;
use shipline::output::Output;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    // Logs go to stderr so rendered files on stdout stay clean.
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
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init { project, force } => {
            config::init_config(&cwd, project.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Run { force_lock } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::run(config, force_lock, output).await
        }
        Commands::Plan => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::plan(&config, &output)
        }
        Commands::Render { target } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::render(&config, target)
        }
        Commands::Status => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::status(&config, &output).await
        }
    }
}

fn load_config(path: Option<&Path>, cwd: &Path) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(cwd),
    }
}
