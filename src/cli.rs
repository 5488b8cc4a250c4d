// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use shipline::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shipline")]
#[command(about = "Build, publish and deploy a backend/frontend compose stack")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: discovered in the current directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new shipline.yml configuration file
    Init {
        /// Project name (compose project and lock name)
        #[arg(long)]
        project: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Build, push and deploy both images
    Run {
        /// Break an existing deploy lock
        #[arg(long)]
        force_lock: bool,
    },

    /// Show the steps a run would execute without executing them
    Plan,

    /// Print a rendered deployment file
    Render {
        #[command(subcommand)]
        target: RenderTarget,
    },

    /// Show containers of the deployed project
    Status,
}

#[derive(Subcommand, Clone, Copy)]
pub enum RenderTarget {
    /// The compose file the deploy stage writes
    Compose,

    /// The reverse-proxy rule for the frontend
    Proxy,
}
