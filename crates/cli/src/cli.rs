use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{init_command, replay_command, resolve_command, ReplayOptions};

#[derive(Parser, Debug)]
#[command(name = "vitest-explorer")]
#[command(version, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a selection request into runner files and name pattern
    #[command(visible_alias = "r")]
    Resolve {
        /// Path to a JSON selection request
        selection: PathBuf,

        /// Print the resolved selection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a recorded event transcript through the orchestrator
    Replay {
        /// Path to a JSON-lines event transcript
        events: PathBuf,

        /// Selection request to run (defaults to every test)
        #[arg(short, long)]
        selection: Option<PathBuf>,

        /// Workspace root the transcript's files live under
        #[arg(long)]
        root: Option<PathBuf>,

        /// Enable coverage, reading reports from this directory
        #[arg(long)]
        coverage_dir: Option<PathBuf>,
    },
    /// Write a default vitest-explorer configuration
    Init {
        /// Specify the current working directory
        #[arg(short, long)]
        cwd: Option<String>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub async fn execute(self) -> Result<()> {
        match self {
            Commands::Resolve { selection, json } => resolve_command(&selection, json),
            Commands::Replay {
                events,
                selection,
                root,
                coverage_dir,
            } => {
                replay_command(ReplayOptions {
                    events,
                    selection,
                    root,
                    coverage_dir,
                })
                .await
            }
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}
