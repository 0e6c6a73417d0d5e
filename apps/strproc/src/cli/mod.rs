//! # strproc CLI Module
//!
//! This module implements the CLI interface for strproc.
//!
//! ## Available Commands
//!
//! - `run` - Filter input lines through a pipeline
//! - `check` - Validate a pipeline and list its stages
//! - `kinds` - List available stage kinds

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strproc_core::PipelineError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// strproc - text filter built on a stage pipeline
///
/// Every input line enters the head of the pipeline; whatever reaches the
/// tail is written to stdout, one item per line.
#[derive(Parser, Debug)]
#[command(name = "strproc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter input through a pipeline
    Run {
        /// Pipeline config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stage in compact form, e.g. `expand-tabs:8` (repeatable, applied after --config)
        #[arg(short = 's', long = "stage", value_name = "STAGE")]
        stages: Vec<String>,

        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Feed raw chunks through a leading split-lines stage instead of
        /// pre-splitting lines
        #[arg(long)]
        split: bool,
    },

    /// Validate a pipeline and list its stages
    Check {
        /// Pipeline config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stage in compact form (repeatable, applied after --config)
        #[arg(short = 's', long = "stage", value_name = "STAGE")]
        stages: Vec<String>,
    },

    /// List available stage kinds
    Kinds,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), PipelineError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Run {
            config,
            stages,
            input,
            split,
        } => cmd_run(config.as_deref(), &stages, input.as_deref(), split, json_mode),
        Commands::Check { config, stages } => cmd_check(config.as_deref(), &stages, json_mode),
        Commands::Kinds => cmd_kinds(json_mode),
    }
}
