//! # strproc - Stage Pipeline Text Filter
//!
//! The main binary for the strproc stream-transform engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/strproc (THE BINARY)          │
//! │                                               │
//! │  stdin/file ──► CLI (clap) ──► stdout         │
//! │                    │                          │
//! │                    ▼                          │
//! │            ┌───────────────┐                  │
//! │            │ strproc-core  │                  │
//! │            │ (THE LOGIC)   │                  │
//! │            └───────────────┘                  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Clean up a log file
//! strproc run -s strip-control -s expand-tabs:8 -i app.log
//!
//! # Run a pipeline described in TOML
//! cat input.txt | strproc run -c pipeline.toml
//!
//! # Inspect a pipeline
//! strproc check -c pipeline.toml
//! ```

use clap::Parser;
use strproc::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the subscriber. STRPROC_LOG_FORMAT=json enables machine-parseable
/// output; logs always go to stderr.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("STRPROC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "strproc=debug,strproc_core=debug"
    } else {
        "strproc=info,strproc_core=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
