//! CLI command definitions for the `semnote` binary.
//!
//! Uses clap derive macros for argument parsing. Each subcommand lives in its
//! own module and takes `&AppState` plus the global `--json` flag.

pub mod index;
pub mod model;
pub mod search;
pub mod status;
pub mod table;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Semantic search over your notes.
#[derive(Parser)]
#[command(name = "semnote", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "SEMNOTE_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed a piece of text and add it to the index.
    Index {
        /// Text to index.
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text to index from a file.
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Recreate the table without asking if the active model no longer fits it.
        #[arg(long, short)]
        yes: bool,
    },

    /// Find indexed notes similar to a query.
    Search {
        /// Query text.
        query: String,

        /// Maximum number of results (defaults to `store.search_limit`).
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show the active model, the table and whether they fit together.
    Status,

    /// Drop every indexed note and recreate the table for the active model.
    Recreate {
        /// Skip confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Inspect and switch embedding models.
    Model {
        #[command(subcommand)]
        action: model::ModelCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Tracing filter for the global verbosity flags.
pub fn verbosity_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,semnote=debug",
        _ => "trace",
    }
}
