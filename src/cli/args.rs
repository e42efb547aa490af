//! CLI argument definitions using clap
//!
//! Commands:
//! - blockvalue validate --config <path>
//! - blockvalue project --config <path> --cultures <list>
//! - blockvalue reconcile --config <path> [--varies-by-culture <bool>] [--varies-by-segment <bool>]
//! - blockvalue artifact --config <path> [--import]
//!
//! Every command reads one block value (JSON) from stdin.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// blockvalue - consistency and publish tooling for block-structured property values
#[derive(Parser, Debug)]
#[command(name = "blockvalue")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a stored value
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./blockvalue.json")]
        config: PathBuf,
    },

    /// Project a value for publishing
    Project {
        /// Path to configuration file
        #[arg(long, default_value = "./blockvalue.json")]
        config: PathBuf,

        /// Comma-separated cultures to publish, `*` for the invariant culture
        #[arg(long, default_value = "*")]
        cultures: String,
    },

    /// Reconcile a value after the owning property's variation changed
    ///
    /// The configured owner variation is the state before the change.
    /// Element types in the configuration describe the state after it.
    Reconcile {
        /// Path to configuration file
        #[arg(long, default_value = "./blockvalue.json")]
        config: PathBuf,

        /// Owner varies by culture after the change (default: unchanged)
        #[arg(long, action = ArgAction::Set)]
        varies_by_culture: Option<bool>,

        /// Owner varies by segment after the change (default: unchanged)
        #[arg(long, action = ArgAction::Set)]
        varies_by_segment: Option<bool>,
    },

    /// Convert a value to a deploy artifact, or back with --import
    Artifact {
        /// Path to configuration file
        #[arg(long, default_value = "./blockvalue.json")]
        config: PathBuf,

        /// Read an artifact string and restore the value
        #[arg(long)]
        import: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
