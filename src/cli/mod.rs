//! CLI module for blockvalue
//!
//! Provides command-line interface for:
//! - validate: Check a stored value
//! - project: Publish projection for a set of cultures
//! - reconcile: Apply an owner variation change
//! - artifact: Deploy artifact export and import

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    artifact, decode_valid, export_artifact, import_artifact, project_cmd, project_value, reconcile,
    reconcile_value, run, run_command, validate, validate_value, Config, ElementTypeConfig, OwnerConfig,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
