//! Interactive and scripted shell that renders the ledger and its analytics.

pub mod core;
pub mod format;
pub mod output;
mod shell;

pub use self::core::{CliError, CliMode, ShellContext};
pub use shell::run_cli;
