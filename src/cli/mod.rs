//! CLI module for ganbench
//!
//! Command handlers and console output helpers.

mod commands;
mod logging;

pub use commands::run_command;
pub use logging::LogLevel;

pub use crate::config::Cli;
