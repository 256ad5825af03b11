//! CLI command implementations

mod bench;
mod schedule;
mod train;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Test(args) => test::run_test(args, log_level),
        Command::Schedule(args) => schedule::run_schedule(args, log_level),
    }
}
