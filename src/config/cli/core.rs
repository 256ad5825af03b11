//! Core CLI types - Cli, Command, and the schedule preview arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::bench::{TestBenchArgs, TrainBenchArgs};

/// ganbench: GAN training schedules and benchmark regression
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ganbench")]
#[command(version)]
#[command(about = "Adversarial training-step scheduling and GAN benchmark regression tooling")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Generate (and optionally submit) training benchmark jobs, or summarize them
    Train(TrainBenchArgs),

    /// Generate (and optionally submit) test benchmark jobs, or summarize them
    Test(TestBenchArgs),

    /// Preview which networks update at each iteration for a schedule config
    Schedule(ScheduleArgs),
}

/// Arguments for the schedule command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ScheduleArgs {
    /// Path to YAML schedule configuration
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// First iteration to show
    #[arg(long, default_value = "0")]
    pub start: u64,

    /// Number of iterations to show
    #[arg(long, default_value = "20")]
    pub iters: u64,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
