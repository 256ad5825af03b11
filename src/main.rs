//! ganbench CLI
//!
//! Benchmark job generation, regression summaries and schedule previews.
//!
//! # Usage
//!
//! ```bash
//! # Generate training jobs for every model and submit them
//! ganbench train my-partition --train-all --run
//!
//! # Test selected models against stored checkpoints
//! ganbench test my-partition s3://bucket/checkpoints --models 'dcgan.*'
//!
//! # Summarize test results and save Markdown
//! ganbench test my-partition s3://bucket/checkpoints --summary --save
//!
//! # Preview a discriminator/generator update schedule
//! ganbench schedule schedule.yaml --iters 16
//! ```

use clap::Parser;
use ganbench::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
