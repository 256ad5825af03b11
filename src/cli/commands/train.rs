//! Train command implementation

use super::bench::{run_benchmark, run_options};
use crate::bench::BenchMode;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::TrainBenchArgs;

pub fn run_train(args: TrainBenchArgs, level: LogLevel) -> Result<(), String> {
    let common = &args.common;
    if !common.summary && !args.train_all && common.models.is_empty() {
        log(
            level,
            LogLevel::Normal,
            "No models selected. Pass --train-all to benchmark every model, or --models <pattern>...",
        );
        return Ok(());
    }

    log(
        level,
        LogLevel::Verbose,
        &format!("Train benchmark on partition {}", common.partition),
    );
    let options = run_options(common, BenchMode::Train, None);
    run_benchmark(common, options, level)
}
