//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! ganbench train my-partition --train-all --work-dir work_dirs/benchmark_train
//! ganbench train my-partition --models 'dcgan.*' --run
//! ganbench test my-partition /mnt/checkpoints --summary --save
//! ganbench schedule schedule.yaml --iters 12
//! ```

mod bench;
mod core;
mod types;

pub use bench::{BenchCommonArgs, TestBenchArgs, TrainBenchArgs};
pub use core::{parse_args, Cli, Command, ScheduleArgs};
pub use types::{MailType, OutputFormat, QuotaType};
