//! Configuration: CLI arguments, YAML schedule specs and validation

pub mod cli;
mod schema;
mod validate;

pub use cli::{
    parse_args, BenchCommonArgs, Cli, Command, MailType, OutputFormat, QuotaType, ScheduleArgs,
    TestBenchArgs, TrainBenchArgs,
};
pub use schema::{load_schedule_spec, PolicySpec, ScheduleSpec, StageSpec};
pub use validate::ValidationError;
