//! Benchmark orchestration and regression reporting
//!
//! - [`catalog`]: model-index loading and name filtering
//! - [`job`] / [`plan`]: cluster job scripts and launch commands
//! - [`storage`]: checkpoint existence probes (local or object storage)
//! - [`metrics`] / [`summary`]: expected-vs-observed comparison
//! - [`report`] / [`color`]: table, Markdown and JSON output

pub mod catalog;
pub mod color;
pub mod job;
pub mod metrics;
pub mod plan;
pub mod report;
pub mod storage;
pub mod summary;

pub use catalog::{FilterOutcome, ModelCatalog, ModelCatalogEntry, ResultBlock};
pub use color::{ColorMode, SummaryPalette};
pub use job::{
    infer_gpu_count, normalize_config_path, BenchMode, Generated, JobDescriptor, JobGenerator,
    RunOptions,
};
pub use metrics::{MetricExpectation, MetricMap, Rule};
pub use plan::{BenchPlan, PortAllocator};
pub use report::SummaryReport;
pub use storage::{CheckpointStorage, LocalStorage, ObjectStorage, Presence};
pub use summary::{summarize, verdict, MetricComparison, ResultFile, SummaryEntry, Verdict};
