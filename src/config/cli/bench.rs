//! Benchmark command arguments shared by the train and test pipelines

use clap::Parser;
use std::path::PathBuf;

use super::types::{MailType, OutputFormat, QuotaType};

/// Options common to `train` and `test`
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct BenchCommonArgs {
    /// Cluster partition to use
    #[arg(value_name = "PARTITION")]
    pub partition: String,

    /// Job name prefix (defaults to gen-train-benchmark / gen-test-benchmark)
    #[arg(long)]
    pub job_name: Option<String>,

    /// First distributed master port; incremented per model
    #[arg(long, default_value = "29666")]
    pub port: u16,

    /// Read configs from the alternate `configs_ceph` tree
    #[arg(long)]
    pub use_ceph_config: bool,

    /// Regex patterns selecting models by name (matched at the start)
    #[arg(long, num_args = 1..)]
    pub models: Vec<String>,

    /// Directory for job scripts, logs and result files
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Execute the generated commands instead of only previewing them
    #[arg(long)]
    pub run: bool,

    /// Run locally instead of submitting to the cluster
    #[arg(long)]
    pub local: bool,

    /// Mail address notified about job status
    #[arg(long)]
    pub mail: Option<String>,

    /// Job events that trigger a mail
    #[arg(long, num_args = 1.., default_value = "BEGIN")]
    pub mail_type: Vec<MailType>,

    /// Quota type (reserved, auto, spot)
    #[arg(long)]
    pub quotatype: Option<QuotaType>,

    /// Summarize benchmark results instead of generating jobs
    #[arg(long)]
    pub summary: bool,

    /// Save the summary as Markdown in the work dir
    #[arg(long)]
    pub save: bool,

    /// Model index describing the benchmark catalog
    #[arg(long, default_value = "model-index.yml")]
    pub model_index: PathBuf,

    /// YAML file overriding the built-in metric map
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Summary output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the train benchmark command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainBenchArgs {
    #[command(flatten)]
    pub common: BenchCommonArgs,

    /// Train every model in the catalog
    #[arg(long)]
    pub train_all: bool,
}

/// Arguments for the test benchmark command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TestBenchArgs {
    #[command(flatten)]
    pub common: BenchCommonArgs,

    /// Checkpoint root (local directory or s3:// URI)
    #[arg(value_name = "CHECKPOINT_ROOT")]
    pub checkpoint_root: String,
}
