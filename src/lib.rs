//! # ganbench
//!
//! Adversarial training-step scheduling and GAN benchmark regression tooling.
//!
//! ## Architecture
//!
//! - `schedule`: per-iteration discriminator/generator gating, gradient
//!   accumulation and log-record merging
//! - `bench`: model catalog, cluster job scripts, checkpoint probes and
//!   regression summaries
//! - `config`: CLI arguments and YAML schedule files
//! - `cli`: command handlers behind the `ganbench` binary

pub mod bench;
pub mod cli;
pub mod config;
pub mod error;
pub mod schedule;

pub use error::{Error, Result};
