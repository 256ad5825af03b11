//! YAML schema for schedule configuration files
//!
//! ```yaml
//! discriminator:
//!   steps: 1
//! generator:
//!   steps: 2
//!   init_steps: 2
//!   accumulative_counts: 1
//! stages:
//!   iters_per_scale: 2000
//!   num_scales: 8
//! ```

use super::validate::ValidationError;
use crate::error::{Error, Result};
use crate::schedule::{AdversarialScheduler, StageSchedule, StepPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Raw cadence settings for one component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySpec {
    #[serde(default = "default_one")]
    pub steps: u32,

    #[serde(default)]
    pub init_steps: u64,

    #[serde(default = "default_one")]
    pub accumulative_counts: u32,
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self { steps: 1, init_steps: 0, accumulative_counts: 1 }
    }
}

fn default_one() -> u32 {
    1
}

impl PolicySpec {
    fn build(&self, component: &str) -> std::result::Result<StepPolicy, ValidationError> {
        StepPolicy::new(self.steps, self.init_steps, self.accumulative_counts)
            .map_err(|e| e.for_component(component))
    }
}

/// Multi-scale settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub iters_per_scale: u64,
    pub num_scales: u32,
}

/// Complete schedule specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSpec {
    #[serde(default)]
    pub discriminator: PolicySpec,

    #[serde(default)]
    pub generator: PolicySpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<StageSpec>,
}

impl ScheduleSpec {
    /// Validate and build the scheduler described by this spec
    pub fn build(&self) -> std::result::Result<AdversarialScheduler, ValidationError> {
        Ok(AdversarialScheduler::new(
            self.discriminator.build("discriminator")?,
            self.generator.build("generator")?,
        ))
    }

    /// Validate and build the optional stage schedule
    pub fn stage_schedule(&self) -> std::result::Result<Option<StageSchedule>, ValidationError> {
        self.stages.map(|s| StageSchedule::new(s.iters_per_scale, s.num_scales)).transpose()
    }
}

/// Load and validate a schedule spec from a YAML file
pub fn load_schedule_spec<P: AsRef<Path>>(path: P) -> Result<ScheduleSpec> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("reading schedule config {}", path.display()), e))?;
    let spec: ScheduleSpec = serde_yaml::from_str(&yaml).map_err(|e| Error::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    spec.build()?;
    spec.stage_schedule()?;
    Ok(spec)
}
