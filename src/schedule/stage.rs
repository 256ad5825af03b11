//! Multi-scale stage schedule for single-image generators
//!
//! Single-image models train one scale at a time; the active scale is
//! derived from the iteration counter, like the step gates.

use crate::config::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStageSchedule")]
pub struct StageSchedule {
    iters_per_scale: u64,
    num_scales: u32,
}

#[derive(Deserialize)]
struct RawStageSchedule {
    iters_per_scale: u64,
    num_scales: u32,
}

impl TryFrom<RawStageSchedule> for StageSchedule {
    type Error = ValidationError;

    fn try_from(raw: RawStageSchedule) -> Result<Self, Self::Error> {
        Self::new(raw.iters_per_scale, raw.num_scales)
    }
}

impl StageSchedule {
    pub fn new(iters_per_scale: u64, num_scales: u32) -> Result<Self, ValidationError> {
        if iters_per_scale == 0 {
            return Err(ValidationError::ZeroItersPerScale);
        }
        if num_scales == 0 {
            return Err(ValidationError::ZeroScales);
        }
        Ok(Self { iters_per_scale, num_scales })
    }

    pub fn iters_per_scale(&self) -> u64 {
        self.iters_per_scale
    }

    pub fn num_scales(&self) -> u32 {
        self.num_scales
    }

    /// Active scale at `iter`, saturating at the last scale
    pub fn stage_at(&self, iter: u64) -> u32 {
        let stage = iter / self.iters_per_scale;
        stage.min(u64::from(self.num_scales - 1)) as u32
    }

    /// Whether `iter` is the first iteration of a new scale
    pub fn is_stage_start(&self, iter: u64) -> bool {
        iter == 0 || self.stage_at(iter) != self.stage_at(iter - 1)
    }
}
