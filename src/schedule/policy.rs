//! Per-component step-gating policy

use crate::config::ValidationError;

/// Update cadence for one trainable component (generator or discriminator)
///
/// A component updates at iteration `i` iff `i >= init_steps` and
/// `(i + 1) % (steps * accumulative_counts) == 0`. Gradient accumulation is
/// folded into the period, so a policy with `accumulative_counts = 4` opens
/// its gate on every fourth boundary only.
///
/// Built from YAML through [`PolicySpec`](crate::config::PolicySpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    steps: u32,
    init_steps: u64,
    accumulative_counts: u32,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self { steps: 1, init_steps: 0, accumulative_counts: 1 }
    }
}

impl StepPolicy {
    /// Build a policy, rejecting zero steps or zero accumulation counts
    pub fn new(
        steps: u32,
        init_steps: u64,
        accumulative_counts: u32,
    ) -> Result<Self, ValidationError> {
        if steps == 0 {
            return Err(ValidationError::ZeroSteps { component: "policy".into() });
        }
        if accumulative_counts == 0 {
            return Err(ValidationError::ZeroAccumulation { component: "policy".into() });
        }
        Ok(Self { steps, init_steps, accumulative_counts })
    }

    /// Policy that fires every `steps` iterations with no warmup or accumulation
    pub fn every(steps: u32) -> Result<Self, ValidationError> {
        Self::new(steps, 0, 1)
    }

    pub fn with_init_steps(mut self, init_steps: u64) -> Self {
        self.init_steps = init_steps;
        self
    }

    pub fn with_accumulative_counts(
        mut self,
        accumulative_counts: u32,
    ) -> Result<Self, ValidationError> {
        if accumulative_counts == 0 {
            return Err(ValidationError::ZeroAccumulation { component: "policy".into() });
        }
        self.accumulative_counts = accumulative_counts;
        Ok(self)
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn init_steps(&self) -> u64 {
        self.init_steps
    }

    pub fn accumulative_counts(&self) -> u32 {
        self.accumulative_counts
    }

    /// Number of iterations between two open gates
    pub fn period(&self) -> u64 {
        u64::from(self.steps) * u64::from(self.accumulative_counts)
    }

    /// Whether the component may update at 0-based iteration `iter`
    pub fn is_armed(&self, iter: u64) -> bool {
        // (iter + 1) % period == 0, without overflowing at u64::MAX
        let period = self.period();
        iter >= self.init_steps && iter % period == period - 1
    }

    /// First iteration `>= from` at which the gate opens, if it fits in `u64`
    pub fn next_armed(&self, from: u64) -> Option<u64> {
        let period = self.period();
        let start = from.max(self.init_steps);
        start.checked_add(period - 1 - start % period)
    }
}
