//! Parameter-update capability with gradient accumulation

use crate::config::ValidationError;

/// Concrete optimizer plumbing supplied by the tensor runtime
pub trait ParamUpdater {
    /// Back-propagate a (possibly scaled) loss into the parameter gradients
    fn backward(&mut self, loss: f64);

    /// Apply accumulated gradients to the parameters
    fn step(&mut self);

    /// Clear accumulated gradients
    fn zero_grad(&mut self);
}

/// What a model branch calls to turn a loss into a parameter update
pub trait UpdateParams {
    fn update_params(&mut self, loss: f64);

    /// Micro-batches folded into one optimizer step
    fn accumulative_counts(&self) -> u32;

    /// Apply gradients still held by an unfinished accumulation window
    fn flush(&mut self) {}
}

/// Wraps a [`ParamUpdater`] and accumulates gradients across micro-batches
///
/// Each call scales the loss by `1 / accumulative_counts` and back-propagates
/// it; `step` and `zero_grad` run once `accumulative_counts` calls are pending,
/// or earlier on [`UpdateParams::flush`].
///
/// The scheduler's gate period already spans a policy's accumulation window,
/// so a wrapper driven by [`AdversarialScheduler`](super::AdversarialScheduler)
/// should only accumulate micro-batches fed within a single branch call.
#[derive(Debug)]
pub struct OptimWrapper<U: ParamUpdater> {
    inner: U,
    accumulative_counts: u32,
    inner_count: u64,
    pending: u32,
}

impl<U: ParamUpdater> OptimWrapper<U> {
    pub fn new(inner: U) -> Self {
        Self { inner, accumulative_counts: 1, inner_count: 0, pending: 0 }
    }

    /// Fold `accumulative_counts` calls into one optimizer step
    pub fn with_accumulative_counts(
        inner: U,
        accumulative_counts: u32,
    ) -> Result<Self, ValidationError> {
        if accumulative_counts == 0 {
            return Err(ValidationError::ZeroAccumulation { component: "optimizer".into() });
        }
        Ok(Self { inner, accumulative_counts, inner_count: 0, pending: 0 })
    }

    /// Calls to `update_params` since construction
    pub fn inner_count(&self) -> u64 {
        self.inner_count
    }

    /// Back-propagated micro-batches not yet applied
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Whether the next call will apply an optimizer step
    pub fn at_boundary(&self) -> bool {
        self.pending + 1 >= self.accumulative_counts
    }

    pub fn inner(&self) -> &U {
        &self.inner
    }

    pub fn into_inner(self) -> U {
        self.inner
    }

    fn apply(&mut self) {
        self.inner.step();
        self.inner.zero_grad();
        self.pending = 0;
    }
}

impl<U: ParamUpdater> UpdateParams for OptimWrapper<U> {
    fn update_params(&mut self, loss: f64) {
        self.inner.backward(loss / f64::from(self.accumulative_counts));
        self.inner_count += 1;
        self.pending += 1;
        if self.pending >= self.accumulative_counts {
            self.apply();
        }
    }

    fn accumulative_counts(&self) -> u32 {
        self.accumulative_counts
    }

    fn flush(&mut self) {
        if self.pending > 0 {
            self.apply();
        }
    }
}
