//! Composite adversarial training step
//!
//! The discriminator branch runs whenever its policy gate is open. The
//! generator branch is only considered after the discriminator branch ran in
//! the same call, and runs with the discriminator frozen.

use super::log_record::LogRecord;
use super::optim::UpdateParams;
use super::policy::StepPolicy;
use serde::Serialize;
use std::ops::Range;

/// A GAN whose sub-networks can be trained one branch at a time
///
/// Implementations compute the branch loss, hand it to `optim`, and return
/// the log variables of that branch.
pub trait AdversarialModel {
    type Batch;

    fn train_discriminator(&mut self, batch: &Self::Batch, optim: &mut dyn UpdateParams)
        -> LogRecord;

    fn train_generator(&mut self, batch: &Self::Batch, optim: &mut dyn UpdateParams)
        -> LogRecord;

    /// Toggle gradient flow into discriminator parameters
    fn set_discriminator_trainable(&mut self, trainable: bool);
}

/// Which branches update at a given iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StepDecision {
    pub discriminator: bool,
    pub generator: bool,
}

/// Stateless gating for the discriminator/generator pair
///
/// Both gates are recomputed from the iteration number on every call, so a
/// run resumes correctly from a checkpoint that stores only the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdversarialScheduler {
    discriminator: StepPolicy,
    generator: StepPolicy,
}

impl AdversarialScheduler {
    pub fn new(discriminator: StepPolicy, generator: StepPolicy) -> Self {
        Self { discriminator, generator }
    }

    pub fn discriminator_policy(&self) -> &StepPolicy {
        &self.discriminator
    }

    pub fn generator_policy(&self) -> &StepPolicy {
        &self.generator
    }

    /// Gate decision for 0-based iteration `iter`
    pub fn decide(&self, iter: u64) -> StepDecision {
        let discriminator = self.discriminator.is_armed(iter);
        let generator = discriminator && self.generator.is_armed(iter);
        StepDecision { discriminator, generator }
    }

    /// Decisions for every iteration in `iters`, computed lazily
    pub fn timeline(&self, iters: Range<u64>) -> impl Iterator<Item = (u64, StepDecision)> + '_ {
        iters.map(move |i| (i, self.decide(i)))
    }

    /// Run one training iteration against `model`
    ///
    /// `iter` must be read from the shared clock right before the call. The
    /// returned record holds only the keys of branches that ran.
    ///
    /// Each branch that runs ends with [`UpdateParams::flush`], so its
    /// optimizer steps on the gated iteration itself.
    pub fn train_step<M: AdversarialModel>(
        &self,
        model: &mut M,
        iter: u64,
        batch: &M::Batch,
        disc_optim: &mut dyn UpdateParams,
        gen_optim: &mut dyn UpdateParams,
    ) -> LogRecord {
        let mut log_vars = LogRecord::new();

        if !self.discriminator.is_armed(iter) {
            return log_vars;
        }
        model.set_discriminator_trainable(true);
        log_vars.merge(model.train_discriminator(batch, disc_optim));
        disc_optim.flush();

        if self.generator.is_armed(iter) {
            model.set_discriminator_trainable(false);
            let gen_vars = model.train_generator(batch, gen_optim);
            gen_optim.flush();
            model.set_discriminator_trainable(true);
            log_vars.merge(gen_vars);
        }

        log_vars
    }
}
