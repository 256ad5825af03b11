//! Adversarial training scheduler
//!
//! Per-iteration decision logic for GAN training:
//! - Step-gating policies for the discriminator and generator
//! - Gradient accumulation through an optimizer wrapper
//! - Log-record merging across branches
//! - Multi-scale stage selection for single-image models
//!
//! Tensor math stays outside this module. Models plug in through
//! [`AdversarialModel`] and optimizers through [`ParamUpdater`].
//!
//! # Example
//!
//! ```
//! use ganbench::schedule::{AdversarialScheduler, IterationClock, StepPolicy};
//!
//! let scheduler = AdversarialScheduler::new(
//!     StepPolicy::default(),
//!     StepPolicy::every(5).unwrap(),
//! );
//! let mut clock = IterationClock::new();
//! let mut generator_updates = 0;
//! for _ in 0..20 {
//!     if scheduler.decide(clock.current()).generator {
//!         generator_updates += 1;
//!     }
//!     clock.advance();
//! }
//! assert_eq!(generator_updates, 4);
//! ```

mod clock;
mod log_record;
mod optim;
mod policy;
mod stage;
mod step;

pub use clock::IterationClock;
pub use log_record::LogRecord;
pub use optim::{OptimWrapper, ParamUpdater, UpdateParams};
pub use policy::StepPolicy;
pub use stage::StageSchedule;
pub use step::{AdversarialModel, AdversarialScheduler, StepDecision};
