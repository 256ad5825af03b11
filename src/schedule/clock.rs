//! Training iteration counter

/// Monotonic iteration counter owned by the training loop
///
/// The loop is the only writer. Gating code receives `current()` as a plain
/// argument, so every process that shares the same counter value takes the
/// same update decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationClock {
    iter: u64,
}

impl IterationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the counter from a checkpoint
    pub fn resume_at(iter: u64) -> Self {
        Self { iter }
    }

    /// Current 0-based iteration
    pub fn current(&self) -> u64 {
        self.iter
    }

    /// Move to the next iteration and return the new value
    pub fn advance(&mut self) -> u64 {
        self.iter += 1;
        self.iter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_monotonically() {
        let mut clock = IterationClock::new();
        assert_eq!(clock.current(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.current(), 2);
    }

    #[test]
    fn test_resume() {
        let clock = IterationClock::resume_at(1_000);
        assert_eq!(clock.current(), 1_000);
    }
}
