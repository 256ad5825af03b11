//! Validation error types
//!
//! Raised while loading configuration, never at step time.

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid steps for {component}: 0 (must be >= 1)")]
    ZeroSteps { component: String },

    #[error("Invalid accumulative_counts for {component}: 0 (must be >= 1)")]
    ZeroAccumulation { component: String },

    #[error("Invalid iters_per_scale: 0 (must be >= 1)")]
    ZeroItersPerScale,

    #[error("Invalid num_scales: 0 (must be >= 1)")]
    ZeroScales,

    #[error("Invalid tolerance for metric '{metric}': {value} (must be finite and >= 0.0)")]
    InvalidTolerance { metric: String, value: f64 },

    #[error("Metric '{metric}' has no result keys")]
    EmptyMetricKeys { metric: String },

    #[error("Metric '{0}' is defined more than once")]
    DuplicateMetric(String),

    #[error("Invalid model filter '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid master port range: {start} + {count} models exceeds 65535")]
    PortRangeExhausted { start: u16, count: usize },
}

impl ValidationError {
    /// Attach the component name to a policy error
    pub fn for_component(self, component: &str) -> Self {
        match self {
            Self::ZeroSteps { .. } => Self::ZeroSteps { component: component.into() },
            Self::ZeroAccumulation { .. } => {
                Self::ZeroAccumulation { component: component.into() }
            }
            other => other,
        }
    }
}
