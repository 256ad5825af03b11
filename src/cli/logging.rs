//! Logging utilities for CLI output

/// Log level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Whether a message logged at `required` is shown at this level
    pub fn permits(self, required: LogLevel) -> bool {
        self != LogLevel::Quiet && (self == required || required == LogLevel::Normal)
    }
}

/// Log a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level.permits(required) {
        println!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_suppresses_everything() {
        assert!(!LogLevel::Quiet.permits(LogLevel::Normal));
        assert!(!LogLevel::Quiet.permits(LogLevel::Verbose));
    }

    #[test]
    fn test_normal_hides_verbose_detail() {
        assert!(LogLevel::Normal.permits(LogLevel::Normal));
        assert!(!LogLevel::Normal.permits(LogLevel::Verbose));
    }

    #[test]
    fn test_verbose_shows_everything() {
        assert!(LogLevel::Verbose.permits(LogLevel::Normal));
        assert!(LogLevel::Verbose.permits(LogLevel::Verbose));
    }
}
