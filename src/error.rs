//! Error taxonomy for the braking controller
//!
//! Channel backpressure, startup allocation failures, and unrecognized
//! sensor tags. Only allocation and configuration errors are fatal; the
//! rest are recovered locally by the task that observes them.
//!
//! Author: Moroya Sakamoto

/// Result type for controller operations
pub type Result<T> = core::result::Result<T, BrakeError>;

/// Controller-level errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BrakeError {
    /// A monitor could not enqueue because the sensor channel is full
    #[error("sensor channel full, dropped state tag {tag}")]
    ChannelFull { tag: u8 },

    /// Shared logger or sensor channel could not be created at startup
    #[error("could not allocate {resource}: {reason}")]
    ResourceAllocation {
        resource: &'static str,
        reason: &'static str,
    },

    /// A sensor tag outside the known state space
    #[error("unrecognized sensor state tag {tag}")]
    UnrecognizedState { tag: u8 },

    /// Task parameters rejected before registration
    #[error("invalid configuration for task '{task}': {reason}")]
    InvalidTaskConfig {
        task: &'static str,
        reason: &'static str,
    },

    /// Static task table has no free slot
    #[error("task table full")]
    TaskTableFull,
}

impl BrakeError {
    /// Errors that must stop the controller before scheduling begins
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BrakeError::ResourceAllocation { .. }
                | BrakeError::InvalidTaskConfig { .. }
                | BrakeError::TaskTableFull
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!BrakeError::ChannelFull { tag: 0 }.is_fatal());
        assert!(!BrakeError::UnrecognizedState { tag: 9 }.is_fatal());
        assert!(BrakeError::TaskTableFull.is_fatal());
        assert!(BrakeError::ResourceAllocation {
            resource: "sensor channel",
            reason: "zero capacity",
        }
        .is_fatal());
    }

    #[test]
    fn test_display() {
        let err = BrakeError::ChannelFull { tag: 3 };
        assert_eq!(err.to_string(), "sensor channel full, dropped state tag 3");
        let err = BrakeError::InvalidTaskConfig {
            task: "Brake Task",
            reason: "period must be non-zero",
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration for task 'Brake Task': period must be non-zero"
        );
    }
}
