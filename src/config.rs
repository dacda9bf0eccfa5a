//! Task parameters and system configuration
//!
//! Defaults reproduce the reference controller: monitors every 2.5 s,
//! consolidator pause 0.5 s, braking every 6 s, 1 ms scheduler tick.
//!
//! Author: Moroya Sakamoto

use crate::channel::{DEFAULT_CHANNEL_CAPACITY, MAX_CHANNEL_SLOTS};
use crate::error::{BrakeError, Result};
use crate::task::TaskPriority;

/// Per-task knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskConfig {
    /// Task name (cosmetic)
    pub name: &'static str,
    /// Stack allocation in words (cosmetic)
    pub stack_size: u16,
    /// Priority (higher preempts lower)
    pub priority: TaskPriority,
    /// Period in microseconds; for the consolidator, its pause after each condition
    pub period_us: u32,
}

impl TaskConfig {
    pub fn validate(&self) -> Result<()> {
        if self.period_us == 0 {
            return Err(BrakeError::InvalidTaskConfig {
                task: self.name,
                reason: "period must be non-zero",
            });
        }
        if self.stack_size == 0 {
            return Err(BrakeError::InvalidTaskConfig {
                task: self.name,
                reason: "stack size must be non-zero",
            });
        }
        Ok(())
    }
}

/// Whole-controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemConfig {
    /// Scheduler tick in microseconds
    pub tick_us: u32,
    /// Sensor channel slots
    pub channel_capacity: usize,
    pub temperature: TaskConfig,
    pub pressure: TaskConfig,
    pub consolidator: TaskConfig,
    pub brake: TaskConfig,
    /// Iterations of synthetic work per braking cycle
    pub brake_work_iterations: u64,
    /// Iterations the CPU completes per tick
    pub work_per_tick: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            tick_us: 1_000,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            temperature: TaskConfig {
                name: "Temperature Task",
                stack_size: 1000,
                priority: TaskPriority::MONITOR,
                period_us: 2_500_000,
            },
            pressure: TaskConfig {
                name: "Pressure Task",
                stack_size: 1000,
                priority: TaskPriority::MONITOR,
                period_us: 2_500_000,
            },
            consolidator: TaskConfig {
                name: "Base Task",
                stack_size: 1000,
                priority: TaskPriority::CONSOLIDATOR,
                period_us: 500_000,
            },
            brake: TaskConfig {
                name: "Brake Task",
                stack_size: 1000,
                priority: TaskPriority::BRAKE,
                period_us: 6_000_000,
            },
            brake_work_iterations: 500_000_000,
            work_per_tick: 1_000_000,
        }
    }
}

impl SystemConfig {
    /// Reject configurations the kernel cannot run
    pub fn validate(&self) -> Result<()> {
        if self.tick_us == 0 {
            return Err(BrakeError::InvalidTaskConfig {
                task: "kernel",
                reason: "tick must be non-zero",
            });
        }
        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_SLOTS {
            return Err(BrakeError::ResourceAllocation {
                resource: "sensor channel",
                reason: "capacity out of range",
            });
        }
        if self.work_per_tick == 0 {
            return Err(BrakeError::InvalidTaskConfig {
                task: self.brake.name,
                reason: "work per tick must be non-zero",
            });
        }
        for task in [&self.temperature, &self.pressure, &self.consolidator, &self.brake] {
            task.validate()?;
        }
        Ok(())
    }

    /// Ticks one braking cycle occupies the CPU
    pub fn brake_busy_ticks(&self) -> u64 {
        if self.work_per_tick == 0 {
            return 0;
        }
        self.brake_work_iterations.div_ceil(self.work_per_tick).max(1)
    }

    /// Estimated braking WCET in microseconds
    pub fn brake_wcet_us(&self) -> u32 {
        let us = self.brake_busy_ticks().saturating_mul(self.tick_us as u64);
        us.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_timing() {
        let config = SystemConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.channel_capacity, 2);
        assert_eq!(config.temperature.period_us, 2_500_000);
        assert_eq!(config.pressure.period_us, 2_500_000);
        assert_eq!(config.consolidator.period_us, 500_000);
        assert_eq!(config.brake.period_us, 6_000_000);
        assert!(config.brake.priority > config.temperature.priority);
        assert_eq!(config.temperature.priority, config.pressure.priority);
        assert!(config.pressure.priority > config.consolidator.priority);
    }

    #[test]
    fn test_brake_busy_ticks() {
        let mut config = SystemConfig::default();
        assert_eq!(config.brake_busy_ticks(), 500);
        assert_eq!(config.brake_wcet_us(), 500_000);

        config.brake_work_iterations = 1_500_001;
        assert_eq!(config.brake_busy_ticks(), 2);

        config.brake_work_iterations = 0;
        assert_eq!(config.brake_busy_ticks(), 1);
    }

    #[test]
    fn test_rejects_zero_period() {
        let mut config = SystemConfig::default();
        config.pressure.period_us = 0;
        assert_eq!(
            config.validate(),
            Err(BrakeError::InvalidTaskConfig {
                task: "Pressure Task",
                reason: "period must be non-zero",
            })
        );
    }

    #[test]
    fn test_rejects_bad_capacity() {
        let mut config = SystemConfig::default();
        config.channel_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(BrakeError::ResourceAllocation { .. })
        ));
        config.channel_capacity = MAX_CHANNEL_SLOTS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_tick_and_stack() {
        let mut config = SystemConfig::default();
        config.tick_us = 0;
        assert!(config.validate().is_err());

        let mut config = SystemConfig::default();
        config.brake.stack_size = 0;
        assert!(config.validate().unwrap_err().is_fatal());
    }
}
