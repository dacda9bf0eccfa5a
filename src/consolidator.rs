//! Condition consolidator — the sensor channel's only consumer
//!
//! Takes one state per step, turns it into a condition line, logs it, then
//! pauses. An empty channel parks the task until a monitor sends.
//!
//! Author: Moroya Sakamoto

use core::fmt;

use crate::kernel::TaskContext;
use crate::logger::LogSink;
use crate::sensor::SensorState;
use crate::task::Yield;

/// Condition line for a received tag
///
/// Displays as `Condition: TEMP_STABLE`, `Condition: PRESS_OVER (WARNING)`,
/// or `Condition: UNKNOWN (tag 9)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Stable reading
    Nominal(SensorState),
    /// Over/under reading, logged with a warning suffix
    Abnormal(SensorState),
    /// Tag outside the known states
    Unknown(u8),
}

impl Condition {
    /// Classify a raw channel tag
    pub fn from_tag(tag: u8) -> Self {
        match SensorState::try_from(tag) {
            Ok(state) if state.is_nominal() => Condition::Nominal(state),
            Ok(state) => Condition::Abnormal(state),
            Err(_) => Condition::Unknown(tag),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Nominal(state) => write!(f, "Condition: {}", state),
            Condition::Abnormal(state) => write!(f, "Condition: {} (WARNING)", state),
            Condition::Unknown(tag) => write!(f, "Condition: UNKNOWN (tag {})", tag),
        }
    }
}

/// Condition consolidator task
pub struct Consolidator {
    /// Pause after each condition (µs)
    pause_us: u32,
    handled: u32,
    abnormal: u32,
    unknown: u32,
}

impl Consolidator {
    /// Consumer pausing `pause_us` after each condition
    pub fn new(pause_us: u32) -> Self {
        Self {
            pause_us,
            handled: 0,
            abnormal: 0,
            unknown: 0,
        }
    }

    /// One receive: block if empty, otherwise log and pause
    pub fn step<S: LogSink>(&mut self, ctx: &TaskContext<'_, S>) -> Yield {
        let Some(tag) = ctx.channel.try_receive() else {
            return Yield::Block;
        };

        let condition = Condition::from_tag(tag);
        match condition {
            Condition::Nominal(_) => {}
            Condition::Abnormal(state) => {
                self.abnormal += 1;
                tracing::warn!(
                    %state,
                    kind = ?state.kind(),
                    now_us = ctx.now_us,
                    "abnormal brake condition"
                );
            }
            Condition::Unknown(tag) => {
                self.unknown += 1;
                tracing::error!(tag, now_us = ctx.now_us, "unrecognized sensor state");
            }
        }
        self.handled += 1;
        ctx.logger.log_fmt(format_args!("{}", condition));

        Yield::Delay(self.pause_us)
    }

    /// Conditions logged
    pub fn handled(&self) -> u32 {
        self.handled
    }

    /// Over/under states seen
    pub fn abnormal(&self) -> u32 {
        self.abnormal
    }

    /// Unrecognized tags seen
    pub fn unknown(&self) -> u32 {
        self.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_strings() {
        assert_eq!(Condition::from_tag(0).to_string(), "Condition: TEMP_STABLE");
        assert_eq!(Condition::from_tag(3).to_string(), "Condition: PRESS_STABLE");
        assert_eq!(
            Condition::from_tag(1).to_string(),
            "Condition: TEMP_OVER (WARNING)"
        );
        assert_eq!(
            Condition::from_tag(5).to_string(),
            "Condition: PRESS_UNDER (WARNING)"
        );
        assert_eq!(Condition::from_tag(9).to_string(), "Condition: UNKNOWN (tag 9)");
    }

    #[test]
    fn test_every_state_is_mapped() {
        for state in SensorState::ALL {
            assert!(!matches!(Condition::from_tag(state.tag()), Condition::Unknown(_)));
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod step_tests {
    use super::*;
    use crate::channel::SensorChannel;
    use crate::logger::{MemorySink, SharedLogger};

    #[test]
    fn test_blocks_on_empty_channel() {
        let logger = SharedLogger::new(MemorySink::new());
        let channel = SensorChannel::new(2).unwrap();
        let ctx = TaskContext {
            logger: &logger,
            channel: &channel,
            now_us: 0,
        };

        let mut base = Consolidator::new(500_000);
        assert_eq!(base.step(&ctx), Yield::Block);
        assert_eq!(logger.entries_logged(), 0);
    }

    #[test]
    fn test_drains_in_fifo_order() {
        let logger = SharedLogger::new(MemorySink::new());
        let channel = SensorChannel::new(2).unwrap();
        let ctx = TaskContext {
            logger: &logger,
            channel: &channel,
            now_us: 0,
        };

        channel.try_send(SensorState::TemperatureStable).unwrap();
        channel.try_send(SensorState::PressureStable).unwrap();
        assert!(channel.try_send(SensorState::TemperatureStable).is_err());

        let mut base = Consolidator::new(500_000);
        assert_eq!(base.step(&ctx), Yield::Delay(500_000));
        assert_eq!(base.step(&ctx), Yield::Delay(500_000));
        assert_eq!(base.step(&ctx), Yield::Block);

        logger.inspect(|sink| {
            assert_eq!(
                sink.texts(),
                vec!["Condition: TEMP_STABLE", "Condition: PRESS_STABLE"]
            );
        });
    }

    #[test]
    fn test_unknown_tag_logs_fallback_and_keeps_running() {
        let logger = SharedLogger::new(MemorySink::new());
        let channel = SensorChannel::new(2).unwrap();
        let ctx = TaskContext {
            logger: &logger,
            channel: &channel,
            now_us: 0,
        };

        channel.try_send_tag(77).unwrap();
        channel.try_send(SensorState::PressureOver).unwrap();

        let mut base = Consolidator::new(1);
        base.step(&ctx);
        base.step(&ctx);

        assert_eq!(base.handled(), 2);
        assert_eq!(base.unknown(), 1);
        assert_eq!(base.abnormal(), 1);
        logger.inspect(|sink| {
            assert_eq!(
                sink.texts(),
                vec!["Condition: UNKNOWN (tag 77)", "Condition: PRESS_OVER (WARNING)"]
            );
        });
    }
}
