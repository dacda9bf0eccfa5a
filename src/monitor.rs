//! Temperature and pressure monitors — periodic channel producers
//!
//! Each release samples one state and offers it to the sensor channel
//! without blocking. A full channel is logged and counted; the next
//! release is the only retry.
//!
//! Author: Moroya Sakamoto

use crate::kernel::TaskContext;
use crate::logger::LogSink;
use crate::sensor::{SensorKind, SensorState};
use crate::task::Yield;

/// Produces the state a monitor reports on its n-th release
pub type StateSource = fn(u32) -> SensorState;

/// Nominal temperature reading on every release
pub fn stable_temperature(_sample: u32) -> SensorState {
    SensorState::stable(SensorKind::Temperature)
}

/// Nominal pressure reading on every release
pub fn stable_pressure(_sample: u32) -> SensorState {
    SensorState::stable(SensorKind::Pressure)
}

/// Periodic sensor monitor
pub struct SensorMonitor {
    kind: SensorKind,
    source: StateSource,
    samples: u32,
    delivered: u32,
    dropped: u32,
}

impl SensorMonitor {
    /// Monitor with a custom state source
    pub fn new(kind: SensorKind, source: StateSource) -> Self {
        Self {
            kind,
            source,
            samples: 0,
            delivered: 0,
            dropped: 0,
        }
    }

    /// Brake temperature monitor reporting `TEMP_STABLE`
    pub fn temperature() -> Self {
        Self::new(SensorKind::Temperature, stable_temperature)
    }

    /// Brake fluid pressure monitor reporting `PRESS_STABLE`
    pub fn pressure() -> Self {
        Self::new(SensorKind::Pressure, stable_pressure)
    }

    /// One release: sample, offer to the channel, report
    pub fn step<S: LogSink>(&mut self, ctx: &TaskContext<'_, S>) -> Yield {
        let state = (self.source)(self.samples);
        self.samples = self.samples.wrapping_add(1);

        match ctx.channel.try_send(state) {
            Ok(()) => {
                self.delivered += 1;
                ctx.logger.log_fmt(format_args!("{} sent to queue", state));
            }
            Err(err) => {
                self.dropped += 1;
                tracing::warn!(
                    kind = ?self.kind,
                    %err,
                    now_us = ctx.now_us,
                    "sensor state dropped"
                );
                ctx.logger
                    .log_fmt(format_args!("[ERROR] Could not send {} to queue!", state));
            }
        }
        Yield::WaitPeriod
    }

    /// Quantity this monitor reports on
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Releases executed
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// States accepted by the channel
    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    /// States rejected because the channel was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
