//! Brake actuator — highest-priority periodic emergency stop
//!
//! `Idle → Braking → LoggingResult → Idle` once per period. Braking burns a
//! fixed amount of synthetic work, a slice per tick, so the actuator holds
//! the CPU for the whole actuation window instead of sleeping through it.
//! Actuation always succeeds; an actuator fault path would be a separate
//! degraded state.
//!
//! Author: Moroya Sakamoto

use crate::kernel::TaskContext;
use crate::logger::LogSink;
use crate::task::Yield;

/// Start-of-cycle message
pub const OBSTACLE_MESSAGE: &str = "Obstacle ahead! Initiating brakes...";

/// End-of-cycle message
pub const APPLIED_MESSAGE: &str = "Applied brakes successfully.";

/// Actuator state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakePhase {
    Idle,
    Braking,
    LoggingResult,
}

/// Deterministic counter workload standing in for actuation latency
#[derive(Debug, Clone, Copy)]
pub struct BrakeWorkload {
    total: u64,
    done: u64,
    per_slice: u64,
}

impl BrakeWorkload {
    /// `total` iterations, `per_slice` of them per scheduler tick
    pub const fn new(total: u64, per_slice: u64) -> Self {
        Self {
            total,
            done: 0,
            per_slice: if per_slice == 0 { 1 } else { per_slice },
        }
    }

    /// Rewind for the next braking cycle
    pub fn reset(&mut self) {
        self.done = 0;
    }

    /// Run one slice; true once all iterations are done
    pub fn advance(&mut self) -> bool {
        let slice = self.per_slice.min(self.remaining());
        self.done += slice;
        self.is_complete()
    }

    /// All iterations done
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }

    /// Iterations still to run
    pub fn remaining(&self) -> u64 {
        self.total - self.done
    }
}

/// Brake actuator task
pub struct BrakeActuator {
    phase: BrakePhase,
    workload: BrakeWorkload,
    cycle_started_us: u64,
    last_latency_us: u64,
    cycles: u32,
}

impl BrakeActuator {
    pub fn new(workload: BrakeWorkload) -> Self {
        Self {
            phase: BrakePhase::Idle,
            workload,
            cycle_started_us: 0,
            last_latency_us: 0,
            cycles: 0,
        }
    }

    /// Advance the state machine by one step
    pub fn step<S: LogSink>(&mut self, ctx: &TaskContext<'_, S>) -> Yield {
        loop {
            match self.phase {
                BrakePhase::Idle => {
                    ctx.logger.log(OBSTACLE_MESSAGE);
                    self.workload.reset();
                    self.cycle_started_us = ctx.now_us;
                    self.phase = BrakePhase::Braking;
                }
                BrakePhase::Braking => {
                    if !self.workload.advance() {
                        return Yield::Busy;
                    }
                    self.phase = BrakePhase::LoggingResult;
                }
                BrakePhase::LoggingResult => {
                    ctx.logger.log(APPLIED_MESSAGE);
                    self.last_latency_us = ctx.now_us - self.cycle_started_us;
                    self.cycles += 1;
                    self.phase = BrakePhase::Idle;
                    tracing::debug!(
                        cycle = self.cycles,
                        latency_us = self.last_latency_us,
                        "brake cycle complete"
                    );
                    return Yield::WaitPeriod;
                }
            }
        }
    }

    pub fn phase(&self) -> BrakePhase {
        self.phase
    }

    /// Completed braking cycles
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Time from obstacle signal to applied brakes in the last cycle (µs)
    pub fn last_latency_us(&self) -> u64 {
        self.last_latency_us
    }
}
