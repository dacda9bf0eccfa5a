//! System timer — simulated tick source
//!
//! Provides microsecond-resolution simulated time for the scheduler.
//! Time only moves when the kernel advances a tick, which keeps every run
//! deterministic.
//!
//! Author: Moroya Sakamoto

/// System timer
pub struct SysTimer {
    /// Current time (microseconds)
    now_us: u64,
    /// Tick length (microseconds)
    tick_us: u32,
    /// Ticks elapsed
    ticks: u64,
}

impl SysTimer {
    /// Timer with the given tick length
    pub const fn new(tick_us: u32) -> Self {
        Self {
            now_us: 0,
            tick_us,
            ticks: 0,
        }
    }

    /// Advance one tick
    pub fn advance_tick(&mut self) {
        self.now_us = self.now_us.saturating_add(self.tick_us as u64);
        self.ticks += 1;
    }

    /// Current time in microseconds
    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    /// Current time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.now_us / 1000
    }

    /// Tick length in microseconds
    pub fn tick_us(&self) -> u32 {
        self.tick_us
    }

    /// Ticks elapsed since start
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
