//! Task definition — static, no-alloc task control blocks
//!
//! Each task has a fixed priority, a period, and a cosmetic stack size.
//! The scheduler only sees the control block; task behaviour lives in the
//! role objects stepped by the kernel.
//!
//! Author: Moroya Sakamoto

use crate::config::TaskConfig;

/// Maximum tasks the kernel can manage
pub const MAX_TASKS: usize = 8;

/// Task priority (higher number = higher priority)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskPriority(pub u8);

impl TaskPriority {
    /// Emergency actuation
    pub const BRAKE: TaskPriority = TaskPriority(3);
    /// Periodic sensor monitors
    pub const MONITOR: TaskPriority = TaskPriority(2);
    /// Telemetry consolidation
    pub const CONSOLIDATOR: TaskPriority = TaskPriority(1);
    /// Background (never preempts anything)
    pub const IDLE: TaskPriority = TaskPriority(0);
}

/// Task execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Task is ready to run
    Ready,
    /// Task holds the CPU
    Running,
    /// Task is waiting for a wake time
    Sleeping,
    /// Task is waiting for the sensor channel
    Blocked,
    /// Task slot is empty
    Inactive,
}

/// How a task gave up the CPU at the end of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Yield {
    /// Still computing; keep the CPU for the rest of this tick
    Busy,
    /// Sleep until the next periodic release
    WaitPeriod,
    /// Sleep for a relative duration in microseconds
    Delay(u32),
    /// Wait until the sensor channel has data
    Block,
}

/// Task control block — no heap
#[derive(Debug, Clone, Copy)]
pub struct TaskControlBlock {
    /// Task name (cosmetic)
    pub name: &'static str,
    /// Priority (higher = more urgent)
    pub priority: TaskPriority,
    /// Period in microseconds
    pub period_us: u32,
    /// Stack allocation in words (cosmetic)
    pub stack_size: u16,
    /// Worst-case execution time estimate in microseconds
    pub wcet_us: u32,
    /// Current state
    pub state: TaskState,
    /// Next periodic release (absolute µs)
    pub next_release: u64,
    /// Wake time while sleeping (absolute µs)
    pub wake_at: u64,
    /// Steps executed
    pub exec_count: u32,
    /// Releases skipped because the task was still behind
    pub deadline_misses: u32,
}

impl TaskControlBlock {
    /// Empty task slot
    pub const fn empty() -> Self {
        Self {
            name: "",
            priority: TaskPriority::IDLE,
            period_us: 0,
            stack_size: 0,
            wcet_us: 0,
            state: TaskState::Inactive,
            next_release: 0,
            wake_at: 0,
            exec_count: 0,
            deadline_misses: 0,
        }
    }

    /// Control block for a configured task, ready at time 0
    pub fn new(config: &TaskConfig, wcet_us: u32) -> Self {
        Self {
            name: config.name,
            priority: config.priority,
            period_us: config.period_us,
            stack_size: config.stack_size,
            wcet_us,
            state: TaskState::Ready,
            ..Self::empty()
        }
    }

    /// Is this task slot active?
    pub fn is_active(&self) -> bool {
        self.state != TaskState::Inactive
    }

    /// Can the scheduler dispatch this task now?
    pub fn is_runnable(&self) -> bool {
        matches!(self.state, TaskState::Ready | TaskState::Running)
    }

    /// CPU utilization for this task
    pub fn utilization(&self) -> f32 {
        if self.period_us == 0 {
            0.0
        } else {
            self.wcet_us as f32 / self.period_us as f32
        }
    }
}
