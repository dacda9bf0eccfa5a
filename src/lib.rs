//! Brake RTOS — braking management controller
//!
//! Periodic monitors, one consumer, one emergency task.
//!
//! A small real-time controller on a deterministic tick kernel:
//! - Static task table (no heap, no allocation)
//! - Fixed-priority preemptive scheduling, round-robin among equals
//! - Bounded sensor channel: non-blocking send, blocking receive
//! - Serialized, sequence-stamped shared logger
//!
//! The brake actuator preempts every other task; temperature and pressure
//! monitors feed the condition consolidator through the sensor channel.
//!
//! Author: Moroya Sakamoto

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod actuator;
pub mod channel;
pub mod config;
pub mod consolidator;
pub mod error;
pub mod kernel;
pub mod logger;
pub mod monitor;
pub mod scheduler;
pub mod sensor;
pub mod task;
pub mod timer;

pub use actuator::{BrakeActuator, BrakePhase, BrakeWorkload};
pub use channel::{ChannelStats, SensorChannel};
pub use config::{SystemConfig, TaskConfig};
pub use consolidator::{Condition, Consolidator};
pub use error::{BrakeError, Result};
pub use kernel::{Kernel, KernelStats, Resources, TaskContext, TaskSlot};
pub use logger::{LogEntry, LogSink, NullSink, SharedLogger};
pub use monitor::{SensorMonitor, StateSource};
pub use scheduler::Scheduler;
pub use sensor::{SensorKind, SensorState};
pub use task::{TaskControlBlock, TaskPriority, TaskState, Yield};
pub use timer::SysTimer;

#[cfg(feature = "std")]
pub use logger::{LoggedLine, MemorySink, StdoutSink};
