//! Kernel — bootstrap and run loop for the braking controller
//!
//! Allocates the shared logger and sensor channel, registers the four
//! tasks, and drives the scheduler one tick at a time. Shared resources
//! are owned here and lent to each task step through [`TaskContext`].
//!
//! Author: Moroya Sakamoto

use crate::actuator::{BrakeActuator, BrakeWorkload};
use crate::channel::{ChannelStats, SensorChannel};
use crate::config::{SystemConfig, TaskConfig};
use crate::consolidator::Consolidator;
use crate::error::Result;
use crate::logger::{LogSink, SharedLogger};
use crate::monitor::{stable_pressure, stable_temperature, SensorMonitor, StateSource};
use crate::scheduler::Scheduler;
use crate::sensor::SensorKind;
use crate::task::{TaskControlBlock, Yield, MAX_TASKS};
use crate::timer::SysTimer;

/// Upper bound on dispatches within one tick
const MAX_STEPS_PER_TICK: usize = 4 * MAX_TASKS;

/// WCET estimate for the short tasks: one tick
const SHORT_TASK_TICKS: u32 = 1;

/// What a task may touch during a step
pub struct TaskContext<'a, S: LogSink> {
    pub logger: &'a SharedLogger<S>,
    pub channel: &'a SensorChannel,
    /// Simulated time of the current tick (µs)
    pub now_us: u64,
}

/// The two process-wide shared resources
pub struct Resources<S: LogSink> {
    pub logger: SharedLogger<S>,
    pub channel: SensorChannel,
}

impl<S: LogSink> Resources<S> {
    /// Allocate logger and channel; nothing is scheduled if this fails
    pub fn allocate(channel_capacity: usize, sink: S) -> Result<Self> {
        let channel = SensorChannel::new(channel_capacity)?;
        let logger = SharedLogger::new(sink);
        Ok(Self { logger, channel })
    }
}

/// Scheduler slot of each task, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSlot {
    Consolidator = 0,
    Temperature = 1,
    Pressure = 2,
    Brake = 3,
}

impl TaskSlot {
    pub const ALL: [TaskSlot; 4] = [
        TaskSlot::Consolidator,
        TaskSlot::Temperature,
        TaskSlot::Pressure,
        TaskSlot::Brake,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// The fixed task set
struct TaskSet {
    consolidator: Consolidator,
    temperature: SensorMonitor,
    pressure: SensorMonitor,
    brake: BrakeActuator,
}

impl TaskSet {
    fn step<S: LogSink>(&mut self, slot: TaskSlot, ctx: &TaskContext<'_, S>) -> Yield {
        match slot {
            TaskSlot::Consolidator => self.consolidator.step(ctx),
            TaskSlot::Temperature => self.temperature.step(ctx),
            TaskSlot::Pressure => self.pressure.step(ctx),
            TaskSlot::Brake => self.brake.step(ctx),
        }
    }
}

/// Braking controller kernel
pub struct Kernel<S: LogSink> {
    /// Task scheduler
    pub scheduler: Scheduler,
    /// System timer
    pub timer: SysTimer,
    resources: Resources<S>,
    tasks: TaskSet,
    busy_ticks: u64,
    idle_ticks: u64,
    steps: u64,
}

impl<S: LogSink> Kernel<S> {
    /// Allocate resources and register the four tasks
    pub fn bootstrap(config: SystemConfig, sink: S) -> Result<Self> {
        Self::bootstrap_with_sources(config, sink, stable_temperature, stable_pressure)
    }

    /// Bootstrap with custom monitor state sources
    pub fn bootstrap_with_sources(
        config: SystemConfig,
        sink: S,
        temperature: StateSource,
        pressure: StateSource,
    ) -> Result<Self> {
        config.validate()?;
        let resources = Resources::allocate(config.channel_capacity, sink)?;
        tracing::info!(capacity = config.channel_capacity, "shared resources allocated");

        let tasks = TaskSet {
            consolidator: Consolidator::new(config.consolidator.period_us),
            temperature: SensorMonitor::new(SensorKind::Temperature, temperature),
            pressure: SensorMonitor::new(SensorKind::Pressure, pressure),
            brake: BrakeActuator::new(BrakeWorkload::new(
                config.brake_work_iterations,
                config.work_per_tick,
            )),
        };

        let mut scheduler = Scheduler::new();
        for slot in TaskSlot::ALL {
            let (task, wcet_us) = Self::task_parameters(&config, slot);
            let idx = scheduler.register(TaskControlBlock::new(task, wcet_us))?;
            debug_assert_eq!(idx, slot.index());
            tracing::debug!(
                task = task.name,
                priority = task.priority.0,
                period_us = task.period_us,
                "task registered"
            );
        }

        let utilization = scheduler.total_utilization();
        if scheduler.is_schedulable() {
            tracing::info!(utilization, "scheduler started");
        } else {
            tracing::warn!(utilization, "utilization above Liu & Layland bound");
        }

        Ok(Self {
            scheduler,
            timer: SysTimer::new(config.tick_us),
            resources,
            tasks,
            busy_ticks: 0,
            idle_ticks: 0,
            steps: 0,
        })
    }

    fn task_parameters(config: &SystemConfig, slot: TaskSlot) -> (&TaskConfig, u32) {
        let short = SHORT_TASK_TICKS * config.tick_us;
        match slot {
            TaskSlot::Consolidator => (&config.consolidator, short),
            TaskSlot::Temperature => (&config.temperature, short),
            TaskSlot::Pressure => (&config.pressure, short),
            TaskSlot::Brake => (&config.brake, config.brake_wcet_us()),
        }
    }

    /// Run one scheduler tick
    ///
    /// Releases due tasks, then dispatches the highest-priority runnable
    /// task until one stays busy or nothing is runnable. Returns the last
    /// task that ran, if any.
    pub fn tick(&mut self) -> Option<TaskSlot> {
        let now_us = self.timer.now_us();
        self.scheduler.release_due(now_us);

        let mut last = None;
        let mut busy = false;
        for _ in 0..MAX_STEPS_PER_TICK {
            if !self.resources.channel.is_empty() {
                self.scheduler.wake_blocked();
            }
            let Some(slot) = self.scheduler.dispatch().and_then(TaskSlot::from_index) else {
                break;
            };

            let ctx = TaskContext {
                logger: &self.resources.logger,
                channel: &self.resources.channel,
                now_us,
            };
            let outcome = self.tasks.step(slot, &ctx);
            self.scheduler.complete(slot.index(), outcome, now_us);
            self.steps += 1;
            last = Some(slot);

            if outcome == Yield::Busy {
                busy = true;
                break;
            }
        }

        if busy {
            self.busy_ticks += 1;
        } else {
            if last.is_none() {
                self.idle_ticks += 1;
            }
            self.scheduler.idle();
        }
        self.timer.advance_tick();
        last
    }

    /// Run a fixed number of ticks
    pub fn run_ticks(&mut self, ticks: u64) -> KernelStats {
        for _ in 0..ticks {
            self.tick();
        }
        self.stats()
    }

    /// Run for a span of simulated time
    pub fn run_for(&mut self, total_us: u64) -> KernelStats {
        let end = self.timer.now_us().saturating_add(total_us);
        while self.timer.now_us() < end {
            self.tick();
        }
        self.stats()
    }

    /// Execution statistics so far
    pub fn stats(&self) -> KernelStats {
        KernelStats {
            total_us: self.timer.now_us(),
            total_ticks: self.timer.ticks(),
            busy_ticks: self.busy_ticks,
            idle_ticks: self.idle_ticks,
            steps: self.steps,
            context_switches: self.scheduler.context_switches as u64,
            deadline_misses: self.scheduler.deadline_misses(),
            channel: self.resources.channel.stats(),
            log_entries: self.resources.logger.entries_logged(),
            brake_cycles: self.tasks.brake.cycles(),
            utilization: self.scheduler.total_utilization(),
            schedulable: self.scheduler.is_schedulable(),
        }
    }

    pub fn logger(&self) -> &SharedLogger<S> {
        &self.resources.logger
    }

    pub fn channel(&self) -> &SensorChannel {
        &self.resources.channel
    }

    pub fn task(&self, slot: TaskSlot) -> Option<&TaskControlBlock> {
        self.scheduler.get_task(slot.index())
    }

    pub fn brake(&self) -> &BrakeActuator {
        &self.tasks.brake
    }

    pub fn consolidator(&self) -> &Consolidator {
        &self.tasks.consolidator
    }

    pub fn monitor(&self, kind: SensorKind) -> &SensorMonitor {
        match kind {
            SensorKind::Temperature => &self.tasks.temperature,
            SensorKind::Pressure => &self.tasks.pressure,
        }
    }

    /// Current simulated time (µs)
    pub fn now_us(&self) -> u64 {
        self.timer.now_us()
    }
}

/// Kernel execution statistics
#[derive(Debug, Clone)]
pub struct KernelStats {
    /// Simulated time elapsed (µs)
    pub total_us: u64,
    /// Scheduler ticks
    pub total_ticks: u64,
    /// Ticks consumed by a busy task
    pub busy_ticks: u64,
    /// Ticks with nothing to run
    pub idle_ticks: u64,
    /// Task steps dispatched
    pub steps: u64,
    /// Context switches
    pub context_switches: u64,
    /// Skipped periodic releases
    pub deadline_misses: u32,
    /// Sensor channel counters
    pub channel: ChannelStats,
    /// Sequence ids issued by the shared logger
    pub log_entries: u64,
    /// Completed braking cycles
    pub brake_cycles: u32,
    /// Estimated CPU utilization
    pub utilization: f32,
    /// Within the Liu & Layland bound
    pub schedulable: bool,
}
