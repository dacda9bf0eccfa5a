//! Fixed-priority preemptive scheduler
//!
//! The highest-priority runnable task always gets the CPU. Tasks of equal
//! priority take turns: whenever several of them are runnable at once,
//! the one that went first last time goes after its peers. A release that
//! is already in the past when a task finishes counts as a deadline miss.
//!
//! Author: Moroya Sakamoto

use crate::error::{BrakeError, Result};
use crate::task::{TaskControlBlock, TaskState, Yield, MAX_TASKS};

/// Fixed-priority scheduler
///
/// Static task table, no dynamic allocation.
pub struct Scheduler {
    /// Static task table
    tasks: [TaskControlBlock; MAX_TASKS],
    /// Number of registered tasks
    task_count: usize,
    /// Task that last held the CPU (None = idle)
    current_task: Option<usize>,
    /// Winner of the last contended dispatch at each task's priority
    rr_lead: [bool; MAX_TASKS],
    /// Total context switches
    pub context_switches: u32,
}

impl Scheduler {
    /// Create empty scheduler
    pub const fn new() -> Self {
        Self {
            tasks: [TaskControlBlock::empty(); MAX_TASKS],
            task_count: 0,
            current_task: None,
            rr_lead: [false; MAX_TASKS],
            context_switches: 0,
        }
    }

    /// Register a task, returns slot index
    pub fn register(&mut self, task: TaskControlBlock) -> Result<usize> {
        if self.task_count >= MAX_TASKS {
            return Err(BrakeError::TaskTableFull);
        }
        let idx = self.task_count;
        self.tasks[idx] = task;
        self.task_count += 1;
        Ok(idx)
    }

    /// Ready every sleeping task whose wake time has come
    pub fn release_due(&mut self, now_us: u64) -> usize {
        let mut released = 0;
        for task in &mut self.tasks[..self.task_count] {
            if task.state == TaskState::Sleeping && task.wake_at <= now_us {
                task.state = TaskState::Ready;
                released += 1;
            }
        }
        released
    }

    /// Ready every task blocked on the sensor channel
    pub fn wake_blocked(&mut self) -> usize {
        let mut woken = 0;
        for task in &mut self.tasks[..self.task_count] {
            if task.state == TaskState::Blocked {
                task.state = TaskState::Ready;
                woken += 1;
            }
        }
        woken
    }

    /// Pick the task to run next and mark it Running
    ///
    /// A task still Running from an earlier tick is preempted back to Ready
    /// when something of higher priority is chosen.
    pub fn dispatch(&mut self) -> Option<usize> {
        let idx = self.find_highest_priority_runnable()?;

        if self.current_task != Some(idx) {
            if let Some(prev) = self.current_task {
                if self.tasks[prev].state == TaskState::Running {
                    self.tasks[prev].state = TaskState::Ready;
                    tracing::trace!(
                        preempted = self.tasks[prev].name,
                        by = self.tasks[idx].name,
                        "preemption"
                    );
                }
            }
            self.context_switches += 1;
            self.current_task = Some(idx);
        }

        self.rotate_peers(idx);
        self.tasks[idx].state = TaskState::Running;
        self.tasks[idx].exec_count += 1;
        Some(idx)
    }

    /// Apply the outcome of a step
    pub fn complete(&mut self, idx: usize, outcome: Yield, now_us: u64) {
        let task = &mut self.tasks[idx];
        match outcome {
            Yield::Busy => task.state = TaskState::Running,
            Yield::WaitPeriod => {
                task.next_release += task.period_us as u64;
                while task.next_release < now_us {
                    task.next_release += task.period_us as u64;
                    task.deadline_misses += 1;
                    tracing::warn!(task = task.name, now_us, "deadline missed, release skipped");
                }
                task.wake_at = task.next_release;
                task.state = if task.wake_at <= now_us {
                    TaskState::Ready
                } else {
                    TaskState::Sleeping
                };
            }
            Yield::Delay(us) => {
                task.wake_at = now_us + us as u64;
                task.state = TaskState::Sleeping;
            }
            Yield::Block => task.state = TaskState::Blocked,
        }
    }

    /// Note that no task ran for a tick
    pub fn idle(&mut self) {
        self.current_task = None;
    }

    /// Find highest-priority runnable task, rotating among equals
    fn find_highest_priority_runnable(&self) -> Option<usize> {
        let n = self.task_count;
        let top = self.tasks[..n]
            .iter()
            .filter(|t| t.is_runnable())
            .map(|t| t.priority)
            .max()?;

        let start = (0..n)
            .find(|&i| self.rr_lead[i] && self.tasks[i].priority == top)
            .map_or(0, |i| (i + 1) % n);
        (0..n)
            .map(|k| (start + k) % n)
            .find(|&i| self.tasks[i].is_runnable() && self.tasks[i].priority == top)
    }

    /// Hand the lead to `idx` if a peer of equal priority was also runnable
    fn rotate_peers(&mut self, idx: usize) {
        let priority = self.tasks[idx].priority;
        let contended = (0..self.task_count).any(|i| {
            i != idx && self.tasks[i].priority == priority && self.tasks[i].is_runnable()
        });
        if !contended {
            return;
        }
        for i in 0..self.task_count {
            if self.tasks[i].priority == priority {
                self.rr_lead[i] = i == idx;
            }
        }
    }

    /// Sufficient schedulability test
    ///
    /// Liu & Layland bound: U ≤ n(2^(1/n) - 1)
    /// For n=4: U ≤ 0.757
    pub fn is_schedulable(&self) -> bool {
        let n = self.active_task_count();
        if n == 0 {
            return true;
        }
        self.total_utilization() <= liu_layland_bound(n)
    }

    /// Total CPU utilization (sum of Ci/Ti for all tasks)
    pub fn total_utilization(&self) -> f32 {
        self.tasks[..self.task_count]
            .iter()
            .filter(|t| t.is_active())
            .map(|t| t.utilization())
            .sum()
    }

    /// Number of active tasks
    pub fn active_task_count(&self) -> usize {
        self.tasks[..self.task_count]
            .iter()
            .filter(|t| t.is_active())
            .count()
    }

    /// Sum of deadline misses over all tasks
    pub fn deadline_misses(&self) -> u32 {
        self.tasks[..self.task_count]
            .iter()
            .map(|t| t.deadline_misses)
            .sum()
    }

    /// Get task by index
    pub fn get_task(&self, idx: usize) -> Option<&TaskControlBlock> {
        if idx < self.task_count {
            Some(&self.tasks[idx])
        } else {
            None
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Liu & Layland bound: n(2^(1/n) - 1)
///
/// Uses precomputed table for small n, ln 2 beyond.
fn liu_layland_bound(n: usize) -> f32 {
    const BOUNDS: [f32; 10] = [
        1.000, // n=0: unused (returns early)
        1.000, // n=1: U ≤ 1.000
        0.828, // n=2: U ≤ 0.828
        0.780, // n=3: U ≤ 0.780
        0.757, // n=4: U ≤ 0.757
        0.743, // n=5: U ≤ 0.743
        0.735, // n=6: U ≤ 0.735
        0.729, // n=7: U ≤ 0.729
        0.724, // n=8: U ≤ 0.724
        0.693, // n≥9: U ≤ ln(2) ≈ 0.693
    ];
    if n == 0 {
        return 1.0;
    }
    BOUNDS[n.min(9)]
}
