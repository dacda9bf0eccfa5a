//! Braking management simulation CLI.
//!
//! Boots the controller on the simulated tick kernel and streams the shared
//! log to stdout. Diagnostics go to stderr through `tracing`.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use brake_rtos::{Kernel, SensorKind, StdoutSink, SystemConfig};

#[derive(Parser)]
#[command(name = "brake-sim")]
#[command(about = "Braking management controller on a fixed-priority tick kernel")]
struct Cli {
    /// Simulated run time in milliseconds
    #[arg(long, default_value = "30000")]
    duration_ms: u64,

    /// Scheduler tick in microseconds
    #[arg(long, default_value = "1000")]
    tick_us: u32,

    /// Sensor channel slots
    #[arg(long, default_value = "2")]
    channel_capacity: usize,

    /// Temperature and pressure monitor period in milliseconds
    #[arg(long, default_value = "2500")]
    monitor_period_ms: u32,

    /// Consolidator pause after each condition in milliseconds
    #[arg(long, default_value = "500")]
    consolidator_delay_ms: u32,

    /// Brake actuator period in milliseconds
    #[arg(long, default_value = "6000")]
    brake_period_ms: u32,

    /// Synthetic work iterations per braking cycle
    #[arg(long, default_value = "500000000")]
    brake_iterations: u64,

    /// Work iterations completed per tick
    #[arg(long, default_value = "1000000")]
    work_per_tick: u64,

    /// Pace the simulation against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn system_config(&self) -> SystemConfig {
        let mut config = SystemConfig {
            tick_us: self.tick_us,
            channel_capacity: self.channel_capacity,
            brake_work_iterations: self.brake_iterations,
            work_per_tick: self.work_per_tick,
            ..SystemConfig::default()
        };
        config.temperature.period_us = self.monitor_period_ms.saturating_mul(1000);
        config.pressure.period_us = self.monitor_period_ms.saturating_mul(1000);
        config.consolidator.period_us = self.consolidator_delay_ms.saturating_mul(1000);
        config.brake.period_us = self.brake_period_ms.saturating_mul(1000);
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    println!("Braking Management System (simulation)\n");

    let config = cli.system_config();
    let mut kernel = Kernel::bootstrap(config, StdoutSink)
        .context("controller bootstrap failed, no task was started")?;

    let total_us = cli.duration_ms.saturating_mul(1000);
    let stats = if cli.realtime {
        let tick = Duration::from_micros(kernel.timer.tick_us() as u64);
        while kernel.now_us() < total_us {
            kernel.tick();
            std::thread::sleep(tick);
        }
        kernel.stats()
    } else {
        kernel.run_for(total_us)
    };

    println!("\n=== Simulation Complete ===");
    println!("Simulated time: {} ms", kernel.timer.now_ms());
    println!(
        "Ticks: {} (busy {}, idle {})",
        stats.total_ticks, stats.busy_ticks, stats.idle_ticks
    );
    println!("Context switches: {}", stats.context_switches);
    println!(
        "Channel: sent {}, dropped {}, received {}, peak depth {}",
        stats.channel.sent,
        stats.channel.dropped,
        stats.channel.received,
        stats.channel.peak_depth
    );
    for kind in [SensorKind::Temperature, SensorKind::Pressure] {
        let monitor = kernel.monitor(kind);
        println!(
            "{:?} monitor: delivered {}, dropped {}",
            monitor.kind(),
            monitor.delivered(),
            monitor.dropped()
        );
    }
    println!(
        "Brake cycles: {} (last latency {} ms)",
        stats.brake_cycles,
        kernel.brake().last_latency_us() / 1000
    );
    println!("Deadline misses: {}", stats.deadline_misses);
    println!("Log entries: {}", stats.log_entries);
    println!(
        "Utilization: {:.3} ({})",
        stats.utilization,
        if stats.schedulable { "schedulable" } else { "over bound" }
    );

    Ok(())
}
