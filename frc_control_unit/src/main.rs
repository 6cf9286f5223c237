//! # FRC Control Unit
//!
//! Runs the control core against the simulated platform, driven by a match
//! script. Loads `robot.toml`, builds the autonomous registry, performs RT
//! setup and enters the fixed-period loop until the script ends, the tick
//! limit is reached, or Ctrl-C.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use frc_common::config::LogLevel;
use frc_common::consts::DEFAULT_CONFIG_PATH;
use frc_control_unit::config::{RobotConfig, load_config};
use frc_control_unit::cycle::{CycleRunner, rt_setup};
use frc_control_unit::platform::TelemetrySink;
use frc_control_unit::robot::RobotCore;
use frc_control_unit::sim::{ScriptedStation, SimExecutor, SimPlatform};
use frc_control_unit::telemetry::sinks::{JsonLinesSink, NullSink, TracingSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TelemetryOutput {
    /// `debug!` events on the `telemetry` target.
    Log,
    /// One JSON object per line on stdout.
    Json,
    None,
}

/// FRC Control Unit: simulated match runner
#[derive(Parser, Debug)]
#[command(name = "frc_control_unit")]
#[command(version)]
#[command(about = "Fixed-tick robot control core, driven by a match script")]
struct Args {
    /// Robot configuration TOML.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Match script TOML.
    #[arg(long, default_value = "config/match.toml")]
    script: PathBuf,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,

    /// Replay the script from the start when it ends.
    #[arg(long = "loop")]
    looping: bool,

    /// Ticks a one-shot task runs in the simulator.
    #[arg(long, default_value_t = 25)]
    one_shot_ticks: u32,

    /// Ticks an autonomous routine runs in the simulator.
    #[arg(long, default_value_t = 500)]
    routine_ticks: u32,

    #[arg(long, value_enum, default_value_t = TelemetryOutput::Log)]
    telemetry: TelemetryOutput,

    /// CPU core to pin the loop thread to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Config is loaded before tracing so its log level can be the default.
    let config = load_config(&args.config);
    let level = match &config {
        Ok(c) => c.shared.log_level,
        Err(_) => LogLevel::Info,
    };
    setup_tracing(&args, level);

    info!("FRC Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("FRC Control Unit shutdown complete");
}

fn run(args: &Args, config: &RobotConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        robot = %config.shared.robot_name,
        tick_ms = config.cycle.tick_period_ms,
        routines = config.autonomous.routines.len(),
        "config OK"
    );

    let station = ScriptedStation::load(&args.script)?.looping(args.looping);
    info!(
        script = %args.script.display(),
        ticks = station.total_ticks(),
        "match script loaded"
    );

    let sink: Box<dyn TelemetrySink> = match args.telemetry {
        TelemetryOutput::Log => Box::new(TracingSink),
        TelemetryOutput::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
        TelemetryOutput::None => Box::new(NullSink),
    };
    let executor = SimExecutor::with_durations(Some(args.one_shot_ticks), Some(args.routine_ticks));
    let platform = SimPlatform::new(config.cycle.tick_period(), executor, sink);
    let core = RobotCore::from_config(platform, config)?;
    info!(
        routines = ?core.registry().names().collect::<Vec<_>>(),
        selected = ?core.session().chosen(),
        "autonomous registry built"
    );

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut runner = CycleRunner::new(core, station, &config.cycle);
    info!("entering control loop");
    runner.run(&running, args.ticks)?;

    let stats = runner.stats();
    info!(
        cycles = stats.cycle_count,
        avg_us = stats.avg_cycle_ns() / 1_000,
        max_us = stats.max_cycle_ns / 1_000,
        overruns = stats.overruns,
        telemetry_sent = stats.telemetry_sent,
        telemetry_dropped = stats.telemetry_dropped,
        telemetry_failed = stats.telemetry_failed,
        "loop finished"
    );
    let dropped = runner.core().arbiter().dropped_instructions();
    if dropped > 0 {
        warn!(dropped, "instructions were dropped on a full buffer");
    }
    info!(
        mode = ?runner.core().mode(),
        launcher = ?runner.core().launcher_state(),
        intake = ?runner.core().intake_state(),
        climber = ?runner.core().climber_state(),
        drive = ?runner.core().drive_mode(),
        "final state"
    );
    Ok(())
}

/// Setup tracing subscriber on stderr (stdout carries JSON telemetry).
/// `RUST_LOG` wins, then `--verbose`, then the config's `log_level`.
fn setup_tracing(args: &Args, level: LogLevel) {
    let default = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
