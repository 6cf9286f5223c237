//! Fixed-period cycle: sample → tick → telemetry.
//!
//! Each cycle samples the [`DriverStation`], runs one
//! [`RobotCore::tick`], and then publishes telemetry if the tick's critical
//! path left enough of the period. Overruns are logged with their overage
//! and counted; the loop keeps going.
//!
//! ## RT Setup
//! With the `rt` feature: `mlockall`, stack prefault, CPU pinning and
//! `SCHED_FIFO`, and the loop paces itself with
//! `clock_nanosleep(TIMER_ABSTIME)`. Without it every RT call is a no-op
//! and the loop sleeps with `std::thread::sleep`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bitflags::bitflags;
use thiserror::Error;
use tracing::{debug, warn};

use frc_common::input::InputSnapshot;
use frc_common::state::RobotMode;

use crate::config::CycleConfig;
use crate::platform::Platform;
use crate::robot::RobotCore;

// ─── Driver Station ─────────────────────────────────────────────────

/// One sample of the external world.
#[derive(Debug, Clone, Default)]
pub struct StationFrame {
    /// Mode signal from the field / driver station.
    pub mode: RobotMode,
    pub input: InputSnapshot,
    /// Autonomous routine chosen on the dashboard this tick, if it changed.
    pub select_auto: Option<String>,
}

/// Non-blocking source of mode signal and controller input.
pub trait DriverStation {
    /// Sample for the coming tick. `None` once the source has ended.
    fn sample(&mut self) -> Option<StationFrame>;
}

// ─── Cycle Statistics ───────────────────────────────────────────────

bitflags! {
    /// What happened during one cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TickFlags: u8 {
        /// Whole cycle took longer than the period.
        const OVERRUN           = 0x01;
        /// Telemetry skipped, critical path over budget.
        const TELEMETRY_DROPPED = 0x02;
        /// Sink rejected the frame.
        const TELEMETRY_FAILED  = 0x04;
        const MODE_CHANGED      = 0x08;
        /// Telemetry published.
        const TELEMETRY_SENT    = 0x10;
    }
}

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    pub cycle_count: u64,
    pub last_cycle_ns: u64,
    pub min_cycle_ns: u64,
    pub max_cycle_ns: u64,
    pub sum_cycle_ns: u128,
    pub overruns: u64,
    /// Largest amount a cycle exceeded the period by [ns].
    pub max_overrun_ns: u64,
    pub telemetry_sent: u64,
    pub telemetry_dropped: u64,
    pub telemetry_failed: u64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_overrun_ns: 0,
            telemetry_sent: 0,
            telemetry_dropped: 0,
            telemetry_failed: 0,
        }
    }

    /// Record one cycle. No allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: u64, flags: TickFlags, overage_ns: u64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += u128::from(duration_ns);
        if flags.contains(TickFlags::OVERRUN) {
            self.overruns += 1;
            self.max_overrun_ns = self.max_overrun_ns.max(overage_ns);
        }
        if flags.contains(TickFlags::TELEMETRY_SENT) {
            self.telemetry_sent += 1;
        }
        if flags.contains(TickFlags::TELEMETRY_DROPPED) {
            self.telemetry_dropped += 1;
        }
        if flags.contains(TickFlags::TELEMETRY_FAILED) {
            self.telemetry_failed += 1;
        }
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            (self.sum_cycle_ns / u128::from(self.cycle_count)) as u64
        }
    }
}

/// Period and telemetry budget of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickBudget {
    pub period: Duration,
    /// Critical-path time after which telemetry is skipped.
    pub telemetry: Duration,
}

impl TickBudget {
    pub fn from_config(config: &CycleConfig) -> Self {
        let period = config.tick_period();
        Self {
            period,
            telemetry: period * u32::from(config.telemetry_budget_pct) / 100,
        }
    }

    #[inline]
    pub fn telemetry_allowed(&self, critical: Duration) -> bool {
        critical <= self.telemetry
    }

    /// Amount the cycle ran over the period, if any.
    #[inline]
    pub fn overage(&self, total: Duration) -> Option<Duration> {
        total.checked_sub(self.period).filter(|d| !d.is_zero())
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Errors during RT setup or loop pacing.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("RT setup error: {0}")]
    RtSetup(String),
    #[error("clock error: {0}")]
    Clock(String),
}

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch stack pages so the loop does not fault on them later.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup. Call once, before entering the loop.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Drives a [`RobotCore`] from a [`DriverStation`] at a fixed period.
pub struct CycleRunner<P: Platform, D: DriverStation> {
    core: RobotCore<P>,
    station: D,
    budget: TickBudget,
    telemetry_interval: u64,
    stats: CycleStats,
}

impl<P: Platform, D: DriverStation> CycleRunner<P, D> {
    pub fn new(core: RobotCore<P>, station: D, config: &CycleConfig) -> Self {
        Self {
            core,
            station,
            budget: TickBudget::from_config(config),
            telemetry_interval: u64::from(config.telemetry_interval.max(1)),
            stats: CycleStats::new(),
        }
    }

    /// Run one cycle without pacing. `None` once the station has ended.
    pub fn step(&mut self) -> Option<TickFlags> {
        let start = Instant::now();
        let frame = self.station.sample()?;

        if let Some(name) = frame.select_auto.as_deref() {
            self.core.select_auto(Some(name));
        }
        let report = self.core.tick(frame.mode, &frame.input);
        let critical = start.elapsed();

        let mut flags = TickFlags::empty();
        if report.transition.is_some() {
            flags |= TickFlags::MODE_CHANGED;
        }

        if report.tick % self.telemetry_interval == 0 {
            if !self.budget.telemetry_allowed(critical) {
                debug!(
                    tick = report.tick,
                    critical_us = critical.as_micros() as u64,
                    "telemetry dropped, critical path over budget"
                );
                flags |= TickFlags::TELEMETRY_DROPPED;
            } else if self.core.publish_telemetry() {
                flags |= TickFlags::TELEMETRY_SENT;
            } else {
                flags |= TickFlags::TELEMETRY_FAILED;
            }
        }

        let total = start.elapsed();
        let overage = self.budget.overage(total);
        if let Some(over) = overage {
            flags |= TickFlags::OVERRUN;
            warn!(
                tick = report.tick,
                duration_us = total.as_micros() as u64,
                overage_us = over.as_micros() as u64,
                "tick overrun"
            );
        }
        self.stats.record(
            total.as_nanos() as u64,
            flags,
            overage.map_or(0, |d| d.as_nanos() as u64),
        );
        Some(flags)
    }

    /// Run `ticks` cycles back to back without pacing.
    pub fn run_for(&mut self, ticks: u64) -> &CycleStats {
        for _ in 0..ticks {
            if self.step().is_none() {
                break;
            }
        }
        &self.stats
    }

    /// Paced loop. Returns when `running` is cleared, the station ends, or
    /// `max_ticks` cycles have run.
    pub fn run(&mut self, running: &AtomicBool, max_ticks: Option<u64>) -> Result<(), CycleError> {
        #[cfg(feature = "rt")]
        {
            self.run_rt_loop(running, max_ticks)
        }

        #[cfg(not(feature = "rt"))]
        {
            self.run_sim_loop(running, max_ticks);
            Ok(())
        }
    }

    fn limit_reached(&self, max_ticks: Option<u64>) -> bool {
        max_ticks.is_some_and(|max| self.stats.cycle_count >= max)
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, running: &AtomicBool, max_ticks: Option<u64>) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let period_ns = self.budget.period.as_nanos() as i64;
        let mut next_wake =
            clock_gettime(clock).map_err(|e| CycleError::Clock(format!("clock_gettime: {e}")))?;

        while running.load(Ordering::Relaxed) && !self.limit_reached(max_ticks) {
            next_wake = timespec_add_ns(next_wake, period_ns);
            if self.step().is_none() {
                break;
            }
            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, running: &AtomicBool, max_ticks: Option<u64>) {
        while running.load(Ordering::Relaxed) && !self.limit_reached(max_ticks) {
            let start = Instant::now();
            if self.step().is_none() {
                break;
            }
            if let Some(remaining) = self.budget.period.checked_sub(start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn core(&self) -> &RobotCore<P> {
        &self.core
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

// ─── Tests ──────────────────────────────────────────────────────────
