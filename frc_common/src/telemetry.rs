//! Telemetry and diagnostics value types.
//!
//! A [`TelemetryFrame`] is a bounded, flat list of named values built once
//! per tick. Keys are `&'static str` and text values borrow from their
//! owner for the frame's lifetime, so building a frame never allocates.

use bitflags::bitflags;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::consts::MAX_TELEMETRY_ENTRIES;

bitflags! {
    /// Boolean diagnostic signals reported by a subsystem.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DiagnosticFlags: u8 {
        /// All motor controllers respond on the bus.
        const CONNECTED  = 0x01;
        /// Note detected by the launcher break beam.
        const BREAK_BEAM = 0x02;
        /// Mechanism at its commanded setpoint.
        const AT_TARGET  = 0x04;
    }
}

/// Snapshot of one subsystem's sensors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Diagnostics {
    /// Mechanism position (rotations or meters, subsystem-specific).
    pub position: f64,
    /// Primary motor current [A].
    pub current: f64,
    /// Secondary motor current [A] (e.g. intake roller), 0 if none.
    pub aux_current: f64,
    pub flags: DiagnosticFlags,
}

impl Diagnostics {
    #[inline]
    pub fn connected(&self) -> bool {
        self.flags.contains(DiagnosticFlags::CONNECTED)
    }
}

/// One telemetry value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryValue<'a> {
    Number(f64),
    Text(&'a str),
    Flag(bool),
}

impl Serialize for TelemetryValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Number(v) => serializer.serialize_f64(v),
            Self::Text(v) => serializer.serialize_str(v),
            Self::Flag(v) => serializer.serialize_bool(v),
        }
    }
}

/// Error returned by a telemetry sink. Never propagated into control logic.
#[derive(Debug, Clone, Error)]
pub enum TelemetryError {
    /// The sink's transport failed.
    #[error("telemetry transport error: {0}")]
    Transport(String),
    /// The sink is not accepting frames.
    #[error("telemetry sink unavailable")]
    Unavailable,
}

/// Flat per-tick mapping of named values.
#[derive(Debug, Clone, Default)]
pub struct TelemetryFrame<'a> {
    /// Tick counter the frame belongs to.
    pub tick: u64,
    entries: heapless::Vec<(&'static str, TelemetryValue<'a>), MAX_TELEMETRY_ENTRIES>,
}

impl<'a> TelemetryFrame<'a> {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            entries: heapless::Vec::new(),
        }
    }

    /// Add an entry. Returns `false` when the frame is full.
    pub fn put(&mut self, key: &'static str, value: TelemetryValue<'a>) -> bool {
        self.entries.push((key, value)).is_ok()
    }

    pub fn put_number(&mut self, key: &'static str, value: f64) -> bool {
        self.put(key, TelemetryValue::Number(value))
    }

    pub fn put_text(&mut self, key: &'static str, value: &'a str) -> bool {
        self.put(key, TelemetryValue::Text(value))
    }

    pub fn put_flag(&mut self, key: &'static str, value: bool) -> bool {
        self.put(key, TelemetryValue::Flag(value))
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<TelemetryValue<'a>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn entries(&self) -> &[(&'static str, TelemetryValue<'a>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TelemetryFrame<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry("tick", &self.tick)?;
        for (key, value) in self.entries.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
