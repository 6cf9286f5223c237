//! Telemetry sinks.

use std::collections::VecDeque;
use std::io::Write;

use tracing::debug;

use frc_common::telemetry::{TelemetryError, TelemetryFrame, TelemetryValue};

use crate::platform::TelemetrySink;

/// Logs each frame as a single `debug!` event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn publish(&mut self, frame: &TelemetryFrame<'_>) -> Result<(), TelemetryError> {
        let text = serde_json::to_string(frame)
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;
        debug!(target: "telemetry", tick = frame.tick, frame = %text);
        Ok(())
    }
}

/// Writes one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TelemetrySink for JsonLinesSink<W> {
    fn publish(&mut self, frame: &TelemetryFrame<'_>) -> Result<(), TelemetryError> {
        serde_json::to_writer(&mut self.writer, frame)
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| TelemetryError::Transport(e.to_string()))
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn publish(&mut self, _frame: &TelemetryFrame<'_>) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Keeps the most recent frames as JSON values.
#[derive(Debug)]
pub struct MemorySink {
    frames: VecDeque<serde_json::Value>,
    capacity: usize,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn latest(&self) -> Option<&serde_json::Value> {
        self.frames.back()
    }

    pub fn frames(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TelemetrySink for MemorySink {
    fn publish(&mut self, frame: &TelemetryFrame<'_>) -> Result<(), TelemetryError> {
        let mut object = serde_json::Map::with_capacity(frame.len() + 1);
        object.insert("tick".to_string(), frame.tick.into());
        for (key, value) in frame.entries() {
            let value = match *value {
                TelemetryValue::Number(v) => serde_json::Value::from(v),
                TelemetryValue::Text(v) => serde_json::Value::from(v),
                TelemetryValue::Flag(v) => serde_json::Value::from(v),
            };
            object.insert((*key).to_string(), value);
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(serde_json::Value::Object(object));
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
