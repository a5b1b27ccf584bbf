// src/logging.rs
//
// Diagnostics and per-step telemetry.
// - init_tracing: fmt subscriber for the binaries, level from -v / RUST_LOG
// - EventSink:    trait the driver reports every evaluated step to
// - NoopSink:     discards all records
// - MemorySink:   keeps records in memory (one per policy run)
// - JsonlSink:    one JSON object per line

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::types::ZoomConfig;

/// Install the global fmt subscriber.
///
/// `verbosity` counts `-v` flags: 0 warn, 1 info, 2 debug, 3+ trace.
/// `RUST_LOG` directives are applied on top.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// One evaluated step of one policy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub policy: String,
    pub step: usize,
    pub config: ZoomConfig,
    pub per_camera_detected: Vec<usize>,
    pub k_cover: usize,
}

/// Abstract sink for per-step telemetry.
pub trait EventSink {
    fn log_step(&mut self, record: &StepRecord);
}

/// Sink that discards all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_step(&mut self, _record: &StepRecord) {}
}

/// Sink that keeps every record.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<StepRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<StepRecord> {
        self.records
    }
}

impl EventSink for MemorySink {
    fn log_step(&mut self, record: &StepRecord) {
        self.records.push(record.clone());
    }
}

/// JSONL file sink.
///
/// Write failures are counted rather than propagated so a full disk never
/// aborts a run; check `failed_writes` when it matters.
pub struct JsonlSink {
    writer: BufWriter<File>,
    failed_writes: u64,
}

impl JsonlSink {
    /// Create a new sink writing to `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            failed_writes: 0,
        })
    }

    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl EventSink for JsonlSink {
    fn log_step(&mut self, record: &StepRecord) {
        let written = serde_json::to_writer(&mut self.writer, record)
            .map_err(io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if written.is_err() {
            self.failed_writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: usize) -> StepRecord {
        StepRecord {
            policy: "optimal".to_string(),
            step,
            config: ZoomConfig::new(vec![1, 0]),
            per_camera_detected: vec![2, 0],
            k_cover: 0,
        }
    }

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.log_step(&record(0));
        sink.log_step(&record(1));
        let steps: Vec<usize> = sink.records().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![0, 1]);
    }

    #[test]
    fn jsonl_sink_writes_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steps.jsonl");
        let mut sink = JsonlSink::create(&path).unwrap();
        sink.log_step(&record(0));
        sink.log_step(&record(1));
        sink.flush().unwrap();
        assert_eq!(sink.failed_writes(), 0);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let back: StepRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, record(1));
        assert!(lines[0].contains("\"config\":[1,0]"));
    }
}
