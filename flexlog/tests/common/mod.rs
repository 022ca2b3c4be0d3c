// Not every test binary uses every helper
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use flexlog::clock::quanta::QuantaClock;
use flexlog::flush::Flush;
use flexlog::{FlexLog, LoggingConfig};

/// Collects rendered lines in memory.
#[derive(Clone, Default)]
pub(crate) struct VecFlusher {
    lines: Arc<Mutex<Vec<String>>>,
}

impl VecFlusher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines without their `[timestamp][LVL]` prefix and trailing newline.
    pub(crate) fn messages(&self) -> Vec<String> {
        self.lines().iter().map(|l| message_from_log_line(l)).collect()
    }
}

impl Flush for VecFlusher {
    fn flush_one(&mut self, display: String) -> std::io::Result<()> {
        self.lines.lock().unwrap().push(display);
        Ok(())
    }
}

pub(crate) fn message_from_log_line(log_line: &str) -> String {
    let message = log_line.trim_end_matches('\n');
    let mut rest = message;
    for _ in 0..2 {
        if rest.starts_with('[') {
            if let Some(end) = rest.find(']') {
                rest = &rest[end + 1..];
            }
        }
    }
    rest.to_string()
}

pub(crate) fn level_from_log_line(log_line: &str) -> String {
    let after_timestamp = &log_line[log_line.find(']').unwrap() + 1..];
    after_timestamp[1..after_timestamp.find(']').unwrap()].to_string()
}

/// Host writing the `Console` target to memory, with a clock that never
/// advances unless told to.
pub(crate) fn host(config: LoggingConfig) -> (FlexLog, VecFlusher) {
    let console = VecFlusher::new();
    let (clock, _mock) = QuantaClock::mock();
    let host = FlexLog::builder(config)
        .sink("Console", console.clone())
        .clock(clock)
        .build()
        .unwrap();
    (host, console)
}
