use std::io::Write;

use crate::Flush;

/// Flushes into stdout
pub struct StdoutFlusher;

impl StdoutFlusher {
    pub fn new() -> StdoutFlusher {
        StdoutFlusher {}
    }
}

impl Default for StdoutFlusher {
    fn default() -> Self {
        Self::new()
    }
}

impl Flush for StdoutFlusher {
    fn flush_one(&mut self, display: String) -> std::io::Result<()> {
        std::io::stdout().lock().write_all(display.as_bytes())
    }

    fn flush_all(&mut self) -> std::io::Result<()> {
        std::io::stdout().lock().flush()
    }
}
