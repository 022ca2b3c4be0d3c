use std::{
    fs::{File, OpenOptions},
    io::{LineWriter, Write},
    path::PathBuf,
};

use crate::Flush;

/// Flushes into a file
///
/// The file is opened in append mode on first write and kept open afterwards.
pub struct FileFlusher {
    path: PathBuf,
    writer: Option<LineWriter<File>>,
}

impl FileFlusher {
    /// Flushes into file with specified path
    pub fn new(path: impl Into<PathBuf>) -> FileFlusher {
        FileFlusher {
            path: path.into(),
            writer: None,
        }
    }

    fn writer(&mut self) -> std::io::Result<&mut LineWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.writer = Some(LineWriter::new(file));
        }

        self.writer
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "file writer unavailable"))
    }
}

impl Flush for FileFlusher {
    fn flush_one(&mut self, display: String) -> std::io::Result<()> {
        let result = self.writer()?.write_all(display.as_bytes());
        if result.is_err() {
            // Reopen on the next write
            self.writer = None;
        }

        result
    }

    fn flush_all(&mut self) -> std::io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}
