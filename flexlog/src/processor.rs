//! Final stage: writing formatted entries to their targets.

use std::{collections::HashMap, fmt::Write, sync::Arc, sync::Mutex};

use flexlog_flush::{
    file_flusher::FileFlusher, noop_flusher::NoopFlusher, stderr_flusher::StderrFlusher,
    stdout_flusher::StdoutFlusher, Flush,
};

use crate::{
    config::{LoggingConfig, TargetConfig, TargetKind},
    entry::LogEntry,
    error::ProcessError,
    format::{FormattingContext, MessageFormatterFactory},
};

/// Consumes completed entries.
pub trait LogEntryProcessor: Send + Sync {
    fn process_entry(&self, entry: &LogEntry) -> Result<(), ProcessError>;

    /// Pushes out anything buffered. Called once the pipeline has shut down.
    fn flush(&self) -> Result<(), ProcessError> {
        Ok(())
    }
}

impl<P: LogEntryProcessor + ?Sized> LogEntryProcessor for Arc<P> {
    fn process_entry(&self, entry: &LogEntry) -> Result<(), ProcessError> {
        (**self).process_entry(entry)
    }

    fn flush(&self) -> Result<(), ProcessError> {
        (**self).flush()
    }
}

/// Formats each entry and writes it as one line to the entry's target.
///
/// The target is the entry's own target, or `DefaultTarget`. Sinks are
/// created from the `Targets` configuration and can be replaced or added
/// with [`TargetProcessor::with_sink`]. A line looks like
///
/// ```text
/// [2024-05-01T10:00:00.123Z][INF]Method app::Orders.place completed in 1.20ms
/// ```
///
/// with the timestamp and level prefixes controlled per target.
pub struct TargetProcessor {
    config: Arc<LoggingConfig>,
    factory: MessageFormatterFactory,
    sinks: HashMap<String, Mutex<Box<dyn Flush>>>,
}

impl TargetProcessor {
    pub fn new(config: Arc<LoggingConfig>) -> Self {
        let sinks = config
            .targets
            .iter()
            .map(|(name, target)| (name.clone(), Mutex::new(sink_for(name, target))))
            .collect();

        Self {
            config,
            factory: MessageFormatterFactory::new(),
            sinks,
        }
    }

    /// Binds `flusher` to the target `name`, replacing any configured sink.
    pub fn with_sink<F: Flush + 'static>(mut self, name: impl Into<String>, flusher: F) -> Self {
        self.sinks
            .insert(name.into(), Mutex::new(Box::new(flusher)));
        self
    }

    pub fn with_factory(self, factory: MessageFormatterFactory) -> Self {
        Self { factory, ..self }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Pushes out buffered output of every sink.
    pub fn flush_all(&self) -> Result<(), ProcessError> {
        for (name, sink) in &self.sinks {
            let mut sink = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            sink.flush_all().map_err(|source| ProcessError::Write {
                target: name.clone(),
                source,
            })?;
        }

        Ok(())
    }

    fn render_line(
        &self,
        message: &str,
        entry: &LogEntry,
        target: Option<&TargetConfig>,
    ) -> Result<String, std::fmt::Error> {
        let (show_timestamp, show_level) = target
            .map(|t| (t.show_timestamp, t.show_level))
            .unwrap_or((true, true));

        let mut line = String::with_capacity(message.len() + 48);
        if show_timestamp {
            write!(
                line,
                "[{}]",
                entry
                    .timestamp()
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            )?;
        }
        if show_level {
            write!(line, "[{}]", entry.level().as_short_str())?;
        }
        writeln!(line, "{}", message)?;

        Ok(line)
    }
}

impl LogEntryProcessor for TargetProcessor {
    fn process_entry(&self, entry: &LogEntry) -> Result<(), ProcessError> {
        let ctx = FormattingContext::new(entry, &self.config);
        let target_name = ctx.target_name();
        let target = ctx.target_config();

        if let Some(target) = target {
            if !target.enabled || !entry.level().is_enabled_for(target.min_level) {
                return Ok(());
            }
        }

        let sink = self
            .sinks
            .get(target_name)
            .ok_or_else(|| ProcessError::UnknownTarget(target_name.to_string()))?;

        let message = self.factory.render(&ctx)?;
        let line = self
            .render_line(&message, entry, target)
            .map_err(|e| ProcessError::Formatting {
                formatter: entry.formatter().unwrap_or(self.config.default_formatter),
                reason: e.to_string(),
            })?;

        let mut sink = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sink.flush_one(line).map_err(|source| ProcessError::Write {
            target: target_name.to_string(),
            source,
        })
    }

    fn flush(&self) -> Result<(), ProcessError> {
        self.flush_all()
    }
}

fn sink_for(name: &str, target: &TargetConfig) -> Box<dyn Flush> {
    match target.kind {
        TargetKind::Console => Box::new(StdoutFlusher::new()),
        TargetKind::Stderr => Box::new(StderrFlusher::new()),
        TargetKind::Noop => Box::new(NoopFlusher::new()),
        TargetKind::File => match &target.path {
            Some(path) => Box::new(FileFlusher::new(path)),
            None => {
                tracing::warn!(target_name = name, "file target has no path, discarding its output");
                Box::new(NoopFlusher::new())
            }
        },
    }
}
