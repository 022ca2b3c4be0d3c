//! Wiring of the pipeline from one [`LoggingConfig`].

use std::sync::Arc;

use flexlog_clock::{quanta::QuantaClock, Clock};
use flexlog_flush::Flush;

use crate::{
    cache::InterceptionDecisionCache,
    config::LoggingConfig,
    error::{Error, ServiceError},
    format::MessageFormatterFactory,
    intercept::MethodLoggingInterceptor,
    processor::{LogEntryProcessor, TargetProcessor},
    queue::BackgroundLog,
    service::BackgroundLoggingService,
};

/// Owns every part of the logging pipeline.
///
/// Built with [`FlexLog::builder`]. Method wrappers obtain their
/// [`MethodLoggingInterceptor`] from [`FlexLog::interceptor`]; the host
/// starts the background service and shuts it down, flushing everything
/// enqueued before shutdown.
///
/// ```rust no_run
/// use flexlog::{config, FlexLog};
/// use flexlog::flush::file_flusher::FileFlusher;
///
/// # fn main() -> flexlog::Result<()> {
/// let host = FlexLog::builder(config())
///     .sink("Console", FileFlusher::new("logs/app.log"))
///     .build()?;
/// host.start()?;
/// // ...
/// host.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct FlexLog {
    config: Arc<LoggingConfig>,
    cache: Arc<InterceptionDecisionCache>,
    background: Option<Background>,
    interceptor: MethodLoggingInterceptor,
    processor: Arc<dyn LogEntryProcessor>,
}

struct Background {
    log: Arc<BackgroundLog>,
    service: BackgroundLoggingService,
}

impl FlexLog {
    pub fn builder(config: LoggingConfig) -> FlexLogBuilder {
        FlexLogBuilder {
            config,
            processor: None,
            sinks: Vec::new(),
            clock: None,
            factory: None,
        }
    }

    /// Starts the background service. Does nothing when background logging
    /// is disabled.
    pub fn start(&self) -> Result<(), ServiceError> {
        match &self.background {
            Some(background) => background.service.start(),
            None => Ok(()),
        }
    }

    /// Stops accepting entries, then stops the service once everything
    /// already enqueued has been processed, and flushes the sinks.
    pub fn shutdown(&self) -> Result<(), Error> {
        let stopped = match &self.background {
            Some(background) => {
                background.log.dispose();
                background.service.stop()
            }
            None => Ok(()),
        };
        let flushed = self.processor.flush();

        stopped?;
        flushed?;
        Ok(())
    }

    pub fn interceptor(&self) -> MethodLoggingInterceptor {
        self.interceptor.clone()
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    pub fn cache(&self) -> &InterceptionDecisionCache {
        &self.cache
    }

    /// `None` when background logging is disabled.
    pub fn background_log(&self) -> Option<&Arc<BackgroundLog>> {
        self.background.as_ref().map(|b| &b.log)
    }

    /// `None` when background logging is disabled.
    pub fn service(&self) -> Option<&BackgroundLoggingService> {
        self.background.as_ref().map(|b| &b.service)
    }
}

/// Builder for [`FlexLog`].
pub struct FlexLogBuilder {
    config: LoggingConfig,
    processor: Option<Arc<dyn LogEntryProcessor>>,
    sinks: Vec<(String, Box<dyn Flush>)>,
    clock: Option<Arc<dyn Clock>>,
    factory: Option<MessageFormatterFactory>,
}

impl FlexLogBuilder {
    /// Replaces the default [`TargetProcessor`].
    pub fn processor<P: LogEntryProcessor + 'static>(self, processor: P) -> Self {
        Self {
            processor: Some(Arc::new(processor)),
            ..self
        }
    }

    /// Binds a sink to a target of the default processor.
    pub fn sink<F: Flush + 'static>(mut self, target: impl Into<String>, flusher: F) -> Self {
        self.sinks.push((target.into(), Box::new(flusher)));
        self
    }

    pub fn clock<C: Clock + 'static>(self, clock: C) -> Self {
        Self {
            clock: Some(Arc::new(clock)),
            ..self
        }
    }

    /// Formatters of the default processor.
    pub fn formatters(self, factory: MessageFormatterFactory) -> Self {
        Self {
            factory: Some(factory),
            ..self
        }
    }

    pub fn build(self) -> Result<FlexLog, Error> {
        self.config.validate()?;
        let config = Arc::new(self.config);

        let processor = match self.processor {
            Some(processor) => {
                if !self.sinks.is_empty() || self.factory.is_some() {
                    tracing::warn!("custom processor set, ignoring configured sinks and formatters");
                }
                processor
            }
            None => {
                let mut processor = TargetProcessor::new(config.clone());
                if let Some(factory) = self.factory {
                    processor = processor.with_factory(factory);
                }
                for (name, flusher) in self.sinks {
                    processor = processor.with_sink(name, flusher);
                }
                Arc::new(processor)
            }
        };

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(QuantaClock::new()));
        let cache = Arc::new(InterceptionDecisionCache::new(&config));

        let (background, interceptor) = if config.enable_background_logging {
            let log = Arc::new(BackgroundLog::new(config.queue_capacity)?);
            let service = BackgroundLoggingService::new(log.clone(), processor.clone(), &config);
            let interceptor = MethodLoggingInterceptor::new(
                cache.clone(),
                log.clone(),
                clock,
                config.max_serialized_length,
            );
            (Some(Background { log, service }), interceptor)
        } else {
            let interceptor = MethodLoggingInterceptor::direct(
                cache.clone(),
                processor.clone(),
                clock,
                config.max_serialized_length,
            );
            (None, interceptor)
        };

        Ok(FlexLog {
            config,
            cache,
            background,
            interceptor,
            processor,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{entry::LogEntry, error::ConfigError, level::Level};

    #[test]
    fn invalid_config_rejected() {
        let err = FlexLog::builder(LoggingConfig::default().with_queue_capacity(0))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(ConfigError::ZeroQueueCapacity)));
    }

    /// Holds lines until `flush_all`.
    #[derive(Clone, Default)]
    struct Buffered {
        pending: Vec<String>,
        written: Arc<Mutex<Vec<String>>>,
    }

    impl Flush for Buffered {
        fn flush_one(&mut self, display: String) -> std::io::Result<()> {
            self.pending.push(display);
            Ok(())
        }

        fn flush_all(&mut self) -> std::io::Result<()> {
            self.written.lock().unwrap().append(&mut self.pending);
            Ok(())
        }
    }

    #[test]
    fn shutdown_flushes_buffered_sinks() {
        let sink = Buffered::default();
        let written = sink.written.clone();
        let host = FlexLog::builder(LoggingConfig::default())
            .sink("Console", sink)
            .build()
            .unwrap();
        host.start().unwrap();

        let log = host.background_log().unwrap();
        for method in ["a", "b", "c"] {
            log.try_enqueue(LogEntry::create_start("T", method, Level::Information));
        }
        host.shutdown().unwrap();

        assert_eq!(written.lock().unwrap().len(), 3);
    }

    #[test]
    fn direct_mode_has_no_service() {
        let host = FlexLog::builder(LoggingConfig::default().with_background_logging(false))
            .build()
            .unwrap();
        assert!(host.service().is_none());
        assert!(host.background_log().is_none());
        host.start().unwrap();
        host.shutdown().unwrap();
    }
}
