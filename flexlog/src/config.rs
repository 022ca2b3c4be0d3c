//! Logging configuration read by the pipeline.
//!
//! How the document is assembled (files, environment, remote stores) is the
//! host's concern; flexlog only reads a [`LoggingConfig`] value. Keys are
//! PascalCase and durations are given in milliseconds:
//!
//! ```json
//! {
//!   "QueueCapacity": 10000,
//!   "MaxBatchSize": 100,
//!   "BatchTimeout": 1000,
//!   "EnableFallbackFormatting": true,
//!   "Services": {
//!     "my_app::services::*": { "LogInput": true, "LogOutput": true, "Level": "Debug" }
//!   },
//!   "Targets": {
//!     "Console": { "Type": "Console" },
//!     "Audit": { "Type": "File", "Path": "logs/audit.log", "Formatter": "Json" }
//!   }
//! }
//! ```

use std::{path::PathBuf, time::Duration};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, format::FormatterType, level::Level};

pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 10_000;
pub(crate) const DEFAULT_MAX_BATCH_SIZE: usize = 100;
pub(crate) const DEFAULT_MAX_SERIALIZED_LENGTH: usize = 2000;
pub(crate) const DEFAULT_TARGET: &str = "Console";

/// Root configuration of the logging pipeline.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoggingConfig {
    /// Log every registered method (input, at `Information`) unless a more
    /// specific rule says otherwise.
    pub auto_intercept: bool,
    /// Hand entries to the background queue; when off, entries are processed
    /// on the calling thread.
    pub enable_background_logging: bool,
    pub queue_capacity: usize,
    pub max_batch_size: usize,
    #[serde(with = "duration_ms")]
    pub batch_timeout: Duration,
    /// Bounded wait for the advisory batch lock.
    #[serde(with = "duration_ms")]
    pub batch_lock_timeout: Duration,
    /// Bounded wait for the worker on stop/dispose.
    #[serde(with = "duration_ms")]
    pub shutdown_timeout: Duration,
    pub enable_fallback_formatting: bool,
    pub fallback_template: Option<String>,
    pub default_formatter: FormatterType,
    pub default_target: String,
    /// Serialized input/output values above this many characters are
    /// replaced by a truncated preview.
    pub max_serialized_length: usize,
    pub pattern_tie_break: PatternTieBreak,
    /// Type-name glob pattern to settings, in registration order.
    pub services: IndexMap<String, ServiceLogConfig>,
    pub targets: IndexMap<String, TargetConfig>,
    /// Named templates, referenced by entries through `template_name`.
    pub templates: IndexMap<String, TemplateConfig>,
    pub formatters: FormatterSettings,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut targets = IndexMap::new();
        targets.insert(DEFAULT_TARGET.to_string(), TargetConfig::default());

        Self {
            auto_intercept: true,
            enable_background_logging: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            batch_timeout: Duration::from_secs(1),
            batch_lock_timeout: Duration::from_millis(100),
            shutdown_timeout: Duration::from_secs(5),
            enable_fallback_formatting: true,
            fallback_template: None,
            default_formatter: FormatterType::StandardStructured,
            default_target: DEFAULT_TARGET.to_string(),
            max_serialized_length: DEFAULT_MAX_SERIALIZED_LENGTH,
            pattern_tie_break: PatternTieBreak::FirstRegistered,
            services: IndexMap::new(),
            targets,
            templates: IndexMap::new(),
            formatters: FormatterSettings::default(),
        }
    }
}

impl LoggingConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: LoggingConfig = serde_json::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        Ok(())
    }

    /// Settings of the target an entry ends up on.
    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.get(name)
    }

    pub fn with_auto_intercept(self, auto_intercept: bool) -> Self {
        Self {
            auto_intercept,
            ..self
        }
    }

    pub fn with_background_logging(self, enable_background_logging: bool) -> Self {
        Self {
            enable_background_logging,
            ..self
        }
    }

    pub fn with_queue_capacity(self, queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            ..self
        }
    }

    pub fn with_max_batch_size(self, max_batch_size: usize) -> Self {
        Self {
            max_batch_size,
            ..self
        }
    }

    pub fn with_batch_timeout(self, batch_timeout: Duration) -> Self {
        Self {
            batch_timeout,
            ..self
        }
    }

    pub fn with_batch_lock_timeout(self, batch_lock_timeout: Duration) -> Self {
        Self {
            batch_lock_timeout,
            ..self
        }
    }

    pub fn with_shutdown_timeout(self, shutdown_timeout: Duration) -> Self {
        Self {
            shutdown_timeout,
            ..self
        }
    }

    pub fn with_fallback_formatting(self, enable_fallback_formatting: bool) -> Self {
        Self {
            enable_fallback_formatting,
            ..self
        }
    }

    pub fn with_fallback_template(self, template: impl Into<String>) -> Self {
        Self {
            fallback_template: Some(template.into()),
            ..self
        }
    }

    pub fn with_default_formatter(self, default_formatter: FormatterType) -> Self {
        Self {
            default_formatter,
            ..self
        }
    }

    pub fn with_default_target(self, target: impl Into<String>) -> Self {
        Self {
            default_target: target.into(),
            ..self
        }
    }

    pub fn with_max_serialized_length(self, max_serialized_length: usize) -> Self {
        Self {
            max_serialized_length,
            ..self
        }
    }

    pub fn with_pattern_tie_break(self, pattern_tie_break: PatternTieBreak) -> Self {
        Self {
            pattern_tie_break,
            ..self
        }
    }

    /// Adds a service rule. Rules keep the order in which they are added.
    pub fn with_service(mut self, pattern: impl Into<String>, service: ServiceLogConfig) -> Self {
        self.services.insert(pattern.into(), service);
        self
    }

    pub fn with_target(mut self, name: impl Into<String>, target: TargetConfig) -> Self {
        self.targets.insert(name.into(), target);
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, template: TemplateConfig) -> Self {
        self.templates.insert(name.into(), template);
        self
    }
}

/// Starts from the default configuration.
///
/// ```rust
/// use std::time::Duration;
///
/// let config = flexlog::config()
///     .with_queue_capacity(1024)
///     .with_batch_timeout(Duration::from_millis(250));
/// assert!(config.validate().is_ok());
/// ```
#[inline]
pub fn config() -> LoggingConfig {
    LoggingConfig::default()
}

/// How equally specific wildcard service patterns are ranked.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum PatternTieBreak {
    /// The rule registered first wins
    #[default]
    FirstRegistered,
    /// The rule registered last wins
    LastRegistered,
}

/// Logging settings for the types matching a service pattern.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceLogConfig {
    pub log_input: bool,
    pub log_output: bool,
    pub level: Level,
    pub formatter: Option<FormatterType>,
    pub target: Option<String>,
    /// Name of an entry in `Templates`.
    pub template: Option<String>,
    /// Method-name glob patterns excluded from this rule.
    pub exclude_method_patterns: Vec<String>,
}

impl Default for ServiceLogConfig {
    fn default() -> Self {
        Self {
            log_input: false,
            log_output: false,
            level: Level::Information,
            formatter: None,
            target: None,
            template: None,
            exclude_method_patterns: Vec::new(),
        }
    }
}

impl ServiceLogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_input(self, log_input: bool) -> Self {
        Self { log_input, ..self }
    }

    pub fn log_output(self, log_output: bool) -> Self {
        Self { log_output, ..self }
    }

    pub fn level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    pub fn formatter(self, formatter: FormatterType) -> Self {
        Self {
            formatter: Some(formatter),
            ..self
        }
    }

    pub fn target(self, target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..self
        }
    }

    pub fn template(self, template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..self
        }
    }

    pub fn exclude_method(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_method_patterns.push(pattern.into());
        self
    }
}

/// Kind of sink bound to a target when none is supplied programmatically.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum TargetKind {
    #[default]
    Console,
    Stderr,
    File,
    Noop,
}

/// A named logging destination.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct TargetConfig {
    #[serde(rename = "Type")]
    pub kind: TargetKind,
    pub enabled: bool,
    /// Required for `File` targets.
    pub path: Option<PathBuf>,
    pub formatter: Option<FormatterType>,
    pub min_level: Level,
    pub show_timestamp: bool,
    pub show_level: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            kind: TargetKind::Console,
            enabled: true,
            path: None,
            formatter: None,
            min_level: Level::Trace,
            show_timestamp: true,
            show_level: true,
        }
    }
}

impl TargetConfig {
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: TargetKind::File,
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    pub fn formatter(self, formatter: FormatterType) -> Self {
        Self {
            formatter: Some(formatter),
            ..self
        }
    }

    pub fn min_level(self, min_level: Level) -> Self {
        Self { min_level, ..self }
    }

    /// Only the rendered message, without `[timestamp][LVL]` prefixes.
    pub fn message_only(self) -> Self {
        Self {
            show_timestamp: false,
            show_level: false,
            ..self
        }
    }
}

/// A named template. `SuccessTemplate`/`ErrorTemplate` take precedence over
/// `Template` for completed and failed invocations respectively.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct TemplateConfig {
    pub template: Option<String>,
    pub success_template: Option<String>,
    pub error_template: Option<String>,
    pub enabled: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            template: None,
            success_template: None,
            error_template: None,
            enabled: true,
        }
    }
}

impl TemplateConfig {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn success(self, template: impl Into<String>) -> Self {
        Self {
            success_template: Some(template.into()),
            ..self
        }
    }

    pub fn error(self, template: impl Into<String>) -> Self {
        Self {
            error_template: Some(template.into()),
            ..self
        }
    }

    /// Template for an invocation outcome, if this config provides one.
    pub fn select(&self, success: bool) -> Option<&str> {
        if !self.enabled {
            return None;
        }

        let specific = if success {
            self.success_template.as_deref()
        } else {
            self.error_template.as_deref()
        };

        specific.or(self.template.as_deref())
    }
}

/// Per-formatter settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct FormatterSettings {
    pub json: JsonSettings,
    pub hybrid: HybridSettings,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct JsonSettings {
    pub pretty_print: bool,
    pub include_stack_trace: bool,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            pretty_print: false,
            include_stack_trace: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct HybridSettings {
    /// Placed between the message and the JSON metadata.
    pub separator: String,
}

impl Default for HybridSettings {
    fn default() -> Self {
        Self {
            separator: " | ".to_string(),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parses_pascal_case_document() {
        let config = LoggingConfig::from_json_str(
            r#"{
                "AutoIntercept": false,
                "QueueCapacity": 16,
                "MaxBatchSize": 4,
                "BatchTimeout": 250,
                "FallbackTemplate": "{TypeName}.{MethodName}",
                "DefaultFormatter": "Json",
                "Services": {
                    "app::orders::*": { "LogInput": true, "Level": "Debug", "ExcludeMethodPatterns": ["get_*"] },
                    "app::orders::OrderService": { "LogOutput": true }
                },
                "Targets": {
                    "Audit": { "Type": "File", "Path": "logs/audit.log", "MinLevel": "Warning" }
                },
                "Templates": {
                    "Short": { "SuccessTemplate": "ok {MethodName}", "ErrorTemplate": "failed {MethodName}" }
                }
            }"#,
        )
        .unwrap();

        assert!(!config.auto_intercept);
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.batch_timeout, Duration::from_millis(250));
        assert_eq!(config.default_formatter, FormatterType::Json);

        let patterns: Vec<_> = config.services.keys().cloned().collect();
        assert_eq!(patterns, ["app::orders::*", "app::orders::OrderService"]);
        let orders = &config.services["app::orders::*"];
        assert!(orders.log_input && !orders.log_output);
        assert_eq!(orders.level, Level::Debug);
        assert_eq!(orders.exclude_method_patterns, ["get_*"]);

        let audit = config.target("Audit").unwrap();
        assert_eq!(audit.kind, TargetKind::File);
        assert_eq!(audit.min_level, Level::Warning);

        let short = &config.templates["Short"];
        assert_eq!(short.select(true), Some("ok {MethodName}"));
        assert_eq!(short.select(false), Some("failed {MethodName}"));
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = LoggingConfig::from_json_str(r#"{ "QueueCapacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroQueueCapacity));

        let err = config().with_max_batch_size(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroBatchSize));
    }

    #[test]
    fn disabled_template_selects_nothing() {
        let template = TemplateConfig {
            enabled: false,
            ..TemplateConfig::new("{MethodName}")
        };
        assert_eq!(template.select(true), None);
    }
}
