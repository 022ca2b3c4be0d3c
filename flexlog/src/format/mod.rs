//! Turning a [`LogEntry`] into a message.
//!
//! A [`MessageFormatterFactory`] picks a [`MessageFormatter`] for each entry
//! (entry hint, then the target's configured formatter, then the configured
//! default) and renders it. Formatters never panic on bad input; they return
//! [`FormattedMessage::Failure`], after which the factory either renders the
//! fallback template or reports a [`ProcessError::Formatting`].
//!
//! # Example
//!
//! ```rust
//! use flexlog::{
//!     config,
//!     entry::LogEntry,
//!     format::{FormattingContext, MessageFormatterFactory},
//!     Level,
//! };
//!
//! # fn main() {
//! let config = config();
//! let factory = MessageFormatterFactory::new();
//! let entry = LogEntry::create_start("Orders", "place", Level::Information)
//!     .with_completion(true, std::time::Duration::from_millis(3), None);
//!
//! let message = factory.render(&FormattingContext::new(&entry, &config)).unwrap();
//! assert_eq!(message, "Method Orders.place completed in 3.00ms");
//! # }
//! ```

use std::{collections::HashMap, fmt::Display, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    config::{LoggingConfig, TargetConfig, TemplateConfig},
    entry::LogEntry,
    error::ProcessError,
};

mod fallback;
mod hybrid;
mod json;
mod standard;
pub mod template;
pub mod value;

pub use fallback::render_fallback;
pub use hybrid::HybridFormatter;
pub use json::JsonFormatter;
pub use standard::{CustomTemplateFormatter, SimpleTemplateFormatter, StandardStructuredFormatter};

/// Identifies a formatter, both in configuration and in entry hints.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum FormatterType {
    /// Built-in message templates
    #[default]
    StandardStructured,
    /// The whole entry as a JSON object
    Json,
    /// Named template when configured, built-in otherwise
    SimpleTemplate,
    /// Template message followed by JSON metadata
    Hybrid,
    /// Named template only
    CustomTemplate,
}

const FORMATTER_STRINGS: [&str; 5] = [
    "StandardStructured",
    "Json",
    "SimpleTemplate",
    "Hybrid",
    "CustomTemplate",
];

impl FormatterType {
    pub fn as_str(&self) -> &'static str {
        FORMATTER_STRINGS[*self as usize]
    }
}

impl Display for FormatterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORMATTER_STRINGS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(s.trim()))
            .map(|idx| match idx {
                0 => FormatterType::StandardStructured,
                1 => FormatterType::Json,
                2 => FormatterType::SimpleTemplate,
                3 => FormatterType::Hybrid,
                _ => FormatterType::CustomTemplate,
            })
            .ok_or_else(|| format!("formatter {}: not recognized", s))
    }
}

/// Result of a formatting attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormattedMessage {
    Success(String),
    Failure(String),
}

impl FormattedMessage {
    pub fn failure(reason: impl Into<String>) -> Self {
        FormattedMessage::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FormattedMessage::Success(_))
    }
}

/// An entry together with the configuration it is formatted under.
#[derive(Clone, Copy)]
pub struct FormattingContext<'a> {
    entry: &'a LogEntry,
    config: &'a LoggingConfig,
    target: &'a str,
}

impl<'a> FormattingContext<'a> {
    pub fn new(entry: &'a LogEntry, config: &'a LoggingConfig) -> Self {
        let target = entry.target().unwrap_or(config.default_target.as_str());

        Self {
            entry,
            config,
            target,
        }
    }

    pub fn entry(&self) -> &'a LogEntry {
        self.entry
    }

    pub fn config(&self) -> &'a LoggingConfig {
        self.config
    }

    /// Name of the target the entry is written to.
    pub fn target_name(&self) -> &'a str {
        self.target
    }

    pub fn target_config(&self) -> Option<&'a TargetConfig> {
        self.config.target(self.target)
    }

    /// The template configuration named by the entry, if it exists.
    pub fn named_template(&self) -> Option<&'a TemplateConfig> {
        self.entry
            .template_name()
            .and_then(|name| self.config.templates.get(name))
    }

    /// Configured template text for the entry's outcome.
    pub fn configured_template(&self) -> Option<&'a str> {
        self.named_template()
            .and_then(|template| template.select(self.entry.success() != Some(false)))
    }
}

/// Renders an entry into a message.
///
/// # Example
///
/// ```rust
/// use flexlog::format::{FormattedMessage, FormattingContext, MessageFormatter};
///
/// struct MethodOnly;
///
/// impl MessageFormatter for MethodOnly {
///     fn format(&self, ctx: &FormattingContext<'_>) -> FormattedMessage {
///         FormattedMessage::Success(ctx.entry().method_name().to_string())
///     }
/// }
/// ```
pub trait MessageFormatter: Send + Sync {
    fn format(&self, ctx: &FormattingContext<'_>) -> FormattedMessage;
}

/// Registry of formatters by [`FormatterType`].
pub struct MessageFormatterFactory {
    formatters: HashMap<FormatterType, Arc<dyn MessageFormatter>>,
    standard: Arc<dyn MessageFormatter>,
}

impl Default for MessageFormatterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFormatterFactory {
    /// Factory with every built-in formatter registered.
    pub fn new() -> Self {
        let standard: Arc<dyn MessageFormatter> = Arc::new(StandardStructuredFormatter);
        let mut formatters: HashMap<FormatterType, Arc<dyn MessageFormatter>> = HashMap::new();
        formatters.insert(FormatterType::StandardStructured, standard.clone());
        formatters.insert(FormatterType::Json, Arc::new(JsonFormatter));
        formatters.insert(FormatterType::SimpleTemplate, Arc::new(SimpleTemplateFormatter));
        formatters.insert(FormatterType::Hybrid, Arc::new(HybridFormatter));
        formatters.insert(FormatterType::CustomTemplate, Arc::new(CustomTemplateFormatter));

        Self {
            formatters,
            standard,
        }
    }

    /// Factory with only `StandardStructured` registered.
    pub fn standard_only() -> Self {
        let standard: Arc<dyn MessageFormatter> = Arc::new(StandardStructuredFormatter);
        let mut formatters: HashMap<FormatterType, Arc<dyn MessageFormatter>> = HashMap::new();
        formatters.insert(FormatterType::StandardStructured, standard.clone());

        Self {
            formatters,
            standard,
        }
    }

    /// Registers (or replaces) the formatter for `kind`.
    pub fn with_formatter<F>(mut self, kind: FormatterType, formatter: F) -> Self
    where
        F: MessageFormatter + 'static,
    {
        self.formatters.insert(kind, Arc::new(formatter));
        self
    }

    /// Unregisters `kind`. `StandardStructured` stays available as the last
    /// resort even when removed here.
    pub fn without(mut self, kind: FormatterType) -> Self {
        self.formatters.remove(&kind);
        self
    }

    pub fn is_registered(&self, kind: FormatterType) -> bool {
        self.formatters.contains_key(&kind)
    }

    /// Selects the formatter for an entry.
    ///
    /// Candidates are tried from most to least specific: the entry's
    /// formatter, the target's configured formatter and the configured
    /// default. The flag is `true` when a preferred candidate was not
    /// registered and a less specific one was used instead.
    pub fn get_formatter(&self, ctx: &FormattingContext<'_>) -> (Arc<dyn MessageFormatter>, bool) {
        let candidates = [
            ctx.entry().formatter(),
            ctx.target_config().and_then(|target| target.formatter),
            Some(ctx.config().default_formatter),
        ];

        let mut is_fallback = false;
        for kind in candidates.into_iter().flatten() {
            if let Some(formatter) = self.formatters.get(&kind) {
                if is_fallback {
                    tracing::debug!(
                        formatter = %kind,
                        method = ctx.entry().method_name(),
                        "substituted a less specific formatter"
                    );
                }
                return (formatter.clone(), is_fallback);
            }

            is_fallback = true;
        }

        tracing::debug!(
            method = ctx.entry().method_name(),
            "no configured formatter registered, using StandardStructured"
        );
        (self.standard.clone(), true)
    }

    /// Formats an entry, applying fallback formatting on failure when it is
    /// enabled.
    pub fn render(&self, ctx: &FormattingContext<'_>) -> Result<String, ProcessError> {
        let (formatter, _) = self.get_formatter(ctx);
        match formatter.format(ctx) {
            FormattedMessage::Success(message) => Ok(message),
            FormattedMessage::Failure(reason) => {
                let kind = self.formatter_type(ctx);
                if ctx.config().enable_fallback_formatting {
                    tracing::debug!(
                        formatter = %kind,
                        reason = %reason,
                        "formatter failed, rendering fallback template"
                    );
                    Ok(render_fallback(ctx))
                } else {
                    tracing::error!(formatter = %kind, reason = %reason, "formatter failed");
                    Err(ProcessError::Formatting {
                        formatter: kind,
                        reason,
                    })
                }
            }
        }
    }

    fn formatter_type(&self, ctx: &FormattingContext<'_>) -> FormatterType {
        [
            ctx.entry().formatter(),
            ctx.target_config().and_then(|target| target.formatter),
            Some(ctx.config().default_formatter),
        ]
        .into_iter()
        .flatten()
        .find(|kind| self.formatters.contains_key(kind))
        .unwrap_or(FormatterType::StandardStructured)
    }
}
