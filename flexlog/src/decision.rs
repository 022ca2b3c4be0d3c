//! Per-method logging policy.

use crate::{
    config::ServiceLogConfig,
    format::FormatterType,
    level::Level,
    registry::{AttributeKind, LogAttribute},
};

/// Which phases of an invocation are logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogBehavior {
    InputOnly,
    OutputOnly,
    Both,
    /// Only timing and outcome.
    Neither,
}

impl LogBehavior {
    pub fn from_flags(log_input: bool, log_output: bool) -> Self {
        match (log_input, log_output) {
            (true, true) => LogBehavior::Both,
            (true, false) => LogBehavior::InputOnly,
            (false, true) => LogBehavior::OutputOnly,
            (false, false) => LogBehavior::Neither,
        }
    }

    pub fn logs_input(&self) -> bool {
        matches!(self, LogBehavior::InputOnly | LogBehavior::Both)
    }

    pub fn logs_output(&self) -> bool {
        matches!(self, LogBehavior::OutputOnly | LogBehavior::Both)
    }
}

/// How a method is logged. A method without a `Decision` is not logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub behavior: LogBehavior,
    pub level: Level,
    pub formatter: Option<FormatterType>,
    pub target: Option<String>,
    pub template: Option<String>,
}

impl Decision {
    /// Decision of the automatic interception default: input at `Information`.
    pub fn auto_intercept() -> Self {
        Self {
            behavior: LogBehavior::InputOnly,
            level: Level::Information,
            formatter: None,
            target: None,
            template: None,
        }
    }

    /// Decision from a logging attribute; `None` for exclusion markers.
    pub fn from_attribute(attribute: &LogAttribute) -> Option<Self> {
        let behavior = match attribute.kind {
            AttributeKind::LogInput => LogBehavior::InputOnly,
            AttributeKind::LogOutput => LogBehavior::OutputOnly,
            AttributeKind::LogBoth => LogBehavior::Both,
            AttributeKind::NoLog | AttributeKind::NoAutoLog => return None,
        };

        Self {
            behavior,
            level: attribute.level.unwrap_or_default(),
            formatter: attribute.formatter,
            target: attribute.target.map(str::to_string),
            template: attribute.template.map(str::to_string),
        }
        .enabled()
    }

    pub fn from_service(service: &ServiceLogConfig) -> Option<Self> {
        Self {
            behavior: LogBehavior::from_flags(service.log_input, service.log_output),
            level: service.level,
            formatter: service.formatter,
            target: service.target.clone(),
            template: service.template.clone(),
        }
        .enabled()
    }

    /// A decision at `Level::None` disables logging.
    fn enabled(self) -> Option<Self> {
        (self.level != Level::None).then_some(self)
    }

    pub fn logs_input(&self) -> bool {
        self.behavior.logs_input()
    }

    pub fn logs_output(&self) -> bool {
        self.behavior.logs_output()
    }
}
