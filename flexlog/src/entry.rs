//! One record per intercepted invocation.

use std::{
    backtrace::{Backtrace, BacktraceStatus},
    thread,
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{format::FormatterType, level::Level};

/// Immutable record of a method invocation.
///
/// Built with [`LogEntry::create_start`] and refined through the consuming
/// `with_*` derivations. Once handed to the queue an entry is never changed.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogEntry {
    id: String,
    activity_id: Option<String>,
    method_name: String,
    type_name: String,
    level: Level,
    timestamp: DateTime<Utc>,
    #[serde(serialize_with = "serialize_duration_ms")]
    duration: Option<Duration>,
    thread_id: String,
    success: Option<bool>,
    exception_type: Option<String>,
    exception_message: Option<String>,
    stack_trace: Option<String>,
    input_parameters: Option<Vec<InputParameter>>,
    output_value: Option<Value>,
    formatter: Option<FormatterType>,
    target: Option<String>,
    template_name: Option<String>,
}

impl LogEntry {
    /// Entry for an invocation that has just started.
    ///
    /// Gets a fresh id, the current span as activity id, the calling
    /// thread and the current time.
    pub fn create_start(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        level: Level,
    ) -> Self {
        let activity_id = tracing::Span::current()
            .id()
            .map(|id| id.into_u64().to_string());

        Self {
            id: Uuid::new_v4().to_string(),
            activity_id,
            method_name: method_name.into(),
            type_name: type_name.into(),
            level,
            timestamp: Utc::now(),
            duration: None,
            thread_id: format!("{:?}", thread::current().id()),
            success: None,
            exception_type: None,
            exception_message: None,
            stack_trace: None,
            input_parameters: None,
            output_value: None,
            formatter: None,
            target: None,
            template_name: None,
        }
    }

    /// Marks the invocation finished. A failed invocation carries its
    /// exception details.
    pub fn with_completion(
        self,
        success: bool,
        duration: Duration,
        exception: Option<ExceptionInfo>,
    ) -> Self {
        let (exception_type, exception_message, stack_trace) = match exception {
            Some(info) => (Some(info.type_name), Some(info.message), info.stack_trace),
            None => (None, None, None),
        };

        Self {
            success: Some(success),
            duration: Some(duration),
            exception_type,
            exception_message,
            stack_trace,
            ..self
        }
    }

    pub fn with_input(self, input_parameters: Vec<InputParameter>) -> Self {
        Self {
            input_parameters: Some(input_parameters),
            ..self
        }
    }

    pub fn with_output(self, output_value: Value) -> Self {
        Self {
            output_value: Some(output_value),
            ..self
        }
    }

    pub fn with_formatter(self, formatter: FormatterType) -> Self {
        Self {
            formatter: Some(formatter),
            ..self
        }
    }

    pub fn with_target(self, target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..self
        }
    }

    pub fn with_template(self, template_name: impl Into<String>) -> Self {
        Self {
            template_name: Some(template_name.into()),
            ..self
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self
        }
    }

    pub fn with_activity_id(self, activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: Some(activity_id.into()),
            ..self
        }
    }

    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, ..self }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn activity_id(&self) -> Option<&str> {
        self.activity_id.as_deref()
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// `None` until the invocation completes.
    pub fn success(&self) -> Option<bool> {
        self.success
    }

    pub fn exception_type(&self) -> Option<&str> {
        self.exception_type.as_deref()
    }

    pub fn exception_message(&self) -> Option<&str> {
        self.exception_message.as_deref()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    pub fn input_parameters(&self) -> Option<&[InputParameter]> {
        self.input_parameters.as_deref()
    }

    pub fn output_value(&self) -> Option<&Value> {
        self.output_value.as_ref()
    }

    pub fn formatter(&self) -> Option<FormatterType> {
        self.formatter
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }
}

fn serialize_duration_ms<S: serde::Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serializer.serialize_some(&(d.as_nanos() as f64 / 1_000_000.0)),
        None => serializer.serialize_none(),
    }
}

/// A captured argument of an invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputParameter {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_name: String,
    pub value: Value,
}

impl InputParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value,
        }
    }

    /// Captures `value` through its `Serialize` implementation.
    pub fn capture<T: Serialize + ?Sized>(name: &str, value: &T) -> Self {
        Self::new(
            name,
            std::any::type_name::<T>(),
            crate::format::value::capture(value),
        )
    }
}

/// Failure details of an invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    pub stack_trace: Option<String>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: None,
        }
    }

    /// Details of an error value, with a backtrace when backtraces are
    /// enabled for the process (`RUST_BACKTRACE`).
    pub fn from_error<E: std::fmt::Display + ?Sized>(error: &E) -> Self {
        let backtrace = Backtrace::capture();
        let stack_trace = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        Self {
            type_name: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
            stack_trace,
        }
    }

    /// Details of a panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        Self::new("panic", message)
    }
}
