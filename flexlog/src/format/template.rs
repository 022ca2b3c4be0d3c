//! Named-placeholder templates.
//!
//! A template is plain text with `{Name}` placeholders. Known placeholders
//! are substituted from the entry (and render as empty text when the entry
//! has no value for them), unknown ones are kept verbatim, and `{{`/`}}`
//! produce literal braces.
//!
//! | placeholder          | value                                          |
//! |----------------------|------------------------------------------------|
//! | `{Id}`               | entry id                                       |
//! | `{ActivityId}`       | correlation id                                 |
//! | `{TypeName}`         | declaring type                                 |
//! | `{MethodName}`       | method                                         |
//! | `{Level}`            | `Information`, `Warning`, ...                  |
//! | `{Duration}`         | milliseconds with two decimals                 |
//! | `{Success}`          | `True` or `False`                              |
//! | `{InputParameters}`  | JSON object of argument name to value          |
//! | `{OutputValue}`      | returned value, strings unquoted               |
//! | `{ExceptionType}`    | error type name                                |
//! | `{ExceptionMessage}` | error message                                  |
//! | `{Timestamp}`        | RFC 3339 UTC timestamp                         |
//! | `{ThreadId}`         | calling thread                                 |
//! | `{Target}`           | target the entry is written to                 |

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use super::value;
use crate::entry::LogEntry;

pub const SUCCESS_TEMPLATE: &str = "Method {TypeName}.{MethodName} completed in {Duration}ms";
pub const SUCCESS_WITH_INPUT_TEMPLATE: &str =
    "Method {TypeName}.{MethodName} called with {InputParameters} completed in {Duration}ms";
pub const SUCCESS_WITH_OUTPUT_TEMPLATE: &str =
    "Method {TypeName}.{MethodName} completed in {Duration}ms returning {OutputValue}";
pub const SUCCESS_WITH_INPUT_OUTPUT_TEMPLATE: &str = "Method {TypeName}.{MethodName} called with {InputParameters} completed in {Duration}ms returning {OutputValue}";
pub const FAILURE_TEMPLATE: &str =
    "Method {TypeName}.{MethodName} failed after {Duration}ms: {ExceptionType} - {ExceptionMessage}";

pub const FALLBACK_SUCCESS_TEMPLATE: &str = "[Fallback] {TypeName}.{MethodName} completed in {Duration}ms | Input: {InputParameters} | Output: {OutputValue}";
pub const FALLBACK_FAILURE_TEMPLATE: &str =
    "[Fallback] {TypeName}.{MethodName} failed after {Duration}ms";

/// Built-in template for the entry's outcome and payload.
pub fn default_template(entry: &LogEntry) -> &'static str {
    if entry.success() == Some(false) {
        return FAILURE_TEMPLATE;
    }

    match (
        entry.input_parameters().is_some(),
        entry.output_value().is_some(),
    ) {
        (false, false) => SUCCESS_TEMPLATE,
        (true, false) => SUCCESS_WITH_INPUT_TEMPLATE,
        (false, true) => SUCCESS_WITH_OUTPUT_TEMPLATE,
        (true, true) => SUCCESS_WITH_INPUT_OUTPUT_TEMPLATE,
    }
}

/// Renders `template` against an entry written to `target`.
pub fn render(template: &str, entry: &LogEntry, target: &str) -> String {
    render_with(template, |name| placeholder(entry, target, name))
}

/// Renders `template`, resolving placeholders through `resolve`. A `None`
/// from `resolve` keeps the placeholder verbatim.
pub fn render_with<F>(template: &str, resolve: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find(['{', '}']) {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
        } else {
            match tail[1..].find('}') {
                // Stray `{`: rescan from the inner one
                Some(end) if tail[1..end + 1].contains('{') => {
                    let inner = tail[1..].find('{').map_or(end + 1, |i| i + 1);
                    out.push_str(&tail[..inner]);
                    rest = &tail[inner..];
                }
                Some(end) => {
                    let name = &tail[1..end + 1];
                    let placeholder = &tail[..end + 2];
                    match is_name(name).then(|| resolve(name)).flatten() {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(placeholder),
                    }
                    rest = &tail[end + 2..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        }
    }
    out.push_str(rest);

    out
}

fn is_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Value of a known placeholder; `None` for unknown names.
pub fn placeholder(entry: &LogEntry, target: &str, name: &str) -> Option<String> {
    let value = match name {
        "Id" => entry.id().to_string(),
        "ActivityId" => entry.activity_id().unwrap_or_default().to_string(),
        "TypeName" => entry.type_name().to_string(),
        "MethodName" => entry.method_name().to_string(),
        "Level" => entry.level().as_str().to_string(),
        "Duration" => entry
            .duration()
            .map(|d| format!("{:.2}", d.as_nanos() as f64 / 1_000_000.0))
            .unwrap_or_default(),
        "Success" => match entry.success() {
            Some(true) => "True".to_string(),
            Some(false) => "False".to_string(),
            None => String::new(),
        },
        "InputParameters" => entry
            .input_parameters()
            .map(|params| {
                let map: Map<String, Value> = params
                    .iter()
                    .map(|p| (p.name.clone(), p.value.clone()))
                    .collect();
                Value::Object(map).to_string()
            })
            .unwrap_or_default(),
        "OutputValue" => entry.output_value().map(value::render).unwrap_or_default(),
        "ExceptionType" => entry.exception_type().unwrap_or_default().to_string(),
        "ExceptionMessage" => entry.exception_message().unwrap_or_default().to_string(),
        "Timestamp" => entry
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        "ThreadId" => entry.thread_id().to_string(),
        "Target" => target.to_string(),
        _ => return None,
    };

    Some(value)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{
        entry::{ExceptionInfo, InputParameter},
        level::Level,
    };

    fn entry() -> LogEntry {
        LogEntry::create_start("T", "M", Level::Warning).with_id("abc")
    }

    #[test]
    fn substitutes_known_placeholders() {
        let entry = entry().with_completion(true, Duration::from_micros(1500), None);
        assert_eq!(
            render("{TypeName}.{MethodName} {Level} {Duration} {Success} {Id} {Target}", &entry, "Console"),
            "T.M Warning 1.50 True abc Console"
        );
    }

    #[test]
    fn unknown_kept_missing_empty() {
        let entry = entry();
        assert_eq!(
            render("[{Unknown}] [{OutputValue}] [{not a name}]", &entry, "Console"),
            "[{Unknown}] [] [{not a name}]"
        );
    }

    #[test]
    fn escaped_and_unbalanced_braces() {
        let entry = entry();
        assert_eq!(render("{{MethodName}} {MethodName}", &entry, "C"), "{MethodName} M");
        assert_eq!(render("a } b {MethodName", &entry, "C"), "a } b {MethodName");
    }

    #[test]
    fn stray_brace_before_placeholder() {
        let entry = entry();
        assert_eq!(render("{a{MethodName}", &entry, "C"), "{aM");
        assert_eq!(render("{ {{TypeName}", &entry, "C"), "{ {TypeName}");
        assert_eq!(render("x{a{b{Level}!", &entry, "C"), "x{a{bWarning!");
    }

    #[test]
    fn input_and_output_rendering() {
        let entry = entry()
            .with_input(vec![
                InputParameter::capture("id", &7),
                InputParameter::capture("name", "x"),
            ])
            .with_output(json!("done"))
            .with_completion(true, Duration::from_millis(2), None);

        assert_eq!(default_template(&entry), SUCCESS_WITH_INPUT_OUTPUT_TEMPLATE);
        assert_eq!(
            render(default_template(&entry), &entry, "C"),
            r#"Method T.M called with {"id":7,"name":"x"} completed in 2.00ms returning done"#
        );
    }

    #[test]
    fn failure_selects_failure_template() {
        let entry = entry()
            .with_input(vec![])
            .with_completion(false, Duration::from_millis(1), Some(ExceptionInfo::new("E", "bad")));

        assert_eq!(default_template(&entry), FAILURE_TEMPLATE);
        assert_eq!(
            render(default_template(&entry), &entry, "C"),
            "Method T.M failed after 1.00ms: E - bad"
        );
    }
}
