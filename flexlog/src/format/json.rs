use serde_json::Value;

use super::{template, FormattedMessage, FormattingContext, MessageFormatter};

/// Formats the whole entry as a JSON object.
///
/// Keys follow the entry's PascalCase field names, with the rendered
/// built-in message under `Message` and the resolved target under `Target`:
///
/// ```json
/// {"Id":"...","MethodName":"place","TypeName":"app::Orders","Level":"Information","Duration":1.5,"Success":true,...,"Message":"Method app::Orders.place completed in 1.50ms"}
/// ```
pub struct JsonFormatter;

impl MessageFormatter for JsonFormatter {
    fn format(&self, ctx: &FormattingContext<'_>) -> FormattedMessage {
        let entry = ctx.entry();
        let settings = &ctx.config().formatters.json;

        let mut object = match serde_json::to_value(entry) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return FormattedMessage::failure("entry did not serialize to an object"),
            Err(e) => return FormattedMessage::failure(e.to_string()),
        };

        if !settings.include_stack_trace {
            object.remove("StackTrace");
        }
        object.insert(
            "Target".to_string(),
            Value::String(ctx.target_name().to_string()),
        );
        object.insert(
            "Message".to_string(),
            Value::String(template::render(
                template::default_template(entry),
                entry,
                ctx.target_name(),
            )),
        );

        let value = Value::Object(object);
        let rendered = if settings.pretty_print {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };

        match rendered {
            Ok(message) => FormattedMessage::Success(message),
            Err(e) => FormattedMessage::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{
        config::LoggingConfig,
        entry::{ExceptionInfo, InputParameter, LogEntry},
        level::Level,
    };

    fn parse(message: FormattedMessage) -> Value {
        match message {
            FormattedMessage::Success(s) => serde_json::from_str(&s).unwrap(),
            FormattedMessage::Failure(reason) => panic!("formatting failed: {}", reason),
        }
    }

    #[test]
    fn entry_fields_as_object() {
        let config = LoggingConfig::default();
        let entry = LogEntry::create_start("T", "M", Level::Debug)
            .with_id("abc")
            .with_input(vec![InputParameter::capture("n", &5)])
            .with_completion(true, Duration::from_millis(3), None);

        let value = parse(JsonFormatter.format(&FormattingContext::new(&entry, &config)));
        assert_eq!(value["Id"], json!("abc"));
        assert_eq!(value["Level"], json!("Debug"));
        assert_eq!(value["Success"], json!(true));
        assert_eq!(value["Duration"], json!(3.0));
        assert_eq!(value["InputParameters"][0]["Name"], json!("n"));
        assert_eq!(value["InputParameters"][0]["Type"], json!("i32"));
        assert_eq!(value["Target"], json!("Console"));
        assert_eq!(value["Message"], json!("Method T.M called with {\"n\":5} completed in 3.00ms"));
    }

    #[test]
    fn stack_trace_can_be_left_out() {
        let mut config = LoggingConfig::default();
        config.formatters.json.include_stack_trace = false;
        let entry = LogEntry::create_start("T", "M", Level::Error).with_completion(
            false,
            Duration::ZERO,
            Some(ExceptionInfo {
                stack_trace: Some("at T.M".to_string()),
                ..ExceptionInfo::new("E", "bad")
            }),
        );

        let value = parse(JsonFormatter.format(&FormattingContext::new(&entry, &config)));
        assert!(value.get("StackTrace").is_none());
        assert_eq!(value["ExceptionMessage"], json!("bad"));
    }
}
