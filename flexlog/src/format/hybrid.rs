use serde_json::{json, Map, Value};

use super::{template, FormattedMessage, FormattingContext, MessageFormatter};

/// Template message followed by JSON metadata, separated by the configured
/// `Hybrid.Separator`:
///
/// ```text
/// Method app::Orders.place completed in 1.50ms | {"Id":"...","ThreadId":"ThreadId(3)","Level":"Information","Target":"Console"}
/// ```
pub struct HybridFormatter;

impl MessageFormatter for HybridFormatter {
    fn format(&self, ctx: &FormattingContext<'_>) -> FormattedMessage {
        let entry = ctx.entry();
        let selected = ctx
            .configured_template()
            .unwrap_or_else(|| template::default_template(entry));
        let message = template::render(selected, entry, ctx.target_name());

        let mut metadata = Map::new();
        metadata.insert("Id".to_string(), json!(entry.id()));
        if let Some(activity_id) = entry.activity_id() {
            metadata.insert("ActivityId".to_string(), json!(activity_id));
        }
        metadata.insert("ThreadId".to_string(), json!(entry.thread_id()));
        metadata.insert("Level".to_string(), json!(entry.level().as_str()));
        metadata.insert("Target".to_string(), json!(ctx.target_name()));
        if let Some(input) = entry.input_parameters() {
            let params: Map<String, Value> = input
                .iter()
                .map(|p| (p.name.clone(), p.value.clone()))
                .collect();
            metadata.insert("InputParameters".to_string(), Value::Object(params));
        }
        if let Some(output) = entry.output_value() {
            metadata.insert("OutputValue".to_string(), output.clone());
        }

        match serde_json::to_string(&Value::Object(metadata)) {
            Ok(metadata) => FormattedMessage::Success(format!(
                "{}{}{}",
                message,
                ctx.config().formatters.hybrid.separator,
                metadata
            )),
            Err(e) => FormattedMessage::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{config::LoggingConfig, entry::LogEntry, level::Level};

    #[test]
    fn message_then_metadata() {
        let config = LoggingConfig::default();
        let entry = LogEntry::create_start("T", "M", Level::Information)
            .with_id("abc")
            .with_output(json!([1, 2]))
            .with_completion(true, Duration::from_millis(2), None);

        let FormattedMessage::Success(message) =
            HybridFormatter.format(&FormattingContext::new(&entry, &config))
        else {
            panic!("hybrid formatting failed");
        };
        let (text, metadata) = message.split_once(" | ").unwrap();
        assert_eq!(text, "Method T.M completed in 2.00ms returning [1,2]");

        let metadata: Value = serde_json::from_str(metadata).unwrap();
        assert_eq!(metadata["Id"], json!("abc"));
        assert_eq!(metadata["Target"], json!("Console"));
        assert_eq!(metadata["OutputValue"], json!([1, 2]));
    }
}
