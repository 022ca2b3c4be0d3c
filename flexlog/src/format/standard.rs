use super::{template, FormattedMessage, FormattingContext, MessageFormatter};

/// Built-in templates only. Never fails, which is why it is the last resort
/// of the factory.
pub struct StandardStructuredFormatter;

impl MessageFormatter for StandardStructuredFormatter {
    fn format(&self, ctx: &FormattingContext<'_>) -> FormattedMessage {
        let entry = ctx.entry();
        FormattedMessage::Success(template::render(
            template::default_template(entry),
            entry,
            ctx.target_name(),
        ))
    }
}

/// The entry's named template when it is configured, the built-in template
/// otherwise.
pub struct SimpleTemplateFormatter;

impl MessageFormatter for SimpleTemplateFormatter {
    fn format(&self, ctx: &FormattingContext<'_>) -> FormattedMessage {
        let entry = ctx.entry();
        let selected = ctx
            .configured_template()
            .unwrap_or_else(|| template::default_template(entry));

        FormattedMessage::Success(template::render(selected, entry, ctx.target_name()))
    }
}

/// The entry's named template. Fails when the entry names no template or the
/// template is missing or disabled.
pub struct CustomTemplateFormatter;

impl MessageFormatter for CustomTemplateFormatter {
    fn format(&self, ctx: &FormattingContext<'_>) -> FormattedMessage {
        let entry = ctx.entry();
        let Some(name) = entry.template_name() else {
            return FormattedMessage::failure("no template name on entry");
        };

        match ctx.configured_template() {
            Some(selected) => {
                FormattedMessage::Success(template::render(selected, entry, ctx.target_name()))
            }
            None => FormattedMessage::failure(format!(
                "template {} is not configured or disabled",
                name
            )),
        }
    }
}
