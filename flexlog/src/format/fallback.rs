use super::{template, FormattingContext};

/// Renders the fallback message for an entry whose formatter failed.
///
/// A configured `FallbackTemplate` is used for every outcome; otherwise the
/// built-in fallback success template (duration, input, output) or failure
/// template (duration only) is used.
pub fn render_fallback(ctx: &FormattingContext<'_>) -> String {
    let entry = ctx.entry();
    let fallback = match ctx.config().fallback_template.as_deref() {
        Some(configured) => configured,
        None if entry.success() == Some(false) => template::FALLBACK_FAILURE_TEMPLATE,
        None => template::FALLBACK_SUCCESS_TEMPLATE,
    };

    template::render(fallback, entry, ctx.target_name())
}
