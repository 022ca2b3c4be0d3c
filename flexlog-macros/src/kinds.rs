use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};

// Mirrors of flexlog's `Level`, `FormatterType` and `AttributeKind`,
// re-defined here since a proc-macro crate cannot depend on flexlog.

#[derive(Clone, Copy)]
pub(crate) enum Level {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
    None,
}

impl Level {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let level = match s.to_ascii_lowercase().as_str() {
            "trace" | "trc" => Self::Trace,
            "debug" | "dbg" => Self::Debug,
            "information" | "info" | "inf" => Self::Information,
            "warning" | "warn" | "wrn" => Self::Warning,
            "error" | "err" => Self::Error,
            "critical" | "crit" | "crt" => Self::Critical,
            "none" => Self::None,
            _ => return None,
        };
        Some(level)
    }
}

impl ToTokens for Level {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let tok = match self {
            Self::Trace => quote! { ::flexlog::level::Level::Trace },
            Self::Debug => quote! { ::flexlog::level::Level::Debug },
            Self::Information => quote! { ::flexlog::level::Level::Information },
            Self::Warning => quote! { ::flexlog::level::Level::Warning },
            Self::Error => quote! { ::flexlog::level::Level::Error },
            Self::Critical => quote! { ::flexlog::level::Level::Critical },
            Self::None => quote! { ::flexlog::level::Level::None },
        };

        tokens.extend(tok);
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Formatter {
    StandardStructured,
    Json,
    SimpleTemplate,
    Hybrid,
    CustomTemplate,
}

impl Formatter {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let formatter = match s {
            "StandardStructured" => Self::StandardStructured,
            "Json" => Self::Json,
            "SimpleTemplate" => Self::SimpleTemplate,
            "Hybrid" => Self::Hybrid,
            "CustomTemplate" => Self::CustomTemplate,
            _ => return None,
        };
        Some(formatter)
    }
}

impl ToTokens for Formatter {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let tok = match self {
            Self::StandardStructured => quote! { ::flexlog::format::FormatterType::StandardStructured },
            Self::Json => quote! { ::flexlog::format::FormatterType::Json },
            Self::SimpleTemplate => quote! { ::flexlog::format::FormatterType::SimpleTemplate },
            Self::Hybrid => quote! { ::flexlog::format::FormatterType::Hybrid },
            Self::CustomTemplate => quote! { ::flexlog::format::FormatterType::CustomTemplate },
        };

        tokens.extend(tok);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    NoLog,
    NoAutoLog,
    LogInput,
    LogOutput,
    LogBoth,
}

impl Kind {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let kind = match s {
            "no_log" => Self::NoLog,
            "no_auto_log" => Self::NoAutoLog,
            "log_input" => Self::LogInput,
            "log_output" => Self::LogOutput,
            "log_both" => Self::LogBoth,
            _ => return None,
        };
        Some(kind)
    }

    pub(crate) fn is_exclusion(&self) -> bool {
        matches!(self, Self::NoLog | Self::NoAutoLog)
    }
}

impl ToTokens for Kind {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let tok = match self {
            Self::NoLog => quote! { ::flexlog::registry::LogAttribute::no_log() },
            Self::NoAutoLog => quote! { ::flexlog::registry::LogAttribute::no_auto_log() },
            Self::LogInput => quote! { ::flexlog::registry::LogAttribute::log_input() },
            Self::LogOutput => quote! { ::flexlog::registry::LogAttribute::log_output() },
            Self::LogBoth => quote! { ::flexlog::registry::LogAttribute::log_both() },
        };

        tokens.extend(tok);
    }
}
