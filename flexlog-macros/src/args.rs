use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, ToTokens};
use syn::{spanned::Spanned, Lit, LitStr, Meta, NestedMeta};

use crate::kinds::{Formatter, Kind, Level};

/// One logging attribute, e.g. `log_both, level = "Debug", target = "Audit"`
pub(crate) struct LogArgs {
    pub(crate) kind: Option<Kind>,
    level: Option<Level>,
    formatter: Option<Formatter>,
    target: Option<LitStr>,
    template: Option<LitStr>,
    span: Span,
    first_option: Option<Span>,
}

impl LogArgs {
    /// Parses the comma-separated arguments of `#[loggable(...)]` or
    /// `#[log(...)]`.
    pub(crate) fn parse(args: Vec<NestedMeta>, span: Span) -> syn::Result<Self> {
        let mut parsed = Self {
            kind: None,
            level: None,
            formatter: None,
            target: None,
            template: None,
            span,
            first_option: None,
        };

        for arg in args {
            match arg {
                NestedMeta::Meta(Meta::Path(path)) => {
                    let name = path_name(&path)?;
                    let Some(kind) = Kind::parse(&name) else {
                        return Err(syn::Error::new(
                            path.span(),
                            format!(
                                "unknown logging attribute `{}`, expected one of \
                                 `log_input`, `log_output`, `log_both`, `no_log`, `no_auto_log`",
                                name
                            ),
                        ));
                    };
                    if parsed.kind.replace(kind).is_some() {
                        return Err(syn::Error::new(path.span(), "only one logging kind allowed"));
                    }
                }
                NestedMeta::Meta(Meta::NameValue(nv)) => {
                    let name = path_name(&nv.path)?;
                    parsed.first_option.get_or_insert(nv.path.span());
                    let value = match nv.lit {
                        Lit::Str(value) => value,
                        other => {
                            return Err(syn::Error::new(other.span(), "expected a string literal"))
                        }
                    };
                    match name.as_str() {
                        "level" => {
                            let level = Level::parse(&value.value()).ok_or_else(|| {
                                syn::Error::new(value.span(), "unknown level")
                            })?;
                            parsed.level = Some(level);
                        }
                        "formatter" => {
                            let formatter = Formatter::parse(&value.value()).ok_or_else(|| {
                                syn::Error::new(
                                    value.span(),
                                    "unknown formatter, expected one of `StandardStructured`, \
                                     `Json`, `SimpleTemplate`, `Hybrid`, `CustomTemplate`",
                                )
                            })?;
                            parsed.formatter = Some(formatter);
                        }
                        "target" => parsed.target = Some(value),
                        "template" => parsed.template = Some(value),
                        _ => {
                            return Err(syn::Error::new(
                                nv.path.span(),
                                format!("unknown option `{}`", name),
                            ))
                        }
                    }
                }
                other => return Err(syn::Error::new(other.span(), "unexpected argument")),
            }
        }

        Ok(parsed)
    }

    /// An empty argument list is allowed only on the type, where it just
    /// registers the methods.
    pub(crate) fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.level.is_none()
            && self.formatter.is_none()
            && self.target.is_none()
            && self.template.is_none()
    }

    pub(crate) fn require_kind(&self) -> syn::Result<Kind> {
        self.kind.ok_or_else(|| {
            syn::Error::new(
                self.span,
                "missing logging kind: `log_input`, `log_output`, `log_both`, `no_log` or `no_auto_log`",
            )
        })
    }

    pub(crate) fn check_exclusion(&self) -> syn::Result<()> {
        match (self.kind, self.first_option) {
            (Some(kind), Some(option)) if kind.is_exclusion() => Err(syn::Error::new(
                option,
                "`no_log` and `no_auto_log` take no options",
            )),
            _ => Ok(()),
        }
    }
}

impl ToTokens for LogArgs {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let Some(kind) = self.kind else {
            return;
        };

        let mut attr = kind.into_token_stream();
        if let Some(level) = self.level {
            attr = quote! { #attr.with_level(#level) };
        }
        if let Some(formatter) = self.formatter {
            attr = quote! { #attr.with_formatter(#formatter) };
        }
        if let Some(target) = &self.target {
            attr = quote! { #attr.with_target(#target) };
        }
        if let Some(template) = &self.template {
            attr = quote! { #attr.with_template(#template) };
        }

        tokens.extend(attr);
    }
}

fn path_name(path: &syn::Path) -> syn::Result<String> {
    path.get_ident()
        .map(|ident| ident.to_string())
        .ok_or_else(|| syn::Error::new(path.span(), "expected an identifier"))
}
