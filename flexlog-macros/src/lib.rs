use proc_macro::TokenStream;

mod args;
mod expand;
mod kinds;

use expand::expand;

/// Registers the methods of an inherent `impl` block with flexlog.
///
/// Arguments on the attribute apply to the whole type, `#[log(...)]` on a
/// method applies to that method only. Both accept one kind, `log_input`,
/// `log_output`, `log_both`, `no_log` or `no_auto_log`, followed by optional
/// `level`, `formatter`, `target` and `template` options given as string
/// literals, e.g. `#[log(log_both, level = "Debug", target = "Audit")]`.
///
/// A type can carry one `#[loggable]` impl block.
#[proc_macro_attribute]
pub fn loggable(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item)
}
