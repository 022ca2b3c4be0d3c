use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse_macro_input, spanned::Spanned, AttributeArgs, ImplItem, ItemImpl, Meta, NestedMeta,
    Type,
};

use crate::args::LogArgs;

const METHOD_ATTRIBUTE: &str = "log";

/// Generates a `flexlog::registry::Loggable` implementation from an inherent
/// `impl` block.
///
/// For instance:
/// ```ignore
/// #[loggable(log_input)]
/// impl Orders {
///     #[log(log_both, level = "Debug")]
///     fn place(&self) {}
///
///     fn lookup(&self) {}
/// }
///
/// // Generated code (slightly simplified), next to the unchanged impl block
/// impl flexlog::registry::Loggable for Orders {
///     fn descriptor() -> &'static flexlog::registry::TypeDescriptor {
///         static DESCRIPTOR: flexlog::registry::TypeDescriptor =
///             flexlog::registry::TypeDescriptor::new(
///                 concat!(module_path!(), "::", "Orders"),
///                 &[flexlog::registry::LogAttribute::log_input()],
///                 &[
///                     flexlog::registry::MethodDescriptor::new(
///                         "place",
///                         &[flexlog::registry::LogAttribute::log_both()
///                             .with_level(flexlog::level::Level::Debug)],
///                     ),
///                     flexlog::registry::MethodDescriptor::new("lookup", &[]),
///                 ],
///             );
///         &DESCRIPTOR
///     }
/// }
/// ```
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttributeArgs);
    let mut item = parse_macro_input!(item as ItemImpl);

    match expand_impl(args, &mut item) {
        Ok(descriptor) => quote! {
            #item
            #descriptor
        }
        .into(),
        Err(e) => {
            let e = e.to_compile_error();
            // rustc rejects inherent impls of unnamed types on its own
            if item.trait_.is_none() && type_ident(&item.self_ty).is_err() {
                return e.into();
            }

            // Strip `#[log]` anyway so the only error reported is ours
            let _ = take_method_attributes(&mut item);
            quote! {
                #item
                #e
            }
            .into()
        }
    }
}

fn expand_impl(args: Vec<NestedMeta>, item: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[loggable] must be placed on an inherent impl block",
        ));
    }

    let type_args = LogArgs::parse(args, Span::call_site())?;
    type_args.check_exclusion()?;
    if !type_args.is_empty() {
        type_args.require_kind()?;
    }

    let type_ident = type_ident(&item.self_ty)?;
    let type_name = type_ident.to_string();
    let methods = take_method_attributes(item)?;

    let method_descriptors = methods.iter().map(|(name, attrs)| {
        quote! {
            ::flexlog::registry::MethodDescriptor::new(#name, &[#(#attrs),*])
        }
    });
    let type_attrs = type_args.kind.map(|_| &type_args).into_iter();

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::flexlog::registry::Loggable for #self_ty #where_clause {
            fn descriptor() -> &'static ::flexlog::registry::TypeDescriptor {
                static DESCRIPTOR: ::flexlog::registry::TypeDescriptor =
                    ::flexlog::registry::TypeDescriptor::new(
                        ::std::concat!(::std::module_path!(), "::", #type_name),
                        &[#(#type_attrs),*],
                        &[#(#method_descriptors),*],
                    );
                &DESCRIPTOR
            }
        }
    })
}

/// Removes `#[log(...)]` from every method, returning each method's name and
/// parsed attributes in declaration order.
fn take_method_attributes(item: &mut ItemImpl) -> syn::Result<Vec<(String, Vec<LogArgs>)>> {
    let mut methods = Vec::new();
    let mut first_error: Option<syn::Error> = None;

    for impl_item in &mut item.items {
        let ImplItem::Method(method) = impl_item else {
            continue;
        };

        let mut parsed = Vec::new();
        let mut kept = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            if !attr.path.is_ident(METHOD_ATTRIBUTE) {
                kept.push(attr);
                continue;
            }

            let result = attr.parse_meta().and_then(|meta| match meta {
                Meta::List(list) => {
                    let span = list.span();
                    let args = LogArgs::parse(list.nested.into_iter().collect(), span)?;
                    args.require_kind()?;
                    args.check_exclusion()?;
                    Ok(args)
                }
                other => Err(syn::Error::new(
                    other.span(),
                    "expected `#[log(...)]` with a logging kind",
                )),
            });

            match result {
                Ok(args) => parsed.push(args),
                Err(e) => match &mut first_error {
                    Some(first) => first.combine(e),
                    None => first_error = Some(e),
                },
            }
        }
        method.attrs = kept;

        methods.push((method.sig.ident.to_string(), parsed));
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(methods),
    }
}

fn type_ident(ty: &Type) -> syn::Result<&syn::Ident> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .map(|segment| &segment.ident)
            .ok_or_else(|| syn::Error::new(ty.span(), "expected a type name")),
        _ => Err(syn::Error::new(
            ty.span(),
            "#[loggable] supports impl blocks of named types only",
        )),
    }
}
