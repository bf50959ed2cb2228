//! Turns an expansion result into compiler output.
//!
//! Stable Rust has no warning API for procedural macros, so warnings are
//! emitted as a use of a deprecated constant spanned at the finding.
//! Errors become `compile_error!`.

use codable_synth_core::utils::attributes::{strip_attrs, CODABLE_ATTR, SECURE_ATTR};
use codable_synth_core::{Diagnostic, Expansion, Severity, SynthesisError};
use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned, ToTokens};
use syn::Item;

/// Renders generated items followed by their diagnostics.
pub(crate) fn expansion(expansion: &Expansion) -> TokenStream {
    let mut tokens = expansion.to_token_stream();
    for diagnostic in &expansion.diagnostics {
        tokens.extend(diagnostic_tokens(diagnostic));
    }
    tokens
}

/// Renders a failed expansion: the error, plus the item without helper
/// attributes so the failure does not cascade into unrelated errors.
pub(crate) fn failure(err: &SynthesisError, mut item: Item) -> TokenStream {
    strip_helpers(&mut item);
    let error = err.to_syn_error().to_compile_error();
    quote! {
        #error
        #item
    }
}

/// Renders a failed function-like macro call as a `compile_error!`, which
/// also stands in for the expression.
pub(crate) fn expression_failure(err: &SynthesisError) -> TokenStream {
    err.to_syn_error().to_compile_error()
}

fn diagnostic_tokens(diagnostic: &Diagnostic) -> TokenStream {
    match diagnostic.severity {
        Severity::Error => syn::Error::new(diagnostic.span, diagnostic.note()).to_compile_error(),
        Severity::Warning => {
            let note = diagnostic.note();
            let name = format_ident!(
                "{}",
                diagnostic.name.replace('-', "_"),
                span = diagnostic.span
            );
            quote_spanned! {diagnostic.span=>
                const _: () = {
                    #[deprecated(note = #note)]
                    #[allow(non_upper_case_globals)]
                    const #name: () = ();
                    let _ = #name;
                };
            }
        }
        Severity::Info => TokenStream::new(),
    }
}

fn strip_helpers(item: &mut Item) {
    match item {
        Item::Struct(item_struct) => {
            for field in &mut item_struct.fields {
                strip_attrs(&mut field.attrs, &[CODABLE_ATTR, SECURE_ATTR]);
            }
        }
        Item::Mod(module) => {
            if let Some((_, body)) = module.content.as_mut() {
                body.iter_mut().for_each(strip_helpers);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proc_macro2::Span;
    use syn::parse_quote;

    #[test]
    fn warning_becomes_deprecated_use() {
        let diagnostic = Diagnostic::new(
            "CS001",
            "immutable-default",
            Severity::Warning,
            Span::call_site(),
            "never decoded",
        );
        let rendered = diagnostic_tokens(&diagnostic).to_string();
        assert!(rendered.contains("deprecated (note = \"[CS001] never decoded\")"));
        assert!(rendered.contains("const immutable_default : () = ()"));
    }

    #[test]
    fn error_becomes_compile_error() {
        let diagnostic = Diagnostic::new(
            "CS003",
            "unknown-field",
            Severity::Error,
            Span::call_site(),
            "no field",
        );
        let rendered = diagnostic_tokens(&diagnostic).to_string();
        assert!(rendered.contains("compile_error"));
        assert!(rendered.contains("[CS003] no field"));
    }

    #[test]
    fn info_is_silent() {
        let diagnostic = Diagnostic::new("CS000", "note", Severity::Info, Span::call_site(), "x");
        assert!(diagnostic_tokens(&diagnostic).is_empty());
    }

    #[test]
    fn expression_failure_is_a_single_compile_error() {
        let err = SynthesisError::invalid_attribute(Span::call_site(), "bad literal");
        let rendered = expression_failure(&err);
        let expr: syn::Expr = syn::parse2(rendered).expect("a compile_error! call is an expression");
        assert!(matches!(expr, syn::Expr::Macro(_)));
    }

    #[test]
    fn failure_strips_helper_attributes() {
        let err = SynthesisError::invalid_attribute(Span::call_site(), "bad");
        let item: Item = parse_quote! {
            mod session {
                struct Session {
                    #[codable(skip)]
                    #[secure("token")]
                    #[doc = "kept"]
                    token: Option<String>,
                }
            }
        };
        let rendered = failure(&err, item).to_string();
        assert!(rendered.contains("compile_error"));
        assert!(!rendered.contains("codable (skip)"));
        assert!(!rendered.contains("secure"));
        assert!(rendered.contains("doc = \"kept\""));
    }
}
