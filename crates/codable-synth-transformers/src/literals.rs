//! `base64_encoded!` and `checked_url!`.
//!
//! Both take a single string literal and do their work at expansion time:
//! one stores the literal base64-encoded, the other rejects malformed URLs
//! before the program ever runs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use codable_synth_core::{ExpansionContext, ExpressionTransformer, SynthesisError};
use proc_macro2::TokenStream;
use syn::spanned::Spanned;
use syn::{parse_quote, Expr, LitStr};
use tracing::debug;
use url::Url;

fn string_literal(name: &str, input: TokenStream) -> Result<LitStr, SynthesisError> {
    let span = input.span();
    syn::parse2::<LitStr>(input).map_err(|_| {
        SynthesisError::invalid_attribute(span, format!("`{name}!` requires a string literal"))
    })
}

/// Stores a string literal base64-encoded and decodes it at run time.
///
/// `base64_encoded!("food")` expands to
/// `::codable_synth::base64_decoded("Zm9vZA==")`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Encoded;

impl Base64Encoded {
    /// Creates the transformer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionTransformer for Base64Encoded {
    fn name(&self) -> &'static str {
        "base64_encoded"
    }

    fn description(&self) -> &'static str {
        "Embeds a string literal base64-encoded and decodes it at run time"
    }

    fn expand(&self, input: TokenStream, ctx: &ExpansionContext) -> Result<Expr, SynthesisError> {
        let literal = string_literal(self.name(), input)?;
        let encoded = LitStr::new(&STANDARD.encode(literal.value()), literal.span());
        debug!("encoded a {}-byte literal", literal.value().len());

        let crate_path = &ctx.crate_path;
        Ok(parse_quote!(#crate_path::base64_decoded(#encoded)))
    }
}

/// Validates a URL literal at expansion time.
///
/// `checked_url!("https://example.com")` expands to an expression of type
/// `url::Url`; a malformed literal is a compile error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckedUrl;

impl CheckedUrl {
    /// Creates the transformer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionTransformer for CheckedUrl {
    fn name(&self) -> &'static str {
        "checked_url"
    }

    fn description(&self) -> &'static str {
        "Parses a URL literal at compile time"
    }

    fn expand(&self, input: TokenStream, ctx: &ExpansionContext) -> Result<Expr, SynthesisError> {
        let literal = string_literal(self.name(), input)?;
        let text = literal.value();
        if let Err(err) = Url::parse(&text) {
            return Err(SynthesisError::invalid_attribute(
                literal.span(),
                format!("malformed URL `{text}`: {err}"),
            ));
        }

        let crate_path = &ctx.crate_path;
        Ok(parse_quote! {
            match #crate_path::__private::Url::parse(#literal) {
                ::core::result::Result::Ok(url) => url,
                ::core::result::Result::Err(err) => {
                    ::core::panic!("URL checked at compile time failed to parse: {}", err)
                }
            }
        })
    }
}
