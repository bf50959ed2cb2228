//! Transformer trait implemented by every attribute macro.

use crate::context::ExpansionContext;
use crate::error::SynthesisError;
use crate::types::Diagnostic;
use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt};
use syn::{Expr, Item};

/// A source-to-source transformation applied to one annotated item.
///
/// # Example
///
/// ```ignore
/// use codable_synth_core::{Expansion, ExpansionContext, SynthesisError, Transformer};
///
/// pub struct Passthrough;
///
/// impl Transformer for Passthrough {
///     fn name(&self) -> &'static str { "passthrough" }
///
///     fn expand(
///         &self,
///         _args: TokenStream,
///         item: syn::Item,
///         _ctx: &ExpansionContext,
///     ) -> Result<Expansion, SynthesisError> {
///         Ok(Expansion::new(vec![item]))
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Returns the attribute name this transformer is registered under.
    fn name(&self) -> &'static str;

    /// Returns a brief description of the transformation.
    fn description(&self) -> &'static str {
        ""
    }

    /// Expands one annotated item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item or the arguments are not accepted.
    /// The error is fatal to this expansion only.
    fn expand(
        &self,
        args: TokenStream,
        item: Item,
        ctx: &ExpansionContext,
    ) -> Result<Expansion, SynthesisError>;
}

/// Type alias for boxed Transformer trait objects.
pub type TransformerBox = Box<dyn Transformer>;

/// A function-like macro that turns its input into one expression.
pub trait ExpressionTransformer: Send + Sync {
    /// Returns the macro name this transformer is registered under.
    fn name(&self) -> &'static str;

    /// Returns a brief description of the transformation.
    fn description(&self) -> &'static str {
        ""
    }

    /// Expands the macro input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not accepted.
    fn expand(&self, input: TokenStream, ctx: &ExpansionContext) -> Result<Expr, SynthesisError>;
}

/// Type alias for boxed ExpressionTransformer trait objects.
pub type ExpressionTransformerBox = Box<dyn ExpressionTransformer>;

/// Generated declarations plus the diagnostics raised while producing them.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Items to put back into the compilation unit, in order.
    pub items: Vec<Item>,
    /// Diagnostics to report for this expansion.
    pub diagnostics: Vec<Diagnostic>,
}

impl Expansion {
    /// Creates an expansion without diagnostics.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            diagnostics: Vec::new(),
        }
    }

    /// Adds diagnostics to the expansion.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics.extend(diagnostics);
        self
    }

    /// Returns true if any diagnostic fails the expansion.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

impl ToTokens for Expansion {
    /// Emits the items only; diagnostics are rendered by the caller.
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append_all(&self.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use proc_macro2::Span;
    use quote::quote;
    use syn::parse_quote;

    struct Passthrough;

    impl Transformer for Passthrough {
        fn name(&self) -> &'static str {
            "passthrough"
        }

        fn expand(
            &self,
            _args: TokenStream,
            item: Item,
            _ctx: &ExpansionContext,
        ) -> Result<Expansion, SynthesisError> {
            Ok(Expansion::new(vec![item]))
        }
    }

    #[test]
    fn test_expansion_tokens() {
        let transformer: TransformerBox = Box::new(Passthrough);
        let expansion = transformer
            .expand(
                TokenStream::new(),
                parse_quote!(struct A { x: u8 }),
                &ExpansionContext::default(),
            )
            .expect("passthrough never fails");
        assert_eq!(
            expansion.to_token_stream().to_string(),
            quote!(struct A { x: u8 }).to_string()
        );
        assert_eq!(transformer.description(), "");
    }

    struct Unit;

    impl ExpressionTransformer for Unit {
        fn name(&self) -> &'static str {
            "unit"
        }

        fn expand(
            &self,
            input: TokenStream,
            _ctx: &ExpansionContext,
        ) -> Result<Expr, SynthesisError> {
            if input.is_empty() {
                Ok(parse_quote!(()))
            } else {
                Err(SynthesisError::invalid_attribute(
                    Span::call_site(),
                    "`unit!` takes no input",
                ))
            }
        }
    }

    #[test]
    fn test_expression_transformer() {
        let transformer: ExpressionTransformerBox = Box::new(Unit);
        let ctx = ExpansionContext::default();
        let expr = transformer
            .expand(TokenStream::new(), &ctx)
            .expect("empty input is accepted");
        assert_eq!(expr.to_token_stream().to_string(), "()");
        assert!(transformer.expand(quote!(1), &ctx).is_err());
        assert_eq!(transformer.description(), "");
    }

    #[test]
    fn test_has_errors() {
        let warning = Diagnostic::new("CS001", "a", Severity::Warning, Span::call_site(), "w");
        let error = Diagnostic::new("CS003", "b", Severity::Error, Span::call_site(), "e");

        let expansion = Expansion::default().with_diagnostics(vec![warning]);
        assert!(!expansion.has_errors());

        let expansion = expansion.with_diagnostics(vec![error]);
        assert!(expansion.has_errors());
        assert_eq!(expansion.diagnostics.len(), 2);
    }
}
