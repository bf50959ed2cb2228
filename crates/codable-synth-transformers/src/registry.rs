//! Registration table of the built-in transformers.

use crate::{Base64Encoded, CheckedUrl, Codable, CodingKeys, SecureStorage};
use codable_synth_core::{
    Expansion, ExpansionContext, ExpressionTransformer, ExpressionTransformerBox, SynthesisError,
    Transformer, TransformerBox,
};
use proc_macro2::{Span, TokenStream};
use std::sync::OnceLock;
use syn::{Expr, Item};

/// Name-to-transformer table.
///
/// The built-in table is created on first use and is read-only afterwards.
pub struct Registry {
    transformers: Vec<TransformerBox>,
    expressions: Vec<ExpressionTransformerBox>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("transformers", &self.names())
            .field("expressions", &self.expression_names())
            .finish()
    }
}

impl Registry {
    /// Creates a registry from a list of transformers.
    #[must_use]
    pub fn new(transformers: Vec<TransformerBox>) -> Self {
        Self {
            transformers,
            expressions: Vec::new(),
        }
    }

    /// Adds function-like macro transformers.
    #[must_use]
    pub fn with_expressions(mut self, expressions: Vec<ExpressionTransformerBox>) -> Self {
        self.expressions.extend(expressions);
        self
    }

    /// Returns the process-wide table of built-in transformers.
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Self::new(builtin_transformers()).with_expressions(builtin_expressions())
        })
    }

    /// Looks up a transformer by attribute name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Transformer> {
        self.transformers
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
    }

    /// Registered attribute names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    /// Expands `item` with the transformer registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such transformer exists or the expansion fails.
    pub fn expand(
        &self,
        name: &str,
        args: TokenStream,
        item: Item,
        ctx: &ExpansionContext,
    ) -> Result<Expansion, SynthesisError> {
        let Some(transformer) = self.get(name) else {
            return Err(SynthesisError::invalid_attribute(
                Span::call_site(),
                format!("no transformer registered as `{name}`"),
            ));
        };
        tracing::debug!("expanding `#[{name}]`");
        transformer.expand(args, item, ctx)
    }

    /// Looks up a function-like macro transformer by name.
    #[must_use]
    pub fn get_expression(&self, name: &str) -> Option<&dyn ExpressionTransformer> {
        self.expressions
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
    }

    /// Registered function-like macro names, in registration order.
    #[must_use]
    pub fn expression_names(&self) -> Vec<&'static str> {
        self.expressions.iter().map(|t| t.name()).collect()
    }

    /// Expands a function-like macro call with the transformer registered
    /// under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such transformer exists or the input is
    /// rejected.
    pub fn expand_expression(
        &self,
        name: &str,
        input: TokenStream,
        ctx: &ExpansionContext,
    ) -> Result<Expr, SynthesisError> {
        let Some(transformer) = self.get_expression(name) else {
            return Err(SynthesisError::invalid_attribute(
                Span::call_site(),
                format!("no transformer registered as `{name}!`"),
            ));
        };
        tracing::debug!("expanding `{name}!`");
        transformer.expand(input, ctx)
    }
}

/// Returns fresh instances of every built-in transformer.
#[must_use]
pub fn builtin_transformers() -> Vec<TransformerBox> {
    vec![
        Box::new(Codable::new()),
        Box::new(Codable::ignore_initialized()),
        Box::new(CodingKeys::new()),
        Box::new(SecureStorage::new()),
    ]
}

/// Returns fresh instances of every built-in function-like macro
/// transformer.
#[must_use]
pub fn builtin_expressions() -> Vec<ExpressionTransformerBox> {
    vec![Box::new(Base64Encoded::new()), Box::new(CheckedUrl::new())]
}
