//! Errors surfaced by the synthesis stages.

use miette::Diagnostic;
use proc_macro2::Span;
use thiserror::Error;

/// Errors that fail a single expansion.
///
/// Each error is fatal to the declaration it was raised for only; other
/// declarations in the same compilation unit are unaffected.
#[derive(Debug, Error, Diagnostic)]
pub enum SynthesisError {
    /// The declaration is not a simple aggregate record.
    #[error("`{macro_name}` can only be applied to a struct with named fields, found {kind}")]
    #[diagnostic(
        code(codable_synth::unsupported_declaration),
        help("apply the attribute to a `struct` with named fields, or an inline `mod` containing exactly one")
    )]
    UnsupportedDeclaration {
        /// Name of the transformer that rejected the declaration.
        macro_name: String,
        /// Description of what was found instead.
        kind: String,
        /// Span of the rejected declaration.
        span: Span,
    },

    /// The declaration already defines its own key mapping.
    #[error("coding keys already exist for `{type_name}`")]
    #[diagnostic(
        code(codable_synth::conflicting_mapping),
        help("remove the hand-written mapping or drop the attribute; synthesis never overwrites a mapping")
    )]
    ConflictingMapping {
        /// Name of the declaration.
        type_name: String,
        /// Span of the existing mapping.
        span: Span,
    },

    /// A helper attribute or macro argument is malformed.
    #[error("{message}")]
    #[diagnostic(code(codable_synth::invalid_attribute))]
    InvalidAttribute {
        /// What is wrong with the attribute.
        message: String,
        /// Span of the offending attribute.
        span: Span,
    },

    /// A mapping names a field the declaration does not have.
    #[error("`{type_name}` has no field named `{field}`")]
    #[diagnostic(code(codable_synth::unknown_field))]
    UnknownField {
        /// Name of the declaration.
        type_name: String,
        /// The unknown field name.
        field: String,
        /// Span of the mapping entry.
        span: Span,
    },

    /// The configuration file could not be loaded.
    #[error(transparent)]
    #[diagnostic(code(codable_synth::config))]
    Config(#[from] crate::config::ConfigError),
}

impl SynthesisError {
    /// Creates an [`SynthesisError::InvalidAttribute`] error.
    #[must_use]
    pub fn invalid_attribute(span: Span, message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            message: message.into(),
            span,
        }
    }

    /// Returns the span the error should be reported at.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::UnsupportedDeclaration { span, .. }
            | Self::ConflictingMapping { span, .. }
            | Self::InvalidAttribute { span, .. }
            | Self::UnknownField { span, .. } => *span,
            Self::Config(_) => Span::call_site(),
        }
    }

    /// Converts the error into a `syn::Error` for `compile_error!` emission.
    #[must_use]
    pub fn to_syn_error(&self) -> syn::Error {
        syn::Error::new(self.span(), self.to_string())
    }
}

impl From<syn::Error> for SynthesisError {
    fn from(err: syn::Error) -> Self {
        Self::InvalidAttribute {
            message: err.to_string(),
            span: err.span(),
        }
    }
}
