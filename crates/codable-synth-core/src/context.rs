//! Context types for a single expansion.

use crate::config::Config;
use crate::error::SynthesisError;
use crate::key_mapping::InclusionPolicy;
use proc_macro2::Span;
use syn::{parse_quote, Path};

/// Context handed to a transformer for one expansion.
///
/// Built fresh per invocation; nothing is shared between expansions.
#[derive(Debug, Clone)]
pub struct ExpansionContext {
    /// Loaded configuration.
    pub config: Config,
    /// Path to the runtime crate used in generated code.
    pub crate_path: Path,
}

impl Default for ExpansionContext {
    fn default() -> Self {
        Self {
            config: Config::default(),
            crate_path: parse_quote!(::codable_synth),
        }
    }
}

impl ExpansionContext {
    /// Creates a context from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured `crate_path` is not a valid path.
    pub fn new(config: Config) -> Result<Self, SynthesisError> {
        let crate_path = match &config.codable.crate_path {
            Some(path) => parse_path(path, Span::call_site())?,
            None => parse_quote!(::codable_synth),
        };
        Ok(Self { config, crate_path })
    }

    /// Inclusion policy used when the attribute does not name one.
    #[must_use]
    pub fn default_policy(&self) -> InclusionPolicy {
        self.config.codable.policy
    }

    /// Traits requested when the attribute does not list any.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured trait is not a valid path.
    pub fn default_conformances(&self) -> Result<Vec<Path>, SynthesisError> {
        match &self.config.codable.conformances {
            Some(paths) => paths
                .iter()
                .map(|p| parse_path(p, Span::call_site()))
                .collect(),
            None => {
                let crate_path = &self.crate_path;
                Ok(vec![parse_quote!(#crate_path::Codable)])
            }
        }
    }
}

/// Parses a path written in configuration or an attribute string.
///
/// # Errors
///
/// Returns [`SynthesisError::InvalidAttribute`] if `text` is not a path.
pub fn parse_path(text: &str, span: Span) -> Result<Path, SynthesisError> {
    syn::parse_str(text).map_err(|e| {
        SynthesisError::invalid_attribute(span, format!("`{text}` is not a valid path: {e}"))
    })
}
