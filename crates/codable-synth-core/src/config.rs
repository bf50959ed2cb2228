//! Configuration types for codable-synth.

use crate::key_mapping::InclusionPolicy;
use crate::types::{Diagnostic, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration, read from `codable-synth.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for the `codable` transformers.
    #[serde(default)]
    pub codable: CodableConfig,

    /// Per-diagnostic configuration, keyed by diagnostic name.
    #[serde(default)]
    pub diagnostics: HashMap<String, DiagnosticConfig>,
}

impl Config {
    /// Configuration with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown values.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a diagnostic is enabled.
    #[must_use]
    pub fn is_diagnostic_enabled(&self, name: &str) -> bool {
        self.diagnostics
            .get(name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a diagnostic.
    #[must_use]
    pub fn diagnostic_severity(&self, name: &str) -> Option<Severity> {
        self.diagnostics.get(name).and_then(|c| c.severity)
    }

    /// Drops disabled diagnostics and applies severity overrides.
    #[must_use]
    pub fn apply(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diagnostics
            .into_iter()
            .filter(|d| self.is_diagnostic_enabled(&d.name))
            .map(|mut d| {
                if let Some(severity) = self.diagnostic_severity(&d.name) {
                    d.severity = severity;
                }
                d
            })
            .collect()
    }
}

/// Defaults applied by the `codable` transformers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodableConfig {
    /// Inclusion policy used when the attribute does not name one.
    #[serde(default)]
    pub policy: InclusionPolicy,

    /// Traits requested for the conformance extension when the attribute
    /// does not list any. `None` means the runtime `Codable` marker trait.
    #[serde(default)]
    pub conformances: Option<Vec<String>>,

    /// Path to the runtime crate used in generated code.
    #[serde(default)]
    pub crate_path: Option<String>,
}

/// Per-diagnostic configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticConfig {
    /// Whether this diagnostic is reported.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this diagnostic.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but cannot be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The config file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown values.
    #[error("invalid codable-synth config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proc_macro2::Span;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.codable.policy,
            InclusionPolicy::IncludeAllExceptExcluded
        );
        assert!(config.codable.conformances.is_none());
        assert!(config.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[codable]
policy = "include-only-non-initialized"
conformances = ["crate::Marker"]

[diagnostics.immutable-default]
enabled = true
severity = "error"
"#;

        let config = Config::parse(toml).expect("config should parse");
        assert_eq!(
            config.codable.policy,
            InclusionPolicy::IncludeOnlyNonInitialized
        );
        assert_eq!(
            config.codable.conformances,
            Some(vec!["crate::Marker".to_string()])
        );
        assert!(config.is_diagnostic_enabled("immutable-default"));
        assert_eq!(
            config.diagnostic_severity("immutable-default"),
            Some(Severity::Error)
        );
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[codable]\npolicy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_apply_overrides() {
        let toml = r#"
[diagnostics.immutable-default]
severity = "error"

[diagnostics.noisy]
enabled = false
"#;
        let config = Config::parse(toml).expect("config should parse");
        let diagnostics = vec![
            Diagnostic::new("CS001", "immutable-default", Severity::Warning, Span::call_site(), "a"),
            Diagnostic::new("CS999", "noisy", Severity::Warning, Span::call_site(), "b"),
        ];

        let applied = config.apply(diagnostics);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].severity, Severity::Error);
    }
}
