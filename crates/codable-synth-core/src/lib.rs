//! # codable-synth-core
//!
//! Field-synthesis engine behind the `codable-synth` attribute macros.
//!
//! The engine is a pipeline of pure stages over a `syn::Item`:
//!
//! - [`inspect`](inspect::inspect) classifies the declaration once and
//!   extracts its [`FieldDescriptor`]s
//! - [`synthesize_key_mapping`] builds the ordered [`KeyMapping`]
//! - [`synthesize_decode_init`] builds the `Decodable` impl
//! - [`synthesize_encode`] builds the `Encodable` impl
//! - [`synthesize_conformance`] attaches the requested traits
//!
//! Each stage returns its [`Diagnostic`]s as values. [`Transformer`]s glue
//! the stages together for a single attribute macro, and
//! [`ExpressionTransformer`]s back the function-like macros.
//!
//! ## Example
//!
//! ```ignore
//! use codable_synth_core::{inspect, synthesize_key_mapping, InclusionPolicy};
//!
//! let inspection = inspect::inspect("codable", &item)?;
//! let mapping = synthesize_key_mapping(
//!     &inspection.record,
//!     &inspection.fields,
//!     InclusionPolicy::IncludeOnlyNonInitialized,
//! )?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod error;
mod transformer;
mod types;

pub mod conformance;
pub mod decode_init;
pub mod encode;
pub mod inspect;
pub mod key_mapping;
pub mod model;

/// Utility modules for transformer implementations.
pub mod utils;

pub use config::{CodableConfig, Config, ConfigError, DiagnosticConfig};
pub use conformance::{filter_implemented, synthesize_conformance, ConformanceExtension};
pub use context::{parse_path, ExpansionContext};
pub use decode_init::{field_diagnostics, synthesize_decode_init, DecodeInitializer};
pub use encode::{synthesize_encode, EncodeImpl};
pub use error::SynthesisError;
pub use inspect::{classify, DeclShape, Inspection};
pub use key_mapping::{
    coding_keys_items, synthesize_key_mapping, CodingKeysArgs, InclusionPolicy, KeyMapping,
};
pub use model::{DeclaredType, FieldDescriptor, Initializer, Mutability, Record};
pub use transformer::{
    Expansion, ExpressionTransformer, ExpressionTransformerBox, Transformer, TransformerBox,
};
pub use types::{Diagnostic, FixIt, Location, Replacement, Severity};
