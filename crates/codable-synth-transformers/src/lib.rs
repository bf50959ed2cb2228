//! # codable-synth-transformers
//!
//! Built-in transformers for codable-synth.
//!
//! ## Available Transformers
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `codable` | Key mapping, `Decodable`, `Encodable` and conformance for fields not marked `skip` |
//! | `codable_ignore_initialized` | Same, but fields with a default or accessor are left out |
//! | `coding_keys` | Key enum and `KeyMapped` impl for an explicit field list |
//! | `secure_storage` | `#[secure]` fields become getters and setters backed by a `SecureStore` |
//!
//! ## Expression Macros
//!
//! | Macro | Description |
//! |-------|-------------|
//! | `base64_encoded!` | String literal stored base64-encoded, decoded at run time |
//! | `checked_url!` | URL literal parsed at compile time |
//!
//! ## Usage
//!
//! ```ignore
//! use codable_synth_transformers::Registry;
//!
//! let expansion = Registry::builtin().expand("codable", args, item, &ctx)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codable;
mod coding_keys;
mod literals;
mod registry;
mod secure_storage;

pub use codable::{Codable, CodableArgs};
pub use coding_keys::CodingKeys;
pub use literals::{Base64Encoded, CheckedUrl};
pub use registry::{builtin_expressions, builtin_transformers, Registry};
pub use secure_storage::{SecureArgs, SecureStorage, StorageArgs, StoreGetter};

/// Re-export core types for convenience.
pub use codable_synth_core::{
    Expansion, ExpansionContext, ExpressionTransformer, SynthesisError, Transformer,
};
