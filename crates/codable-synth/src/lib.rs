//! # codable-synth
//!
//! Compile-time synthesis of coding keys, decoding, encoding and secure
//! storage accessors for structs with named fields.
//!
//! ## Quick Start
//!
//! ```ignore
//! use codable_synth::codable;
//!
//! #[codable]
//! struct Profile {
//!     name: String,
//!     #[codable(rename = "nick")]
//!     nickname: Option<String>,
//!     #[codable(skip)]
//!     cache: Vec<u8>,
//! }
//!
//! let profile: Profile = codable_synth::from_str(r#"{"name":"Ada"}"#)?;
//! let json = codable_synth::to_string(&profile)?;
//! ```
//!
//! ## Attributes
//!
//! | Attribute | Generates |
//! |-----------|-----------|
//! | `#[codable]` | keys, `Decodable`, `Encodable`, `Codable` |
//! | `#[codable_ignore_initialized]` | the same, leaving out fields with defaults |
//! | `#[coding_keys(...)]` | the key enum for an explicit key list |
//! | `#[secure_storage]` | accessors for `#[secure("key")]` fields |
//!
//! Two function-like macros work on string literals:
//!
//! ```ignore
//! let token = codable_synth::base64_encoded!("api-key"); // Option<String>
//! let home = codable_synth::checked_url!("https://example.com"); // url::Url
//! ```
//!
//! ## Configuration
//!
//! `codable-synth.toml` next to the crate's `Cargo.toml` (or in a parent
//! directory up to the workspace root):
//!
//! ```toml
//! [codable]
//! policy = "include-only-non-initialized"
//! conformances = ["codable_synth::Codable"]
//!
//! [diagnostics.immutable-default]
//! severity = "error"
//! ```
//!
//! The engine behind the macros is available as [`engine`] for tools that
//! want to run expansions outside the compiler.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod coding;
mod literals;
pub mod store;

pub use codable_synth_macros::{
    base64_encoded, checked_url, codable, codable_ignore_initialized, coding_keys, secure_storage,
};

pub use coding::{
    from_str, from_value, to_string, to_value, Codable, CodingKey, Decodable, Decoder,
    DecodingError, Encodable, Encoder, EncodingError, KeyMapped, KeyedDecodingContainer,
    KeyedEncodingContainer,
};
pub use literals::base64_decoded;

#[doc(hidden)]
pub mod __private {
    pub use serde::de::DeserializeOwned;
    pub use serde::Serialize;
    pub use url::Url;
}

/// The synthesis engine and its built-in transformers.
pub mod engine {
    pub use codable_synth_core::*;
    pub use codable_synth_transformers::{
        builtin_expressions, builtin_transformers, Base64Encoded, CheckedUrl, Codable,
        CodableArgs, CodingKeys, Registry, SecureArgs, SecureStorage, StorageArgs, StoreGetter,
    };
}
