//! # codable-synth-macros
//!
//! Attribute macros for codable-synth. Use them through the `codable-synth`
//! crate, which also provides the runtime the generated code refers to.
//!
//! Every macro looks up its transformer in the built-in registry, loads
//! `codable-synth.toml` (if any) and renders the result:
//!
//! - generated items are emitted in place of the annotated item
//! - warnings surface as deprecation warnings at the offending field
//! - errors become `compile_error!`; the item is still emitted without its
//!   helper attributes
//!
//! The function-like macros expand to a single expression, or to a
//! `compile_error!` in its place.

#![forbid(unsafe_code)]

mod config;
mod render;

use codable_synth_transformers::Registry;
use proc_macro::TokenStream;
use quote::ToTokens;

fn expand(name: &str, args: TokenStream, input: TokenStream) -> TokenStream {
    let item = match syn::parse::<syn::Item>(input.clone()) {
        Ok(item) => item,
        Err(err) => {
            let mut output: TokenStream = err.to_compile_error().into();
            output.extend(input);
            return output;
        }
    };

    let ctx = match config::load_context() {
        Ok(ctx) => ctx,
        Err(err) => return render::failure(&err, item).into(),
    };

    match Registry::builtin().expand(name, args.into(), item.clone(), &ctx) {
        Ok(expansion) => render::expansion(&expansion).into(),
        Err(err) => render::failure(&err, item).into(),
    }
}

fn expand_expression(name: &str, input: TokenStream) -> TokenStream {
    let expanded = config::load_context()
        .and_then(|ctx| Registry::builtin().expand_expression(name, input.into(), &ctx));
    match expanded {
        Ok(expr) => expr.into_token_stream().into(),
        Err(err) => render::expression_failure(&err).into(),
    }
}

/// Synthesizes coding keys, `Decodable`, `Encodable` and a `Codable`
/// conformance for a struct with named fields.
///
/// # Arguments
///
/// - `policy = "include-all-except-excluded" | "include-only-non-initialized"`
/// - `conform(Trait, ...)`: traits to implement instead of `Codable`;
///   `conform()` implements none
/// - `crate = "path"`: path of the runtime crate
///
/// # Field options
///
/// - `#[codable(skip)]`: not a key
/// - `#[codable(rename = "key")]`: serialization key
/// - `#[codable(default = expr)]`: inline default
/// - `#[codable(readonly)]`: never reassigned after initialization
///
/// Must be the outermost attribute. Applying it twice is an error.
///
/// ```ignore
/// #[codable]
/// struct Profile {
///     name: String,
///     nickname: Option<String>,
///     #[codable(skip)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_attribute]
pub fn codable(args: TokenStream, input: TokenStream) -> TokenStream {
    expand("codable", args, input)
}

/// Like [`macro@codable`], but fields with a default or a secure-storage
/// accessor are left out of the keys instead of needing `skip`.
#[proc_macro_attribute]
pub fn codable_ignore_initialized(args: TokenStream, input: TokenStream) -> TokenStream {
    expand("codable_ignore_initialized", args, input)
}

/// Emits the key enum, its `CodingKey` impl and the `KeyMapped` impl for an
/// explicit list of `field` or `field = "key"` entries.
///
/// ```ignore
/// #[coding_keys(id, name = "full_name")]
/// struct Person {
///     id: u64,
///     name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn coding_keys(args: TokenStream, input: TokenStream) -> TokenStream {
    expand("coding_keys", args, input)
}

/// Replaces `#[secure("key")]` fields with a getter and a `set_` setter
/// backed by a `SecureStore`.
///
/// `store = expr` sets the store for every field; `#[secure("key", store =
/// expr)]` overrides it per field. The default is the shared in-memory
/// store.
#[proc_macro_attribute]
pub fn secure_storage(args: TokenStream, input: TokenStream) -> TokenStream {
    expand("secure_storage", args, input)
}

/// Embeds a string literal base64-encoded; the expression decodes it at run
/// time and evaluates to `Option<String>`.
///
/// ```ignore
/// let secret = base64_encoded!("api-key");
/// assert_eq!(secret.as_deref(), Some("api-key"));
/// ```
#[proc_macro]
pub fn base64_encoded(input: TokenStream) -> TokenStream {
    expand_expression("base64_encoded", input)
}

/// Parses a URL literal at compile time and evaluates to a `url::Url`.
///
/// A malformed literal fails the build.
///
/// ```ignore
/// let home = checked_url!("https://example.com/home");
/// assert_eq!(home.host_str(), Some("example.com"));
/// ```
#[proc_macro]
pub fn checked_url(input: TokenStream) -> TokenStream {
    expand_expression("checked_url", input)
}
