//! `#[secure_storage]`: turns `#[secure]` fields into store-backed accessors.
//!
//! ```ignore
//! #[secure_storage]
//! struct Session {
//!     user: String,
//!     #[secure("session-token")]
//!     token: Option<String>,
//! }
//!
//! // generates
//! impl Session {
//!     fn token(&self) -> Option<String> { /* store.get("session-token") */ }
//!     fn set_token(&self, new_value: Option<String>) { /* set or delete */ }
//! }
//! ```

use codable_synth_core::inspect::inspect;
use codable_synth_core::model::option_inner;
use codable_synth_core::utils::attributes::{strip_attrs, SECURE_ATTR};
use codable_synth_core::{
    Diagnostic, Expansion, ExpansionContext, Severity, SynthesisError, Transformer,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream, Parser};
use syn::spanned::Spanned;
use syn::{
    parse_quote, Attribute, Expr, Field, Fields, Ident, ImplItemFn, Item, LitStr, Path, Token, Type,
};
use tracing::debug;

/// Diagnostic code for `#[secure_storage]` without any `#[secure]` field.
pub const UNUSED_STORAGE_CODE: &str = "CS004";

/// Diagnostic name for `#[secure_storage]` without any `#[secure]` field.
pub const UNUSED_STORAGE_NAME: &str = "unused-secure-storage";

/// Which typed getter reads a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreGetter {
    /// `String` via `get`.
    Text,
    /// `bool` via `get_bool`.
    Bool,
    /// `Vec<u8>` via `get_data`.
    Data,
    /// Anything else: `get`, then `FromStr`; written back with `ToString`.
    Parsed,
}

impl StoreGetter {
    /// Picks the getter for a de-optionalized field type.
    #[must_use]
    pub fn for_type(ty: &Type) -> Self {
        let Type::Path(type_path) = ty else {
            return Self::Parsed;
        };
        let Some(segment) = type_path.path.segments.last() else {
            return Self::Parsed;
        };

        if segment.ident == "String" {
            Self::Text
        } else if segment.ident == "bool" {
            Self::Bool
        } else if segment.ident == "Vec" && is_byte_vec(&segment.arguments) {
            Self::Data
        } else {
            Self::Parsed
        }
    }

    /// Name of the store method used to read.
    #[must_use]
    pub fn method(self) -> &'static str {
        match self {
            Self::Text | Self::Parsed => "get",
            Self::Bool => "get_bool",
            Self::Data => "get_data",
        }
    }
}

fn is_byte_vec(arguments: &syn::PathArguments) -> bool {
    let syn::PathArguments::AngleBracketed(args) = arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(syn::GenericArgument::Type(Type::Path(inner))) if inner.path.is_ident("u8")
    )
}

/// Arguments of a field's `#[secure(...)]` attribute.
#[derive(Debug, Clone)]
pub struct SecureArgs {
    /// Storage key.
    pub key: LitStr,
    /// Store override for this field.
    pub store: Option<Expr>,
}

impl Parse for SecureArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut key: Option<LitStr> = None;
        let mut store: Option<Expr> = None;

        if input.peek(LitStr) {
            key = Some(input.parse()?);
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        while !input.is_empty() {
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "key" {
                if key.is_some() {
                    return Err(syn::Error::new(name.span(), "duplicate `key` argument"));
                }
                key = Some(input.parse()?);
            } else if name == "store" {
                if store.is_some() {
                    return Err(syn::Error::new(name.span(), "duplicate `store` argument"));
                }
                store = Some(input.parse()?);
            } else {
                return Err(syn::Error::new(name.span(), "expected `key` or `store`"));
            }
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        let Some(key) = key else {
            return Err(input.error("missing storage key, expected `#[secure(\"key\")]`"));
        };
        Ok(Self { key, store })
    }
}

impl SecureArgs {
    /// Parses the `#[secure]` attribute of a field, if it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute has no key or is malformed.
    pub fn from_field(field: &Field) -> syn::Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident(SECURE_ATTR)) else {
            return Ok(None);
        };
        Self::from_attr(attr).map(Some)
    }

    fn from_attr(attr: &Attribute) -> syn::Result<Self> {
        match &attr.meta {
            syn::Meta::List(list) => list.parse_args(),
            other => Err(syn::Error::new(
                other.span(),
                "missing storage key, expected `#[secure(\"key\")]`",
            )),
        }
    }
}

/// Arguments of `#[secure_storage(...)]`.
#[derive(Debug, Clone, Default)]
pub struct StorageArgs {
    /// Store used by every field without its own override.
    pub store: Option<Expr>,
    /// Runtime crate override.
    pub crate_path: Option<Path>,
}

impl StorageArgs {
    /// Parses attribute arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or malformed arguments.
    pub fn parse(args: TokenStream) -> syn::Result<Self> {
        let mut parsed = Self::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("store") {
                parsed.store = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                parsed.crate_path = Some(lit.parse()?);
            } else {
                return Err(meta.error("expected `store` or `crate`"));
            }
            Ok(())
        });
        parser.parse2(args)?;
        Ok(parsed)
    }
}

/// The secure storage transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureStorage;

impl SecureStorage {
    /// Creates the transformer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// One store-backed field.
struct SecureField {
    vis: syn::Visibility,
    name: Ident,
    value_type: Type,
    key: LitStr,
    store: Expr,
}

impl SecureField {
    fn accessors(&self, crate_path: &Path) -> [ImplItemFn; 2] {
        let SecureField {
            vis,
            name,
            value_type,
            key,
            store,
        } = self;
        let plain = name.to_string();
        let plain = plain.strip_prefix("r#").unwrap_or(&plain);
        let setter = format_ident!("set_{}", plain, span = name.span());
        let getter = StoreGetter::for_type(value_type);
        let method = format_ident!("{}", getter.method());
        let secure_store = quote!(#crate_path::store::SecureStore);

        let read = match getter {
            StoreGetter::Parsed => quote! {
                #secure_store::#method(&#store, #key).and_then(|raw| raw.parse().ok())
            },
            _ => quote!(#secure_store::#method(&#store, #key)),
        };
        let stored = match getter {
            StoreGetter::Parsed => quote! {
                #crate_path::store::StoredValue::from(::std::string::ToString::to_string(&value))
            },
            _ => quote!(#crate_path::store::StoredValue::from(value)),
        };
        let get_doc = format!("Reads `{}` from secure storage.", key.value());
        let set_doc = format!("Writes `{}` to secure storage; `None` deletes it.", key.value());

        [
            parse_quote! {
                #[doc = #get_doc]
                #vis fn #name(&self) -> ::core::option::Option<#value_type> {
                    #read
                }
            },
            parse_quote! {
                #[doc = #set_doc]
                #vis fn #setter(&self, new_value: ::core::option::Option<#value_type>) {
                    match new_value {
                        ::core::option::Option::Some(value) => {
                            #secure_store::set(&#store, #stored, #key);
                        }
                        ::core::option::Option::None => {
                            #secure_store::delete(&#store, #key);
                        }
                    }
                }
            },
        ]
    }
}

impl Transformer for SecureStorage {
    fn name(&self) -> &'static str {
        "secure_storage"
    }

    fn description(&self) -> &'static str {
        "Replaces #[secure] fields with getters and setters backed by a SecureStore"
    }

    fn expand(
        &self,
        args: TokenStream,
        item: Item,
        ctx: &ExpansionContext,
    ) -> Result<Expansion, SynthesisError> {
        let args = StorageArgs::parse(args)?;
        let inspection = inspect(self.name(), &item)?;
        let record = &inspection.record;
        let crate_path = args.crate_path.unwrap_or_else(|| ctx.crate_path.clone());
        let default_store: Expr = args
            .store
            .unwrap_or_else(|| parse_quote!(#crate_path::store::shared()));

        let mut item_struct = record.item.clone();
        let mut secure_fields = Vec::new();
        if let Fields::Named(named) = &mut item_struct.fields {
            let mut kept = syn::punctuated::Punctuated::new();
            for field in std::mem::take(&mut named.named) {
                let Some(secure) = SecureArgs::from_field(&field)? else {
                    kept.push(field);
                    continue;
                };
                let Some(name) = field.ident.clone() else {
                    continue;
                };
                let value_type = option_inner(&field.ty).unwrap_or(&field.ty).clone();
                debug!(
                    "`{}`: field `{name}` backed by key {:?} via `{}`",
                    record.ident(),
                    secure.key.value(),
                    StoreGetter::for_type(&value_type).method()
                );
                secure_fields.push(SecureField {
                    vis: field.vis.clone(),
                    name,
                    value_type,
                    key: secure.key,
                    store: secure.store.unwrap_or_else(|| default_store.clone()),
                });
            }
            named.named = kept;
        }

        if secure_fields.is_empty() {
            let diagnostic = Diagnostic::new(
                UNUSED_STORAGE_CODE,
                UNUSED_STORAGE_NAME,
                Severity::Warning,
                record.ident().span(),
                format!("`{}` has no `#[secure]` fields", record.ident()),
            );
            return Ok(Expansion::new(vec![item])
                .with_diagnostics(ctx.config.apply(vec![diagnostic])));
        }

        for field in &mut item_struct.fields {
            strip_attrs(&mut field.attrs, &[SECURE_ATTR]);
        }

        let ident = record.ident();
        let (impl_generics, ty_generics, where_clause) = record.generics().split_for_impl();
        let accessors = secure_fields
            .iter()
            .flat_map(|field| field.accessors(&crate_path));
        let accessor_impl: Item = parse_quote! {
            impl #impl_generics #ident #ty_generics #where_clause {
                #(#accessors)*
            }
        };

        Ok(Expansion::new(
            record.reassemble(item_struct, vec![accessor_impl]),
        ))
    }
}
