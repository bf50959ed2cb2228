//! Key-Mapping Synthesizer.
//!
//! Turns the inspected field list into an ordered mapping from field name to
//! serialization key, and builds the key type for a mapping.
//!
//! # Policies
//!
//! | Policy | A field becomes a key iff |
//! |--------|---------------------------|
//! | `include-all-except-excluded` | it is not marked `#[codable(skip)]` |
//! | `include-only-non-initialized` | it is not skipped, has no default and no accessor body |

use crate::error::SynthesisError;
use crate::model::{FieldDescriptor, Record};
use quote::{quote, ToTokens};
use serde::{Deserialize, Serialize};
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{parse_quote, Expr, Ident, Item, Lit, Meta, Path, Token};
use tracing::debug;

/// Selects which fields become keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InclusionPolicy {
    /// Every field not explicitly excluded.
    #[default]
    IncludeAllExceptExcluded,
    /// Only fields without an initializer or accessor body; exclusions are
    /// inferred rather than hand-marked.
    IncludeOnlyNonInitialized,
}

impl InclusionPolicy {
    /// Whether `field` becomes a key under this policy.
    #[must_use]
    pub fn includes(self, field: &FieldDescriptor) -> bool {
        match self {
            Self::IncludeAllExceptExcluded => !field.is_excluded,
            Self::IncludeOnlyNonInitialized => !field.is_excluded && !field.has_initializer(),
        }
    }

    /// The configuration name of this policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IncludeAllExceptExcluded => "include-all-except-excluded",
            Self::IncludeOnlyNonInitialized => "include-only-non-initialized",
        }
    }
}

impl std::fmt::Display for InclusionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InclusionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "include-all-except-excluded" => Ok(Self::IncludeAllExceptExcluded),
            "include-only-non-initialized" => Ok(Self::IncludeOnlyNonInitialized),
            other => Err(format!(
                "unknown policy `{other}`, expected `include-all-except-excluded` or `include-only-non-initialized`"
            )),
        }
    }
}

/// One `(field, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    /// Field identifier, also used as the key variant name.
    pub field: Ident,
    /// Serialization key.
    pub key: String,
}

impl KeyEntry {
    /// Field name without a raw-identifier prefix.
    #[must_use]
    pub fn field_name(&self) -> String {
        let name = self.field.to_string();
        name.strip_prefix("r#").map_or(name.clone(), str::to_string)
    }
}

/// Ordered field-name to serialization-key table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMapping {
    entries: Vec<KeyEntry>,
}

impl KeyMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, keeping insertion order.
    pub fn push(&mut self, field: Ident, key: impl Into<String>) {
        self.entries.push(KeyEntry {
            field,
            key: key.into(),
        });
    }

    /// Returns true if no field qualified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyEntry> {
        self.entries.iter()
    }

    /// Finds the entry for a field.
    #[must_use]
    pub fn entry(&self, field: &Ident) -> Option<&KeyEntry> {
        self.entries.iter().find(|e| e.field == *field)
    }

    /// Finds the entry that serializes under `key`.
    #[must_use]
    pub fn entry_for_key(&self, key: &str) -> Option<&KeyEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Whether a field is part of the mapping.
    #[must_use]
    pub fn contains(&self, field: &Ident) -> bool {
        self.entry(field).is_some()
    }

    /// Field names in order, without raw prefixes.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.entries.iter().map(KeyEntry::field_name).collect()
    }

    /// Renders the mapping as a `coding_keys` attribute for the struct.
    ///
    /// Entries whose key equals the field name are written bare. With
    /// `crate_arg` set, the runtime path is passed along as `crate = ".."`.
    #[must_use]
    pub fn to_attribute(&self, crate_path: &Path, crate_arg: bool) -> syn::Attribute {
        let mut entries: Vec<proc_macro2::TokenStream> = self
            .entries
            .iter()
            .map(|entry| {
                let field = &entry.field;
                if entry.key == entry.field_name() {
                    quote!(#field)
                } else {
                    let key = &entry.key;
                    quote!(#field = #key)
                }
            })
            .collect();
        if crate_arg {
            let path = crate_path.to_token_stream().to_string();
            entries.push(quote!(crate = #path));
        }
        parse_quote!(#[#crate_path::coding_keys(#(#entries),*)])
    }
}

/// Parsed arguments of a `coding_keys` attribute.
#[derive(Debug, Clone, Default)]
pub struct CodingKeysArgs {
    /// The listed entries.
    pub mapping: KeyMapping,
    /// Runtime crate override (`crate = "path"`).
    pub crate_path: Option<Path>,
}

impl CodingKeysArgs {
    /// Parses `field`, `field = "key"` and `crate = "path"` entries.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed or duplicated entries.
    pub fn parse(args: proc_macro2::TokenStream) -> Result<Self, SynthesisError> {
        let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
        let mut parsed = Self::default();

        for meta in metas {
            let (path, key) = match &meta {
                Meta::Path(path) => (path, None),
                Meta::NameValue(name_value) => match &name_value.value {
                    Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(key), ..
                    }) => (&name_value.path, Some(key)),
                    other => {
                        return Err(SynthesisError::invalid_attribute(
                            other.span(),
                            "expected a string literal key",
                        ));
                    }
                },
                Meta::List(list) => {
                    return Err(SynthesisError::invalid_attribute(
                        list.span(),
                        "expected `field` or `field = \"key\"`",
                    ));
                }
            };

            if path.is_ident("crate") {
                let Some(lit) = key else {
                    return Err(SynthesisError::invalid_attribute(
                        path.span(),
                        "expected `crate = \"path\"`",
                    ));
                };
                parsed.crate_path = Some(lit.parse()?);
                continue;
            }

            let Some(field) = path.get_ident().cloned() else {
                return Err(SynthesisError::invalid_attribute(
                    path.span(),
                    "expected a field name",
                ));
            };
            if parsed.mapping.contains(&field) {
                return Err(SynthesisError::invalid_attribute(
                    field.span(),
                    format!("field `{field}` is listed more than once"),
                ));
            }
            let entry_key = key.map_or_else(
                || {
                    let name = field.to_string();
                    name.strip_prefix("r#").map_or(name.clone(), str::to_string)
                },
                syn::LitStr::value,
            );
            if let Some(first) = parsed.mapping.entry_for_key(&entry_key) {
                return Err(duplicate_key(field.span(), &entry_key, first, &field));
            }
            parsed.mapping.push(field, entry_key);
        }

        Ok(parsed)
    }
}

fn duplicate_key(
    span: proc_macro2::Span,
    key: &str,
    first: &KeyEntry,
    second: &Ident,
) -> SynthesisError {
    let second = second.to_string();
    SynthesisError::invalid_attribute(
        span,
        format!(
            "serialization key `{key}` is used by both `{}` and `{}`",
            first.field_name(),
            second.strip_prefix("r#").unwrap_or(&second)
        ),
    )
}

/// Builds the key mapping for a record under `policy`.
///
/// An empty result is not an error; callers skip emission.
///
/// # Errors
///
/// Returns [`SynthesisError::ConflictingMapping`] if the record already
/// defines its own mapping, and [`SynthesisError::InvalidAttribute`] at the
/// second field if two fields serialize under the same key.
pub fn synthesize_key_mapping(
    record: &Record,
    fields: &[FieldDescriptor],
    policy: InclusionPolicy,
) -> Result<KeyMapping, SynthesisError> {
    if let Some(span) = record.existing.key_mapping {
        return Err(SynthesisError::ConflictingMapping {
            type_name: record.ident().to_string(),
            span,
        });
    }

    let mut mapping = KeyMapping::new();
    for field in fields.iter().filter(|f| policy.includes(f)) {
        let key = field.serialization_key();
        if let Some(first) = mapping.entry_for_key(&key) {
            return Err(duplicate_key(field.span, &key, first, &field.name));
        }
        mapping.push(field.name.clone(), key);
    }

    debug!(
        "key mapping for `{}` under {policy}: {:?}",
        record.ident(),
        mapping.field_names()
    );

    Ok(mapping)
}

/// Builds the key type, its `CodingKey` impl and the `KeyMapped` impl.
#[must_use]
pub fn coding_keys_items(record: &Record, mapping: &KeyMapping, crate_path: &Path) -> Vec<Item> {
    let ident = record.ident();
    let keys = record.coding_keys_ident();
    let vis = &record.item.vis;
    let (impl_generics, ty_generics, where_clause) = record.generics().split_for_impl();

    let variants: Vec<&Ident> = mapping.iter().map(|e| &e.field).collect();
    let key_strings: Vec<&str> = mapping.iter().map(|e| e.key.as_str()).collect();
    let doc = format!("Coding keys of [`{ident}`].");

    let key_enum: Item = parse_quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(non_camel_case_types)]
        #vis enum #keys {
            #(#variants),*
        }
    };

    let coding_key_impl: Item = parse_quote! {
        impl #crate_path::CodingKey for #keys {
            fn string_value(self) -> &'static str {
                match self {
                    #(Self::#variants => #key_strings,)*
                }
            }

            fn all_keys() -> &'static [Self] {
                &[#(Self::#variants),*]
            }
        }
    };

    let key_mapped_impl: Item = parse_quote! {
        impl #impl_generics #crate_path::KeyMapped for #ident #ty_generics #where_clause {
            type CodingKeys = #keys;
        }
    };

    vec![key_enum, coding_key_impl, key_mapped_impl]
}
