//! Attribute parsing utilities for declaration inspection.

use crate::utils::paths::path_to_string;
use syn::punctuated::Punctuated;
use syn::{parse_quote, Attribute, Expr, Field, LitStr, Meta, Token};

/// Field helper attribute carrying codable options.
pub const CODABLE_ATTR: &str = "codable";

/// Field helper attribute marking secure-storage-backed fields.
pub const SECURE_ATTR: &str = "secure";

/// Finds the first attribute whose last path segment is `name`.
///
/// Matches both `#[coding_keys(..)]` and `#[codable_synth::coding_keys(..)]`.
#[must_use]
pub fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| {
        attr.path()
            .segments
            .last()
            .is_some_and(|seg| seg.ident == name)
    })
}

/// Removes every attribute whose path is exactly one of `names`.
pub fn strip_attrs(attrs: &mut Vec<Attribute>, names: &[&str]) {
    attrs.retain(|attr| !names.iter().any(|name| attr.path().is_ident(name)));
}

/// Options parsed from a field's helper attributes.
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// `#[codable(skip)]`: the exclusion marker.
    pub skip: bool,
    /// `#[codable(readonly)]`: immutable after initialization.
    pub readonly: bool,
    /// `#[codable(default = expr)]`: inline default value.
    pub default: Option<Expr>,
    /// `#[codable(rename = "key")]`: serialization key override.
    pub rename: Option<String>,
    /// `#[secure(..)]`: the field is a computed secure-storage accessor.
    pub secure: bool,
}

impl FieldOptions {
    /// Parses the options of a single field.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or duplicated options.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();

        for attr in attrs {
            if attr.path().is_ident(SECURE_ATTR) {
                options.secure = true;
                continue;
            }
            if !attr.path().is_ident(CODABLE_ATTR) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    options.skip = true;
                } else if meta.path.is_ident("readonly") {
                    options.readonly = true;
                } else if meta.path.is_ident("default") {
                    if options.default.is_some() {
                        return Err(meta.error("duplicate `default` option"));
                    }
                    options.default = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("rename") {
                    if options.rename.is_some() {
                        return Err(meta.error("duplicate `rename` option"));
                    }
                    let key: LitStr = meta.value()?.parse()?;
                    options.rename = Some(key.value());
                } else {
                    return Err(meta.error(format!(
                        "unknown codable field option `{}`",
                        path_to_string(&meta.path)
                    )));
                }
                Ok(())
            })?;
        }

        Ok(options)
    }
}

/// Returns a copy of `field` carrying the exclusion marker.
///
/// The marker is appended to the first `#[codable(..)]` attribute, or a new
/// `#[codable(skip)]` attribute is added.
///
/// # Errors
///
/// Returns an error if the existing `#[codable(..)]` arguments do not parse.
pub fn with_skip_marker(field: &Field) -> syn::Result<Field> {
    let mut field = field.clone();

    match field
        .attrs
        .iter_mut()
        .find(|attr| attr.path().is_ident(CODABLE_ATTR))
    {
        Some(attr) => {
            let mut metas: Punctuated<Meta, Token![,]> =
                attr.parse_args_with(Punctuated::parse_terminated)?;
            metas.push(parse_quote!(skip));
            *attr = parse_quote!(#[codable(#metas)]);
        }
        None => field.attrs.push(parse_quote!(#[codable(skip)])),
    }

    Ok(field)
}
