//! Decode-Initializer Synthesizer.
//!
//! Builds the `Decodable` impl that reads every eligible field from a keyed
//! container, and the per-field `immutable-default` diagnostics.

use crate::key_mapping::KeyMapping;
use crate::model::{FieldDescriptor, Initializer, Mutability, Record};
use crate::types::{Diagnostic, FixIt, Location, Replacement, Severity};
use crate::utils::attributes::with_skip_marker;
use crate::utils::generics::with_field_bounds;
use quote::ToTokens;
use syn::{parse_quote, Expr, FieldValue, Generics, Ident, Item, ItemStruct, Path, Type};
use tracing::{debug, trace};

/// Diagnostic code for immutable fields that decoding never repopulates.
pub const IMMUTABLE_DEFAULT_CODE: &str = "CS001";

/// Diagnostic name for immutable fields that decoding never repopulates.
pub const IMMUTABLE_DEFAULT_NAME: &str = "immutable-default";

/// Diagnostic code for mapping entries without a matching field.
pub const UNKNOWN_FIELD_CODE: &str = "CS003";

/// Diagnostic name for mapping entries without a matching field.
pub const UNKNOWN_FIELD_NAME: &str = "unknown-field";

/// How one stored field gets its value in the generated initializer.
#[derive(Debug, Clone)]
pub enum FieldSource {
    /// Required read; absence or a type mismatch is a decoding error.
    Decode(Type),
    /// Optional read; absence or `null` yields `None`.
    DecodeIfPresent(Type),
    /// Filled from the field's inline default.
    Default(Expr),
    /// Filled from `Default::default()`.
    DefaultTrait,
}

/// One member of the generated struct literal.
#[derive(Debug, Clone)]
pub struct FieldRead {
    /// The field being initialized.
    pub field: Ident,
    /// Where its value comes from.
    pub source: FieldSource,
}

impl FieldRead {
    /// Returns true if the value is read from the container.
    #[must_use]
    pub fn is_decoded(&self) -> bool {
        matches!(
            self.source,
            FieldSource::Decode(_) | FieldSource::DecodeIfPresent(_)
        )
    }
}

/// A synthesized decoder initializer.
#[derive(Debug, Clone)]
pub struct DecodeInitializer {
    ident: Ident,
    generics: Generics,
    keys: Ident,
    reads: Vec<FieldRead>,
}

impl DecodeInitializer {
    /// Struct literal members in declaration order.
    #[must_use]
    pub fn reads(&self) -> &[FieldRead] {
        &self.reads
    }

    /// Names of the fields read from the container, in order.
    #[must_use]
    pub fn decoded_fields(&self) -> Vec<String> {
        self.reads
            .iter()
            .filter(|r| r.is_decoded())
            .map(|r| r.field.to_string())
            .collect()
    }

    /// Types read from the container, in order.
    pub fn decoded_types(&self) -> impl Iterator<Item = &Type> {
        self.reads.iter().filter_map(|read| match &read.source {
            FieldSource::Decode(ty) | FieldSource::DecodeIfPresent(ty) => Some(ty),
            FieldSource::Default(_) | FieldSource::DefaultTrait => None,
        })
    }

    /// Adds a `DeserializeOwned` bound to `generics` for every type
    /// parameter a decoded field uses.
    #[must_use]
    pub fn bound_generics(&self, generics: &Generics, crate_path: &Path) -> Generics {
        let bound: Path = parse_quote!(#crate_path::__private::DeserializeOwned);
        with_field_bounds(generics, self.decoded_types(), &bound)
    }

    /// Renders the initializer as an `impl Decodable` item.
    #[must_use]
    pub fn to_item(&self, crate_path: &Path) -> Item {
        let ident = &self.ident;
        let keys = &self.keys;
        let generics = self.bound_generics(&self.generics, crate_path);
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        let members = self.reads.iter().map(|read| -> FieldValue {
            let field = &read.field;
            match &read.source {
                FieldSource::Decode(ty) => {
                    parse_quote!(#field: container.decode::<#ty>(#keys::#field)?)
                }
                FieldSource::DecodeIfPresent(inner) => {
                    parse_quote!(#field: container.decode_if_present::<#inner>(#keys::#field)?)
                }
                FieldSource::Default(expr) => parse_quote!(#field: #expr),
                FieldSource::DefaultTrait => {
                    parse_quote!(#field: ::core::default::Default::default())
                }
            }
        });

        parse_quote! {
            impl #impl_generics #crate_path::Decodable for #ident #ty_generics #where_clause {
                fn init_from(
                    decoder: &#crate_path::Decoder<'_>,
                ) -> ::core::result::Result<Self, #crate_path::DecodingError> {
                    let container = decoder.container::<#keys>()?;
                    ::core::result::Result::Ok(Self {
                        #(#members,)*
                    })
                }
            }
        }
    }
}

/// Whether a field is read by the decoder initializer.
#[must_use]
pub fn is_eligible(field: &FieldDescriptor, mapping: &KeyMapping) -> bool {
    mapping.contains(&field.name) && !field.has_initializer()
}

/// Builds the decoder initializer for a record.
///
/// Returns `Ok(None)` when the record already has one or no field is
/// eligible.
///
/// # Errors
///
/// Returns one error diagnostic per mapping entry that names no field.
pub fn synthesize_decode_init(
    record: &Record,
    fields: &[FieldDescriptor],
    mapping: &KeyMapping,
) -> Result<Option<DecodeInitializer>, Vec<Diagnostic>> {
    let unknown: Vec<Diagnostic> = mapping
        .iter()
        .filter(|entry| !fields.iter().any(|f| f.name == entry.field))
        .map(|entry| {
            Diagnostic::new(
                UNKNOWN_FIELD_CODE,
                UNKNOWN_FIELD_NAME,
                Severity::Error,
                entry.field.span(),
                format!(
                    "`{}` has no field named `{}`",
                    record.ident(),
                    entry.field_name()
                ),
            )
        })
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }

    if record.existing.decode_initializer {
        debug!("`{}` already has a decoder initializer", record.ident());
        return Ok(None);
    }

    if !fields.iter().any(|f| is_eligible(f, mapping)) {
        debug!("`{}` has no decodable fields", record.ident());
        return Ok(None);
    }

    let reads = fields
        .iter()
        .filter_map(|field| {
            let source = if is_eligible(field, mapping) {
                if field.declared_type.is_optional {
                    FieldSource::DecodeIfPresent(field.declared_type.inner.clone())
                } else {
                    FieldSource::Decode(field.declared_type.ty.clone())
                }
            } else {
                match &field.initializer {
                    Some(Initializer::Accessor) => return None,
                    Some(Initializer::Value(expr)) => FieldSource::Default(expr.clone()),
                    None => FieldSource::DefaultTrait,
                }
            };
            trace!("decode `{}`: {source:?}", field.name);
            Some(FieldRead {
                field: field.name.clone(),
                source,
            })
        })
        .collect();

    Ok(Some(DecodeInitializer {
        ident: record.ident().clone(),
        generics: record.generics().clone(),
        keys: record.coding_keys_ident(),
        reads,
    }))
}

/// Whether a field triggers the `immutable-default` warning.
#[must_use]
pub fn needs_immutable_default_warning(field: &FieldDescriptor) -> bool {
    field.has_initializer() && field.mutability == Mutability::Immutable && !field.is_excluded
}

/// The `immutable-default` warning for one field.
///
/// The fix-it re-renders `decl` with the exclusion marker added.
#[must_use]
pub fn immutable_default_diagnostic(field: &FieldDescriptor, decl: &syn::Field) -> Diagnostic {
    let diagnostic = Diagnostic::new(
        IMMUTABLE_DEFAULT_CODE,
        IMMUTABLE_DEFAULT_NAME,
        Severity::Warning,
        field.span,
        format!(
            "immutable field `{}` with a default is never repopulated by decoding",
            field.plain_name()
        ),
    );

    match with_skip_marker(decl) {
        Ok(fixed) => diagnostic.with_fix_it(FixIt::new(
            "mark the field as excluded with `skip`",
            Replacement::new(
                Location::from_span(field.span),
                fixed.to_token_stream().to_string(),
            ),
        )),
        Err(_) => diagnostic,
    }
}

/// Runs the per-field diagnostic stage over a struct.
#[must_use]
pub fn field_diagnostics(fields: &[FieldDescriptor], item: &ItemStruct) -> Vec<Diagnostic> {
    fields
        .iter()
        .filter(|field| needs_immutable_default_warning(field))
        .filter_map(|field| {
            item.fields
                .iter()
                .find(|decl| decl.ident.as_ref() == Some(&field.name))
                .map(|decl| immutable_default_diagnostic(field, decl))
        })
        .collect()
}
