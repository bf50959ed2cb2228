//! Encode Synthesizer.
//!
//! Mirrors the decoder initializer: every mapped stored field is written
//! under its key, optionals only when present.

use crate::key_mapping::KeyMapping;
use crate::model::{FieldDescriptor, Record};
use crate::utils::generics::with_field_bounds;
use syn::{parse_quote, Generics, Ident, Item, Path, Stmt, Type};
use tracing::debug;

/// One field write in the generated `encode`.
#[derive(Debug, Clone)]
pub struct FieldWrite {
    /// The field being written.
    pub field: Ident,
    /// The field's declared type.
    pub ty: Type,
    /// Whether the field is `Option<T>` and written only when present.
    pub if_present: bool,
}

/// A synthesized `Encodable` impl.
#[derive(Debug, Clone)]
pub struct EncodeImpl {
    ident: Ident,
    generics: Generics,
    keys: Ident,
    writes: Vec<FieldWrite>,
}

impl EncodeImpl {
    /// Field writes in declaration order.
    #[must_use]
    pub fn writes(&self) -> &[FieldWrite] {
        &self.writes
    }

    /// Adds a `Serialize` bound to `generics` for every type parameter a
    /// written field uses.
    #[must_use]
    pub fn bound_generics(&self, generics: &Generics, crate_path: &Path) -> Generics {
        let bound: Path = parse_quote!(#crate_path::__private::Serialize);
        with_field_bounds(generics, self.writes.iter().map(|w| &w.ty), &bound)
    }

    /// Renders the impl.
    #[must_use]
    pub fn to_item(&self, crate_path: &Path) -> Item {
        let ident = &self.ident;
        let keys = &self.keys;
        let generics = self.bound_generics(&self.generics, crate_path);
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        let writes = self.writes.iter().map(|write| -> Stmt {
            let field = &write.field;
            if write.if_present {
                parse_quote!(container.encode_if_present(#keys::#field, self.#field.as_ref())?;)
            } else {
                parse_quote!(container.encode(#keys::#field, &self.#field)?;)
            }
        });

        parse_quote! {
            impl #impl_generics #crate_path::Encodable for #ident #ty_generics #where_clause {
                fn encode(
                    &self,
                    encoder: &mut #crate_path::Encoder,
                ) -> ::core::result::Result<(), #crate_path::EncodingError> {
                    let mut container = encoder.container::<#keys>();
                    #(#writes)*
                    ::core::result::Result::Ok(())
                }
            }
        }
    }
}

/// Builds the `Encodable` impl for a record.
///
/// Returns `None` if the record already encodes itself or no stored field
/// is mapped.
#[must_use]
pub fn synthesize_encode(
    record: &Record,
    fields: &[FieldDescriptor],
    mapping: &KeyMapping,
) -> Option<EncodeImpl> {
    if record.existing.encoder {
        debug!("`{}` already has an encoder", record.ident());
        return None;
    }

    let writes: Vec<FieldWrite> = fields
        .iter()
        .filter(|field| mapping.contains(&field.name) && !field.is_accessor())
        .map(|field| FieldWrite {
            field: field.name.clone(),
            ty: field.declared_type.ty.clone(),
            if_present: field.declared_type.is_optional,
        })
        .collect();

    if writes.is_empty() {
        return None;
    }

    Some(EncodeImpl {
        ident: record.ident().clone(),
        generics: record.generics().clone(),
        keys: record.coding_keys_ident(),
        writes,
    })
}
