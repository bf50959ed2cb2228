//! `#[coding_keys(...)]`: emits the key type for an explicit mapping.
//!
//! `#[codable]` delegates here by attaching the attribute to the struct;
//! it can also be written by hand to control keys directly.

use codable_synth_core::inspect::inspect;
use codable_synth_core::key_mapping::{coding_keys_items, CodingKeysArgs};
use codable_synth_core::{Expansion, ExpansionContext, SynthesisError, Transformer};
use proc_macro2::TokenStream;
use syn::Item;
use tracing::debug;

/// The key type transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodingKeys;

impl CodingKeys {
    /// Creates the transformer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for CodingKeys {
    fn name(&self) -> &'static str {
        "coding_keys"
    }

    fn description(&self) -> &'static str {
        "Emits the CodingKey enum and the KeyMapped impl for a field mapping"
    }

    fn expand(
        &self,
        args: TokenStream,
        item: Item,
        ctx: &ExpansionContext,
    ) -> Result<Expansion, SynthesisError> {
        let CodingKeysArgs {
            mapping,
            crate_path,
        } = CodingKeysArgs::parse(args)?;
        let inspection = inspect(self.name(), &item)?;
        let record = &inspection.record;

        if let Some(span) = record.existing.key_mapping {
            return Err(SynthesisError::ConflictingMapping {
                type_name: record.ident().to_string(),
                span,
            });
        }

        for entry in mapping.iter() {
            if !inspection.fields.iter().any(|f| f.name == entry.field) {
                return Err(SynthesisError::UnknownField {
                    type_name: record.ident().to_string(),
                    field: entry.field_name(),
                    span: entry.field.span(),
                });
            }
        }

        if mapping.is_empty() {
            debug!("`{}`: empty mapping, no key type", record.ident());
            return Ok(Expansion::new(vec![item]));
        }

        let crate_path = crate_path.unwrap_or_else(|| ctx.crate_path.clone());
        let generated = coding_keys_items(record, &mapping, &crate_path);
        debug!(
            "`{}`: key type `{}` with {} key(s)",
            record.ident(),
            record.coding_keys_ident(),
            mapping.len()
        );

        Ok(Expansion::new(
            record.reassemble(record.item.clone(), generated),
        ))
    }
}
