//! Conformance-Extension Emitter.

use crate::model::Record;
use crate::utils::paths::{last_segment, path_to_string};
use syn::{parse_quote, Generics, Ident, Item, Path};

/// Attaches a type to a list of traits.
#[derive(Debug, Clone)]
pub struct ConformanceExtension {
    ident: Ident,
    generics: Generics,
    traits: Vec<Path>,
}

impl ConformanceExtension {
    /// The requested traits, verbatim and in order.
    #[must_use]
    pub fn traits(&self) -> &[Path] {
        &self.traits
    }

    /// Replaces the generics used for the impls, e.g. with the bounds the
    /// synthesized coding impls carry.
    #[must_use]
    pub fn with_generics(mut self, generics: Generics) -> Self {
        self.generics = generics;
        self
    }

    /// Renders one empty `impl Trait for Name {}` per trait.
    #[must_use]
    pub fn to_items(&self) -> Vec<Item> {
        let ident = &self.ident;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        self.traits
            .iter()
            .map(|path| {
                parse_quote! {
                    impl #impl_generics #path for #ident #ty_generics #where_clause {}
                }
            })
            .collect()
    }
}

/// Emits the conformance extension for `requested`, or nothing if empty.
///
/// The list is used verbatim: no deduplication, no reordering.
#[must_use]
pub fn synthesize_conformance(record: &Record, requested: &[Path]) -> Option<ConformanceExtension> {
    if requested.is_empty() {
        return None;
    }

    Some(ConformanceExtension {
        ident: record.ident().clone(),
        generics: record.generics().clone(),
        traits: requested.to_vec(),
    })
}

/// Drops requested traits the member block already implements.
///
/// Traits are compared by their last path segment.
#[must_use]
pub fn filter_implemented(record: &Record, requested: Vec<Path>) -> Vec<Path> {
    requested
        .into_iter()
        .filter(|path| {
            let implemented = last_segment(path)
                .is_some_and(|name| record.existing.conformances.contains(&name));
            if implemented {
                tracing::debug!(
                    "`{}` already implements `{}`",
                    record.ident(),
                    path_to_string(path)
                );
            }
            !implemented
        })
        .collect()
}
