//! `#[codable]` and `#[codable_ignore_initialized]`.
//!
//! Runs the whole synthesis pipeline on a record: the key mapping is
//! attached to the struct as a `coding_keys` attribute, and the `Decodable`,
//! `Encodable` and conformance impls are emitted next to it.

use codable_synth_core::conformance::filter_implemented;
use codable_synth_core::decode_init::{field_diagnostics, synthesize_decode_init};
use codable_synth_core::encode::synthesize_encode;
use codable_synth_core::inspect::inspect;
use codable_synth_core::key_mapping::{synthesize_key_mapping, InclusionPolicy, KeyMapping};
use codable_synth_core::utils::attributes::{strip_attrs, CODABLE_ATTR};
use codable_synth_core::{
    synthesize_conformance, Expansion, ExpansionContext, FieldDescriptor, SynthesisError,
    Transformer,
};
use proc_macro2::TokenStream;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Item, LitStr, Path, Token};
use tracing::{debug, warn};

/// Arguments accepted by the codable attributes.
#[derive(Debug, Clone, Default)]
pub struct CodableArgs {
    /// `policy = "..."`: inclusion policy override.
    pub policy: Option<InclusionPolicy>,
    /// `conform(A, B)`: requested traits; `conform()` requests none.
    pub conform: Option<Vec<Path>>,
    /// `crate = "path"`: runtime crate used in generated code.
    pub crate_path: Option<Path>,
}

impl CodableArgs {
    /// Parses attribute arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown, duplicated or malformed arguments.
    pub fn parse(args: TokenStream) -> syn::Result<Self> {
        let mut parsed = Self::default();

        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("policy") {
                if parsed.policy.is_some() {
                    return Err(meta.error("duplicate `policy` argument"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                let policy = lit
                    .value()
                    .parse::<InclusionPolicy>()
                    .map_err(|e: String| syn::Error::new(lit.span(), e))?;
                parsed.policy = Some(policy);
            } else if meta.path.is_ident("conform") {
                if parsed.conform.is_some() {
                    return Err(meta.error("duplicate `conform` argument"));
                }
                let content;
                syn::parenthesized!(content in meta.input);
                let paths = Punctuated::<Path, Token![,]>::parse_terminated(&content)?;
                parsed.conform = Some(paths.into_iter().collect());
            } else if meta.path.is_ident("crate") {
                if parsed.crate_path.is_some() {
                    return Err(meta.error("duplicate `crate` argument"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                parsed.crate_path = Some(lit.parse()?);
            } else {
                return Err(meta.error("expected `policy`, `conform` or `crate`"));
            }
            Ok(())
        });
        parser.parse2(args)?;

        Ok(parsed)
    }
}

/// The codable transformer.
///
/// With a fixed policy it backs `#[codable_ignore_initialized]`, where
/// exclusions are inferred from initializers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codable {
    fixed_policy: Option<InclusionPolicy>,
}

impl Codable {
    /// `#[codable]`: policy from the arguments or configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `#[codable_ignore_initialized]`: always `include-only-non-initialized`.
    #[must_use]
    pub fn ignore_initialized() -> Self {
        Self {
            fixed_policy: Some(InclusionPolicy::IncludeOnlyNonInitialized),
        }
    }

    fn policy(&self, args: &CodableArgs, ctx: &ExpansionContext) -> InclusionPolicy {
        self.fixed_policy
            .or(args.policy)
            .unwrap_or_else(|| ctx.default_policy())
    }
}

impl Transformer for Codable {
    fn name(&self) -> &'static str {
        if self.fixed_policy.is_some() {
            "codable_ignore_initialized"
        } else {
            "codable"
        }
    }

    fn description(&self) -> &'static str {
        if self.fixed_policy.is_some() {
            "Synthesizes coding keys, decode and encode for fields without an initializer"
        } else {
            "Synthesizes coding keys, decode and encode for fields not marked `skip`"
        }
    }

    fn expand(
        &self,
        args: TokenStream,
        item: Item,
        ctx: &ExpansionContext,
    ) -> Result<Expansion, SynthesisError> {
        let args = CodableArgs::parse(args)?;
        if let (Some(_), Some(_)) = (self.fixed_policy, args.policy) {
            return Err(SynthesisError::invalid_attribute(
                proc_macro2::Span::call_site(),
                format!("`{}` does not take a `policy` argument", self.name()),
            ));
        }

        let inspection = inspect(self.name(), &item)?;
        let record = &inspection.record;
        let fields = &inspection.fields;
        let policy = self.policy(&args, ctx);
        let mapping = synthesize_key_mapping(record, fields, policy)?;
        let crate_path = args.crate_path.clone().unwrap_or_else(|| ctx.crate_path.clone());

        let mut diagnostics = inspection.diagnostics.clone();
        diagnostics.extend(field_diagnostics(fields, &record.item));

        let mut generated = Vec::new();
        let mut generics = record.generics().clone();
        let mut decodes = record.existing.decode_initializer;
        match synthesize_decode_init(record, fields, &mapping) {
            Ok(Some(init)) => {
                generated.push(init.to_item(&crate_path));
                generics = init.bound_generics(&generics, &crate_path);
                decodes = true;
            }
            Ok(None) => {}
            Err(errors) => diagnostics.extend(errors),
        }

        let mut encodes = record.existing.encoder;
        if let Some(encode) = synthesize_encode(record, fields, &mapping) {
            generated.push(encode.to_item(&crate_path));
            generics = encode.bound_generics(&generics, &crate_path);
            encodes = true;
        }

        let requested = match &args.conform {
            Some(paths) => paths.clone(),
            None if ctx.config.codable.conformances.is_some() => ctx.default_conformances()?,
            None if decodes && encodes => vec![syn::parse_quote!(#crate_path::Codable)],
            None => {
                debug!(
                    "`{}` lacks a decoder or an encoder, skipping the `Codable` marker",
                    record.ident()
                );
                Vec::new()
            }
        };
        let requested = filter_implemented(record, requested);
        if let Some(extension) = synthesize_conformance(record, &requested) {
            generated.extend(extension.with_generics(generics).to_items());
        }

        let mut item_struct = record.item.clone();
        let emitted = stored_mapping(&mapping, fields);
        if !emitted.is_empty() {
            // Macro attributes must come before `#[derive]`.
            let at = item_struct
                .attrs
                .iter()
                .position(|attr| attr.path().is_ident("derive"))
                .unwrap_or(item_struct.attrs.len());
            item_struct.attrs.insert(
                at,
                emitted.to_attribute(&crate_path, args.crate_path.is_some()),
            );
        }
        for field in &mut item_struct.fields {
            strip_attrs(&mut field.attrs, &[CODABLE_ATTR]);
        }

        let diagnostics = ctx.config.apply(diagnostics);
        for diagnostic in &diagnostics {
            warn!("`{}`: {}", record.ident(), diagnostic.note());
        }
        debug!(
            "expanded `{}` with {} generated item(s)",
            record.ident(),
            generated.len()
        );

        Ok(Expansion::new(record.reassemble(item_struct, generated)).with_diagnostics(diagnostics))
    }
}

/// The mapping minus accessor-backed fields, which have no storage and
/// therefore no key variant.
fn stored_mapping(mapping: &KeyMapping, fields: &[FieldDescriptor]) -> KeyMapping {
    let mut stored = KeyMapping::new();
    for entry in mapping.iter() {
        let is_accessor = fields
            .iter()
            .any(|f| f.name == entry.field && f.is_accessor());
        if !is_accessor {
            stored.push(entry.field.clone(), entry.key.clone());
        }
    }
    stored
}
