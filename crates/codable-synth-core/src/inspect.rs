//! Declaration Inspector: classifies a declaration and extracts its fields.
//!
//! Classification happens once, at this boundary. Downstream stages only
//! ever see a [`Record`] and its [`FieldDescriptor`]s.

use crate::error::SynthesisError;
use crate::model::{
    Container, DeclaredType, ExistingMembers, FieldDescriptor, Initializer, Mutability, Record,
};
use crate::types::{Diagnostic, Severity};
use crate::utils::attributes::{find_attr, FieldOptions};
use crate::utils::paths::{last_segment, type_name};
use proc_macro2::Span;
use std::collections::HashSet;
use syn::spanned::Spanned;
use syn::{Fields, ImplItem, Item, ItemImpl, ItemStruct, Type};
use tracing::{debug, trace};

/// Diagnostic code for helper options that have no effect.
pub const UNUSED_OPTION_CODE: &str = "CS002";

/// Diagnostic name for helper options that have no effect.
pub const UNUSED_OPTION_NAME: &str = "unused-option";

/// The shape of a declaration, decided once.
#[derive(Debug, Clone)]
pub enum DeclShape {
    /// A struct with named fields, possibly inside an inline module.
    AggregateRecord(Box<Record>),
    /// Anything else.
    Unsupported {
        /// What was found (e.g. "an enum").
        kind: String,
        /// Span of the declaration.
        span: Span,
    },
}

/// Result of inspecting a declaration.
#[derive(Debug, Clone)]
pub struct Inspection {
    /// The classified record.
    pub record: Record,
    /// Stored fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Non-fatal findings about the field options.
    pub diagnostics: Vec<Diagnostic>,
}

/// Classifies a declaration into a record or an unsupported shape.
#[must_use]
pub fn classify(item: &Item) -> DeclShape {
    match item {
        Item::Struct(item_struct) => classify_struct(item_struct, Container::Struct),
        Item::Mod(module) => classify_module(module),
        other => DeclShape::Unsupported {
            kind: describe_item(other).to_string(),
            span: other.span(),
        },
    }
}

fn classify_struct(item_struct: &ItemStruct, container: Container) -> DeclShape {
    match &item_struct.fields {
        Fields::Named(_) => {
            let mut existing = ExistingMembers::default();
            if let Some(attr) = find_attr(&item_struct.attrs, "coding_keys") {
                existing.key_mapping = Some(attr.span());
            }
            DeclShape::AggregateRecord(Box::new(Record {
                item: item_struct.clone(),
                container,
                existing,
            }))
        }
        Fields::Unnamed(_) => DeclShape::Unsupported {
            kind: "a tuple struct".to_string(),
            span: item_struct.span(),
        },
        Fields::Unit => DeclShape::Unsupported {
            kind: "a unit struct".to_string(),
            span: item_struct.span(),
        },
    }
}

fn classify_module(module: &syn::ItemMod) -> DeclShape {
    let Some((_, body)) = &module.content else {
        return DeclShape::Unsupported {
            kind: "a module without an inline body".to_string(),
            span: module.span(),
        };
    };

    let structs: Vec<(usize, &ItemStruct)> = body
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Item::Struct(s) => Some((index, s)),
            _ => None,
        })
        .collect();

    let [(index, item_struct)] = structs.as_slice() else {
        return DeclShape::Unsupported {
            kind: format!("a module containing {} structs", structs.len()),
            span: module.ident.span(),
        };
    };

    let shape = classify_struct(
        item_struct,
        Container::Module {
            module: module.clone(),
            index: *index,
        },
    );

    match shape {
        DeclShape::AggregateRecord(mut record) => {
            scan_member_block(&mut record, body);
            DeclShape::AggregateRecord(record)
        }
        unsupported @ DeclShape::Unsupported { .. } => unsupported,
    }
}

/// Records which generated members the module body already provides.
fn scan_member_block(record: &mut Record, body: &[Item]) {
    let name = record.ident().to_string();
    let keys_name = record.coding_keys_ident().to_string();

    for item in body {
        match item {
            Item::Enum(item_enum) => {
                if item_enum.ident == "CodingKeys" || item_enum.ident == keys_name.as_str() {
                    trace!("{name}: found key enum `{}`", item_enum.ident);
                    if record.existing.key_mapping.is_none() {
                        record.existing.key_mapping = Some(item_enum.ident.span());
                    }
                }
            }
            Item::Impl(item_impl) if type_name(&item_impl.self_ty).as_deref() == Some(name.as_str()) => {
                scan_impl(record, item_impl);
            }
            _ => {}
        }
    }
}

fn scan_impl(record: &mut Record, item_impl: &ItemImpl) {
    if let Some((_, path, _)) = &item_impl.trait_ {
        let Some(trait_name) = last_segment(path) else {
            return;
        };
        match trait_name.as_str() {
            "KeyMapped" => {
                if record.existing.key_mapping.is_none() {
                    record.existing.key_mapping = Some(path.span());
                }
            }
            "Decodable" => record.existing.decode_initializer = true,
            "Encodable" => record.existing.encoder = true,
            _ => {}
        }
        record.existing.conformances.push(trait_name);
        return;
    }

    for impl_item in &item_impl.items {
        let ImplItem::Fn(function) = impl_item else {
            continue;
        };
        let typed: Vec<&syn::PatType> = function
            .sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                syn::FnArg::Typed(pat_type) => Some(pat_type),
                syn::FnArg::Receiver(_) => None,
            })
            .collect();
        let [param] = typed.as_slice() else {
            continue;
        };
        let ty = match &*param.ty {
            Type::Reference(reference) => &*reference.elem,
            other => other,
        };
        match type_name(ty).as_deref() {
            Some("Decoder") => record.existing.decode_initializer = true,
            Some("Encoder") => record.existing.encoder = true,
            _ => {}
        }
    }
}

fn describe_item(item: &Item) -> &'static str {
    match item {
        Item::Enum(_) => "an enum",
        Item::Union(_) => "a union",
        Item::Fn(_) => "a function",
        Item::Trait(_) | Item::TraitAlias(_) => "a trait",
        Item::Impl(_) => "an impl block",
        Item::Type(_) => "a type alias",
        Item::Const(_) | Item::Static(_) => "a constant",
        Item::Use(_) | Item::ExternCrate(_) => "an import",
        Item::Macro(_) => "a macro invocation",
        _ => "an unsupported item",
    }
}

/// Inspects a declaration, returning its record and stored fields.
///
/// # Errors
///
/// Returns [`SynthesisError::UnsupportedDeclaration`] unless the declaration
/// is a simple aggregate record, or [`SynthesisError::InvalidAttribute`] for
/// malformed field options.
pub fn inspect(macro_name: &str, item: &Item) -> Result<Inspection, SynthesisError> {
    let record = match classify(item) {
        DeclShape::AggregateRecord(record) => *record,
        DeclShape::Unsupported { kind, span } => {
            debug!("`{macro_name}` rejected {kind}");
            return Err(SynthesisError::UnsupportedDeclaration {
                macro_name: macro_name.to_string(),
                kind,
                span,
            });
        }
    };

    let (fields, diagnostics) = describe_fields(&record.item)?;
    debug!(
        "inspected `{}`: {} field(s), existing mapping: {}",
        record.ident(),
        fields.len(),
        record.existing.key_mapping.is_some()
    );

    Ok(Inspection {
        record,
        fields,
        diagnostics,
    })
}

/// Extracts field descriptors in declaration order.
///
/// # Errors
///
/// Returns an error for malformed options, conflicting options, or
/// duplicated field names.
pub fn describe_fields(
    item: &ItemStruct,
) -> Result<(Vec<FieldDescriptor>, Vec<Diagnostic>), SynthesisError> {
    let mut fields = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();

    for field in &item.fields {
        let Some(name) = field.ident.clone() else {
            continue;
        };
        if !seen.insert(name.to_string()) {
            return Err(SynthesisError::invalid_attribute(
                name.span(),
                format!("field `{name}` is declared more than once"),
            ));
        }

        let options = FieldOptions::from_attrs(&field.attrs)?;
        let initializer = match (options.secure, options.default) {
            (true, Some(default)) => {
                return Err(SynthesisError::invalid_attribute(
                    default.span(),
                    "a secure-storage field is computed and cannot have a default",
                ));
            }
            (true, None) => Some(Initializer::Accessor),
            (false, default) => default.map(Initializer::Value),
        };

        if options.skip && options.rename.is_some() {
            diagnostics.push(Diagnostic::new(
                UNUSED_OPTION_CODE,
                UNUSED_OPTION_NAME,
                Severity::Warning,
                field.span(),
                format!("`rename` on skipped field `{name}` has no effect"),
            ));
        }

        trace!(
            "field `{name}`: excluded={}, initializer={}",
            options.skip,
            initializer.is_some()
        );

        fields.push(FieldDescriptor {
            declared_type: DeclaredType::new(field.ty.clone()),
            initializer,
            is_excluded: options.skip,
            mutability: if options.readonly {
                Mutability::Immutable
            } else {
                Mutability::Mutable
            },
            rename: options.rename,
            span: field.span(),
            name,
        });
    }

    Ok((fields, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn shape_kind(item: &Item) -> Option<String> {
        match classify(item) {
            DeclShape::AggregateRecord(_) => None,
            DeclShape::Unsupported { kind, .. } => Some(kind),
        }
    }

    #[test]
    fn test_classifies_named_struct() {
        let item: Item = parse_quote! {
            struct Account { id: u64 }
        };
        assert!(shape_kind(&item).is_none());
    }

    #[test]
    fn test_rejects_other_shapes() {
        let cases: Vec<(Item, &str)> = vec![
            (parse_quote!(enum Kind { A, B }), "an enum"),
            (parse_quote!(struct Pair(u8, u8);), "a tuple struct"),
            (parse_quote!(struct Marker;), "a unit struct"),
            (parse_quote!(fn run() {}), "a function"),
            (parse_quote!(mod external;), "a module without an inline body"),
            (
                parse_quote!(mod two { struct A { x: u8 } struct B { y: u8 } }),
                "a module containing 2 structs",
            ),
        ];
        for (item, expected) in cases {
            assert_eq!(shape_kind(&item).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_inspect_reports_unsupported_declaration() {
        let item: Item = parse_quote!(enum Kind { A });
        let err = inspect("codable", &item).unwrap_err();
        assert!(matches!(err, SynthesisError::UnsupportedDeclaration { .. }));
    }

    #[test]
    fn test_extracts_fields_in_order() {
        let item: Item = parse_quote! {
            struct Profile {
                #[codable(readonly, default = 1)]
                id: u64,
                #[codable(skip)]
                cache: Vec<u8>,
                nickname: Option<String>,
                #[secure(key = "token")]
                token: Option<String>,
            }
        };
        let inspection = inspect("codable", &item).expect("inspection should succeed");
        let names: Vec<String> = inspection
            .fields
            .iter()
            .map(|f| f.name.to_string())
            .collect();
        assert_eq!(names, vec!["id", "cache", "nickname", "token"]);

        let id = &inspection.fields[0];
        assert!(id.has_initializer());
        assert_eq!(id.mutability, Mutability::Immutable);

        assert!(inspection.fields[1].is_excluded);
        assert!(inspection.fields[2].declared_type.is_optional);
        assert!(inspection.fields[3].is_accessor());
        assert!(inspection.fields[3].has_initializer());
        assert!(inspection.diagnostics.is_empty());
    }

    #[test]
    fn test_secure_field_with_default_is_rejected() {
        let item: Item = parse_quote! {
            struct Settings {
                #[secure("token")]
                #[codable(default = None)]
                token: Option<String>,
            }
        };
        let err = inspect("codable", &item).unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_rename_on_skipped_field_warns() {
        let item: Item = parse_quote! {
            struct Settings {
                #[codable(skip, rename = "x")]
                cache: u8,
            }
        };
        let inspection = inspect("codable", &item).expect("inspection should succeed");
        assert_eq!(inspection.diagnostics.len(), 1);
        assert_eq!(inspection.diagnostics[0].name, UNUSED_OPTION_NAME);
    }

    #[test]
    fn test_existing_mapping_attribute_is_recorded() {
        let item: Item = parse_quote! {
            #[coding_keys(id)]
            struct Account { id: u64 }
        };
        let inspection = inspect("codable", &item).expect("inspection should succeed");
        assert!(inspection.record.existing.key_mapping.is_some());
    }

    #[test]
    fn test_member_block_is_scanned() {
        let item: Item = parse_quote! {
            mod account {
                pub struct Account { pub id: u64 }

                enum CodingKeys { id }

                impl Account {
                    pub fn init(decoder: &Decoder<'_>) -> Self { todo!() }
                }

                impl Clone for Account {
                    fn clone(&self) -> Self { todo!() }
                }
            }
        };
        let inspection = inspect("codable", &item).expect("inspection should succeed");
        let existing = &inspection.record.existing;
        assert!(existing.key_mapping.is_some());
        assert!(existing.decode_initializer);
        assert!(!existing.encoder);
        assert_eq!(existing.conformances, vec!["Clone".to_string()]);
    }

    #[test]
    fn test_only_decoder_and_encoder_params_count() {
        let item: Item = parse_quote! {
            mod account {
                pub struct Account { pub id: u64 }

                impl Account {
                    pub fn configure(config: DecoderConfig) -> Self { todo!() }
                    pub fn merge(others: &Decoders) -> Self { todo!() }
                    pub fn write_to(&self, sink: &mut EncoderPool) {}
                }
            }
        };
        let inspection = inspect("codable", &item).expect("inspection should succeed");
        assert!(!inspection.record.existing.decode_initializer);
        assert!(!inspection.record.existing.encoder);

        let item: Item = parse_quote! {
            mod account {
                pub struct Account { pub id: u64 }

                impl Account {
                    pub fn read(source: codable_synth::Decoder<'_>) -> Self { todo!() }
                    pub fn write(&self, sink: &mut codable_synth::Encoder) {}
                }
            }
        };
        let inspection = inspect("codable", &item).expect("inspection should succeed");
        assert!(inspection.record.existing.decode_initializer);
        assert!(inspection.record.existing.encoder);
    }
}
