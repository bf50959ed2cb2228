//! Engine-internal model of an inspected declaration.

use proc_macro2::Span;
use syn::{Expr, Generics, Ident, Item, ItemStruct, Type};

/// Mutability of a stored field after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    /// Never reassigned once the value exists (`#[codable(readonly)]`).
    Immutable,
    /// Freely reassignable.
    Mutable,
}

/// How a field obtains its value without decoding.
#[derive(Debug, Clone)]
pub enum Initializer {
    /// Inline default expression (`#[codable(default = expr)]`).
    Value(Expr),
    /// Computed accessor body; the field has no storage of its own.
    Accessor,
}

/// The declared type of a field.
#[derive(Debug, Clone)]
pub struct DeclaredType {
    /// The type as written.
    pub ty: Type,
    /// Whether the type is `Option<T>`.
    pub is_optional: bool,
    /// `T` for `Option<T>`, otherwise the type itself.
    pub inner: Type,
}

impl DeclaredType {
    /// Builds a type descriptor, detecting `Option<T>`.
    #[must_use]
    pub fn new(ty: Type) -> Self {
        match option_inner(&ty) {
            Some(inner) => Self {
                inner: inner.clone(),
                is_optional: true,
                ty,
            },
            None => Self {
                inner: ty.clone(),
                is_optional: false,
                ty,
            },
        }
    }
}

/// Returns `T` if `ty` is `Option<T>` (also `std::option::Option<T>`).
#[must_use]
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// One stored field of an inspected declaration.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field identifier.
    pub name: Ident,
    /// Declared type.
    pub declared_type: DeclaredType,
    /// Inline default or accessor body, if any.
    pub initializer: Option<Initializer>,
    /// Whether the field carries the exclusion marker.
    pub is_excluded: bool,
    /// Mutability after initialization.
    pub mutability: Mutability,
    /// Serialization key override.
    pub rename: Option<String>,
    /// Span of the field declaration.
    pub span: Span,
}

impl FieldDescriptor {
    /// True if the field has an inline default or a computed accessor body.
    #[must_use]
    pub fn has_initializer(&self) -> bool {
        self.initializer.is_some()
    }

    /// True if the field is computed and has no storage.
    #[must_use]
    pub fn is_accessor(&self) -> bool {
        matches!(self.initializer, Some(Initializer::Accessor))
    }

    /// The field name without a raw-identifier prefix.
    #[must_use]
    pub fn plain_name(&self) -> String {
        let name = self.name.to_string();
        name.strip_prefix("r#").map_or(name.clone(), str::to_string)
    }

    /// The serialization key: the rename override or the field name.
    #[must_use]
    pub fn serialization_key(&self) -> String {
        self.rename.clone().unwrap_or_else(|| self.plain_name())
    }
}

/// Generated members the declaration already provides.
#[derive(Debug, Clone, Default)]
pub struct ExistingMembers {
    /// Span of an existing key mapping, if one exists.
    pub key_mapping: Option<Span>,
    /// Whether a decoder initializer already exists.
    pub decode_initializer: bool,
    /// Whether an encoder already exists.
    pub encoder: bool,
    /// Last path segments of traits already implemented in the member block.
    pub conformances: Vec<String>,
}

/// Where the record came from, so it can be reassembled after synthesis.
#[derive(Debug, Clone)]
pub enum Container {
    /// A bare struct item.
    Struct,
    /// An inline module; `index` is the position of the struct in its body.
    Module {
        /// The module item as written.
        module: syn::ItemMod,
        /// Position of the record's struct inside the module body.
        index: usize,
    },
}

/// An aggregate record: a struct with named fields and its member block.
#[derive(Debug, Clone)]
pub struct Record {
    /// The struct declaration.
    pub item: ItemStruct,
    /// Where the struct lives.
    pub container: Container,
    /// Generated members already present.
    pub existing: ExistingMembers,
}

impl Record {
    /// The record's type name.
    #[must_use]
    pub fn ident(&self) -> &Ident {
        &self.item.ident
    }

    /// The record's generics.
    #[must_use]
    pub fn generics(&self) -> &Generics {
        &self.item.generics
    }

    /// Name of the synthesized key type (`<Name>CodingKeys`).
    #[must_use]
    pub fn coding_keys_ident(&self) -> Ident {
        coding_keys_ident(&self.item.ident)
    }

    /// Puts the (rewritten) struct and generated items back in place.
    ///
    /// For a module container the generated items are appended to the
    /// module body; otherwise they follow the struct.
    #[must_use]
    pub fn reassemble(&self, item: ItemStruct, generated: Vec<Item>) -> Vec<Item> {
        match &self.container {
            Container::Struct => {
                let mut items = vec![Item::Struct(item)];
                items.extend(generated);
                items
            }
            Container::Module { module, index } => {
                let mut module = module.clone();
                if let Some((_, body)) = module.content.as_mut() {
                    if let Some(slot) = body.get_mut(*index) {
                        *slot = Item::Struct(item);
                    }
                    body.extend(generated);
                }
                vec![Item::Mod(module)]
            }
        }
    }
}

/// Name of the key type synthesized for `ident`.
#[must_use]
pub fn coding_keys_ident(ident: &Ident) -> Ident {
    let name = ident.to_string();
    let name = name.strip_prefix("r#").unwrap_or(&name);
    Ident::new(&format!("{name}CodingKeys"), ident.span())
}
