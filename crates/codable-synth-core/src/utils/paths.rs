//! Path utilities for declaration inspection.

use syn::{Path, Type};

/// Converts a syn Path to a string representation.
///
/// # Example
///
/// ```ignore
/// // For path `codable_synth::Codable`
/// let s = path_to_string(&path);
/// assert_eq!(s, "codable_synth::Codable");
/// ```
#[must_use]
pub fn path_to_string(path: &Path) -> String {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// Returns the last segment identifier of a path as a string.
#[must_use]
pub fn last_segment(path: &Path) -> Option<String> {
    path.segments.last().map(|seg| seg.ident.to_string())
}

/// Returns the last path segment of a type like `a::b::Name<T>`.
#[must_use]
pub fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => last_segment(&type_path.path),
        Type::Group(group) => type_name(&group.elem),
        Type::Paren(paren) => type_name(&paren.elem),
        _ => None,
    }
}
