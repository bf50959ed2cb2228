//! Generic bounds for synthesized impls.

use syn::visit::Visit;
use syn::{parse_quote, Generics, Ident, Path, Type, TypePath, WherePredicate};

struct TypeParamVisitor<'a> {
    params: &'a [Ident],
    used: Vec<Ident>,
}

impl<'ast> Visit<'ast> for TypeParamVisitor<'_> {
    fn visit_type_path(&mut self, node: &'ast TypePath) {
        if node.qself.is_none() && node.path.leading_colon.is_none() {
            if let Some(first) = node.path.segments.first() {
                if self.params.contains(&first.ident) && !self.used.contains(&first.ident) {
                    self.used.push(first.ident.clone());
                }
            }
        }
        syn::visit::visit_type_path(self, node);
    }
}

/// Type parameters of `generics` mentioned by any of `types`, in
/// declaration order.
#[must_use]
pub fn used_type_params<'a>(
    generics: &Generics,
    types: impl IntoIterator<Item = &'a Type>,
) -> Vec<Ident> {
    let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    if params.is_empty() {
        return Vec::new();
    }

    let mut visitor = TypeParamVisitor {
        params: &params,
        used: Vec::new(),
    };
    for ty in types {
        visitor.visit_type(ty);
    }
    let used = visitor.used;
    params
        .into_iter()
        .filter(|param| used.contains(param))
        .collect()
}

/// Copies `generics` with `T: bound` added for every type parameter the
/// given field types use.
#[must_use]
pub fn with_field_bounds<'a>(
    generics: &Generics,
    types: impl IntoIterator<Item = &'a Type>,
    bound: &Path,
) -> Generics {
    let mut bounded = generics.clone();
    let used = used_type_params(generics, types);
    if used.is_empty() {
        return bounded;
    }

    let where_clause = bounded.make_where_clause();
    for param in used {
        let predicate: WherePredicate = parse_quote!(#param: #bound);
        where_clause.predicates.push(predicate);
    }
    bounded
}
