//! Utility functions shared by the synthesis stages and transformers.

pub mod attributes;
pub mod generics;
pub mod paths;

// Re-export commonly used utilities for transformer implementations
#[doc(inline)]
pub use attributes::{find_attr, strip_attrs, FieldOptions};
#[doc(inline)]
pub use generics::with_field_bounds;
#[doc(inline)]
pub use paths::{last_segment, path_to_string};
