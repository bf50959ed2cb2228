//! Run-time side of the literal macros.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decodes a base64 string back into UTF-8 text.
///
/// This is what `base64_encoded!` expands to. Returns `None` if `encoded`
/// is not valid base64 or does not decode to UTF-8.
#[must_use]
pub fn base64_decoded(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
