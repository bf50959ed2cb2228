//! Integration tests for the literal macros.

use codable_synth::{base64_decoded, base64_encoded, checked_url};

#[test]
fn base64_literal_decodes_back() {
    assert_eq!(base64_encoded!("food").as_deref(), Some("food"));
    assert_eq!(base64_encoded!("").as_deref(), Some(""));
    assert_eq!(
        base64_encoded!(r"päss/wörd+").as_deref(),
        Some("päss/wörd+")
    );
}

#[test]
fn runtime_decoder_matches_the_macro() {
    assert_eq!(base64_decoded("Zm9vZA=="), base64_encoded!("food"));
}

#[test]
fn checked_url_yields_a_parsed_url() {
    let url = checked_url!("https://example.com:8443/a/b?q=1");
    assert_eq!(url.scheme(), "https");
    assert_eq!(url.host_str(), Some("example.com"));
    assert_eq!(url.port(), Some(8443));
    assert_eq!(url.path(), "/a/b");
    assert_eq!(url.query(), Some("q=1"));
}
