//! Integration tests for the synthesized coding code.
//!
//! Each type below goes through the real attribute macros; the tests then
//! drive the generated impls through the public runtime.

use codable_synth::{codable, codable_ignore_initialized, coding_keys, Codable, CodingKey, DecodingError, KeyMapped};
use serde_json::json;

#[codable]
#[derive(Debug, PartialEq)]
struct Profile {
    name: String,
    #[codable(rename = "nick")]
    nickname: Option<String>,
    #[codable(skip)]
    cache: Vec<u8>,
}

// `id` is immutable with a default, so it is left out of the keys and
// reported with a warning at the field.
#[codable_ignore_initialized]
#[derive(Debug)]
struct Widget {
    #[codable(readonly, default = 7)]
    id: u32,
    bar: i64,
    #[codable(readonly)]
    baz: String,
}

#[codable]
#[derive(Debug, PartialEq)]
struct Settings {
    theme: String,
    #[codable(default = 3)]
    retries: u8,
}

#[codable(conform())]
#[derive(Debug)]
struct Unmarked {
    value: i32,
}

#[codable]
#[derive(Debug, PartialEq)]
struct Wrapper<T> {
    value: T,
    #[codable(rename = "next")]
    fallback: Option<T>,
}

#[coding_keys(id, title = "headline")]
#[allow(dead_code)]
struct Article {
    id: u64,
    title: String,
    body: String,
}

#[codable]
mod account {
    use codable_synth::{Decodable, Decoder, DecodingError};

    #[derive(Debug)]
    pub struct Account {
        pub id: u64,
        pub label: String,
    }

    impl Decodable for Account {
        fn init_from(decoder: &Decoder<'_>) -> Result<Self, DecodingError> {
            let container = decoder.container::<AccountCodingKeys>()?;
            let id: u64 = container.decode(AccountCodingKeys::id)?;
            let label = container
                .decode_if_present(AccountCodingKeys::label)?
                .unwrap_or_else(|| format!("account-{id}"));
            Ok(Self { id, label })
        }
    }
}

fn assert_codable<T: Codable>() {}

#[test]
fn decodes_required_and_optional_fields() {
    let profile: Profile =
        codable_synth::from_value(&json!({ "name": "Ada", "nick": "countess" })).unwrap();
    assert_eq!(
        profile,
        Profile {
            name: "Ada".into(),
            nickname: Some("countess".into()),
            cache: Vec::new(),
        }
    );

    let profile: Profile = codable_synth::from_str(r#"{ "name": "Grace" }"#).unwrap();
    assert_eq!(profile.nickname, None);
}

#[test]
fn missing_required_key_propagates() {
    let err = codable_synth::from_value::<Profile>(&json!({ "nick": "x" })).unwrap_err();
    assert!(matches!(err, DecodingError::KeyNotFound { key: "name" }));
}

#[test]
fn mismatched_type_propagates() {
    let err = codable_synth::from_value::<Profile>(&json!({ "name": 1 })).unwrap_err();
    assert!(matches!(err, DecodingError::TypeMismatch { key: "name", .. }));
}

#[test]
fn invalid_json_is_a_syntax_error() {
    let err = codable_synth::from_str::<Profile>("{ name").unwrap_err();
    assert!(matches!(err, DecodingError::Syntax(_)));
}

#[test]
fn keys_follow_renames_and_skips() {
    let keys: Vec<&str> = <Profile as KeyMapped>::CodingKeys::all_keys()
        .iter()
        .map(|key| key.string_value())
        .collect();
    assert_eq!(keys, vec!["name", "nick"]);
    assert_eq!(
        ProfileCodingKeys::from_string_value("nick"),
        Some(ProfileCodingKeys::nickname)
    );
}

#[test]
fn encodes_through_the_same_keys() {
    let profile = Profile {
        name: "Ada".into(),
        nickname: None,
        cache: vec![1, 2, 3],
    };
    assert_eq!(
        codable_synth::to_value(&profile).unwrap(),
        json!({ "name": "Ada" })
    );

    let text = codable_synth::to_string(&Profile {
        nickname: Some("countess".into()),
        ..profile
    })
    .unwrap();
    let back: Profile = codable_synth::from_str(&text).unwrap();
    assert_eq!(back.nickname.as_deref(), Some("countess"));
}

#[test]
fn initialized_immutable_field_is_never_decoded() {
    let keys: Vec<&str> = WidgetCodingKeys::all_keys()
        .iter()
        .map(|key| key.string_value())
        .collect();
    assert_eq!(keys, vec!["bar", "baz"]);

    let widget: Widget =
        codable_synth::from_value(&json!({ "id": 99, "bar": -4, "baz": "b" })).unwrap();
    assert_eq!(widget.id, 7);
    assert_eq!(widget.bar, -4);
    assert_eq!(widget.baz, "b");

    let err = codable_synth::from_value::<Widget>(&json!({ "bar": 1 })).unwrap_err();
    assert!(matches!(err, DecodingError::KeyNotFound { key: "baz" }));
}

#[test]
fn initialized_field_keeps_its_default_on_decode() {
    let settings: Settings =
        codable_synth::from_value(&json!({ "theme": "dark", "retries": 9 })).unwrap();
    assert_eq!(settings.retries, 3);

    // still encoded: the field is a key
    assert_eq!(
        codable_synth::to_value(&settings).unwrap(),
        json!({ "theme": "dark", "retries": 3 })
    );
}

#[test]
fn codable_marker_is_implemented() {
    assert_codable::<Profile>();
    assert_codable::<Widget>();
    assert_codable::<account::Account>();
    assert_codable::<Wrapper<u32>>();
}

#[test]
fn generic_fields_round_trip() {
    let wrapper: Wrapper<u32> =
        codable_synth::from_value(&json!({ "value": 1, "next": 2 })).unwrap();
    assert_eq!(
        wrapper,
        Wrapper {
            value: 1,
            fallback: Some(2),
        }
    );

    let text = codable_synth::to_string(&Wrapper {
        value: "a".to_string(),
        fallback: None,
    })
    .unwrap();
    assert_eq!(text, r#"{"value":"a"}"#);
    let back: Wrapper<String> = codable_synth::from_str(&text).unwrap();
    assert_eq!(back.fallback, None);
}

#[test]
fn empty_conform_still_decodes_and_encodes() {
    let value: Unmarked = codable_synth::from_value(&json!({ "value": 5 })).unwrap();
    assert_eq!(value.value, 5);
    assert_eq!(
        codable_synth::to_value(&value).unwrap(),
        json!({ "value": 5 })
    );
}

#[test]
fn explicit_coding_keys() {
    let keys: Vec<&str> = ArticleCodingKeys::all_keys()
        .iter()
        .map(|key| key.string_value())
        .collect();
    assert_eq!(keys, vec!["id", "headline"]);
    assert_eq!(ArticleCodingKeys::title.string_value(), "headline");
}

#[test]
fn module_form_keeps_handwritten_decoder() {
    let account: account::Account = codable_synth::from_value(&json!({ "id": 3 })).unwrap();
    assert_eq!(account.label, "account-3");

    assert_eq!(
        codable_synth::to_value(&account).unwrap(),
        json!({ "id": 3, "label": "account-3" })
    );
}
