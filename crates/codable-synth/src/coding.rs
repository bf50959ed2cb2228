//! Runtime support for synthesized decoding and encoding.
//!
//! Generated impls read and write through keyed containers over a JSON
//! object. Keys are typed: a container only accepts the key enum
//! synthesized for its type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use thiserror::Error;

/// A serialization key of a type.
///
/// Implemented by the key enum `#[coding_keys]` generates.
pub trait CodingKey: Copy + Eq + 'static {
    /// The key as written in the serialized form.
    fn string_value(self) -> &'static str;

    /// Every key, in declaration order.
    fn all_keys() -> &'static [Self];

    /// Looks a key up by its serialized form.
    fn from_string_value(value: &str) -> Option<Self> {
        Self::all_keys()
            .iter()
            .copied()
            .find(|key| key.string_value() == value)
    }
}

/// Connects a type to its key enum.
pub trait KeyMapped {
    /// The key enum of this type.
    type CodingKeys: CodingKey;
}

/// A type that can be built from a [`Decoder`].
pub trait Decodable: Sized {
    /// Builds a value from the decoder's data.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or a value has the
    /// wrong type.
    fn init_from(decoder: &Decoder<'_>) -> Result<Self, DecodingError>;
}

/// A type that can write itself into an [`Encoder`].
pub trait Encodable {
    /// Writes this value's keys into the encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be serialized.
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodingError>;
}

/// Marker for types that both decode and encode.
pub trait Codable: Decodable + Encodable {}

/// Errors raised by generated decoders.
#[derive(Debug, Error)]
pub enum DecodingError {
    /// A required key is absent.
    #[error("key `{key}` not found")]
    KeyNotFound {
        /// The missing key.
        key: &'static str,
    },

    /// A value does not match the field's type.
    #[error("value for key `{key}` has the wrong type: {source}")]
    TypeMismatch {
        /// The offending key.
        key: &'static str,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },

    /// The data is not shaped like a keyed container.
    #[error("data corrupted: {message}")]
    DataCorrupted {
        /// What was found instead.
        message: String,
    },

    /// The input is not valid JSON.
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
}

/// Errors raised by generated encoders.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A value could not be serialized.
    #[error("value for key `{key}` could not be encoded: {source}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// Underlying serialization error.
        source: serde_json::Error,
    },

    /// The encoded value could not be rendered.
    #[error("failed to render JSON: {0}")]
    Render(#[from] serde_json::Error),
}

/// Read access to serialized data.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    value: &'a Value,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over a JSON value.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// The underlying value.
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Opens the data as a container keyed by `K`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::DataCorrupted`] unless the data is an object.
    pub fn container<K: CodingKey>(&self) -> Result<KeyedDecodingContainer<'a, K>, DecodingError> {
        match self.value {
            Value::Object(map) => Ok(KeyedDecodingContainer {
                map,
                keys: PhantomData,
            }),
            other => Err(DecodingError::DataCorrupted {
                message: format!("expected an object, found {}", describe(other)),
            }),
        }
    }
}

/// A JSON object read through typed keys.
#[derive(Debug)]
pub struct KeyedDecodingContainer<'a, K> {
    map: &'a Map<String, Value>,
    keys: PhantomData<K>,
}

impl<K: CodingKey> KeyedDecodingContainer<'_, K> {
    /// Whether the key is present, even if its value is `null`.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(key.string_value())
    }

    /// Known keys present in the data, in key declaration order.
    #[must_use]
    pub fn all_keys(&self) -> Vec<K> {
        K::all_keys()
            .iter()
            .copied()
            .filter(|key| self.contains(*key))
            .collect()
    }

    /// Reads a required value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::KeyNotFound`] if the key is absent, or
    /// [`DecodingError::TypeMismatch`] if the value does not fit `T`.
    pub fn decode<T: DeserializeOwned>(&self, key: K) -> Result<T, DecodingError> {
        let name = key.string_value();
        let raw = self
            .map
            .get(name)
            .ok_or(DecodingError::KeyNotFound { key: name })?;
        Deserialize::deserialize(raw).map_err(|source| DecodingError::TypeMismatch { key: name, source })
    }

    /// Reads an optional value; an absent key or `null` yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::TypeMismatch`] if a present value does not
    /// fit `T`.
    pub fn decode_if_present<T: DeserializeOwned>(&self, key: K) -> Result<Option<T>, DecodingError> {
        let name = key.string_value();
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => Deserialize::deserialize(raw)
                .map(Some)
                .map_err(|source| DecodingError::TypeMismatch { key: name, source }),
        }
    }
}

/// Write access for serialized data.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    map: Map<String, Value>,
}

impl Encoder {
    /// Creates an empty encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a container keyed by `K`.
    pub fn container<K: CodingKey>(&mut self) -> KeyedEncodingContainer<'_, K> {
        KeyedEncodingContainer {
            map: &mut self.map,
            keys: PhantomData,
        }
    }

    /// The encoded object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }
}

/// A JSON object written through typed keys.
#[derive(Debug)]
pub struct KeyedEncodingContainer<'a, K> {
    map: &'a mut Map<String, Value>,
    keys: PhantomData<K>,
}

impl<K: CodingKey> KeyedEncodingContainer<'_, K> {
    /// Writes a value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::InvalidValue`] if the value cannot be
    /// serialized.
    pub fn encode<T: Serialize + ?Sized>(&mut self, key: K, value: &T) -> Result<(), EncodingError> {
        let name = key.string_value();
        let encoded = serde_json::to_value(value)
            .map_err(|source| EncodingError::InvalidValue { key: name, source })?;
        self.map.insert(name.to_string(), encoded);
        Ok(())
    }

    /// Writes a value under `key` only if it is present.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::InvalidValue`] if the value cannot be
    /// serialized.
    pub fn encode_if_present<T: Serialize + ?Sized>(
        &mut self,
        key: K,
        value: Option<&T>,
    ) -> Result<(), EncodingError> {
        match value {
            Some(value) => self.encode(key, value),
            None => Ok(()),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decodes a value from JSON data.
///
/// # Errors
///
/// Returns the decoder's error.
pub fn from_value<T: Decodable>(value: &Value) -> Result<T, DecodingError> {
    T::init_from(&Decoder::new(value))
}

/// Decodes a value from JSON text.
///
/// # Errors
///
/// Returns [`DecodingError::Syntax`] for malformed JSON, otherwise the
/// decoder's error.
pub fn from_str<T: Decodable>(text: &str) -> Result<T, DecodingError> {
    let value: Value = serde_json::from_str(text)?;
    from_value(&value)
}

/// Encodes a value into a JSON object.
///
/// # Errors
///
/// Returns the encoder's error.
pub fn to_value<T: Encodable + ?Sized>(value: &T) -> Result<Value, EncodingError> {
    let mut encoder = Encoder::new();
    value.encode(&mut encoder)?;
    Ok(encoder.into_value())
}

/// Encodes a value into JSON text.
///
/// # Errors
///
/// Returns the encoder's error.
pub fn to_string<T: Encodable + ?Sized>(value: &T) -> Result<String, EncodingError> {
    Ok(serde_json::to_string(&to_value(value)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        Name,
        Nickname,
    }

    impl CodingKey for Key {
        fn string_value(self) -> &'static str {
            match self {
                Self::Name => "name",
                Self::Nickname => "nick",
            }
        }

        fn all_keys() -> &'static [Self] {
            &[Self::Name, Self::Nickname]
        }
    }

    #[test]
    fn from_string_value_finds_keys() {
        assert_eq!(Key::from_string_value("nick"), Some(Key::Nickname));
        assert_eq!(Key::from_string_value("nickname"), None);
    }

    #[test]
    fn decode_required_and_optional() {
        let data = json!({ "name": "Ada", "nick": null });
        let decoder = Decoder::new(&data);
        let container = decoder.container::<Key>().unwrap();

        let name: String = container.decode(Key::Name).unwrap();
        assert_eq!(name, "Ada");
        let nick: Option<String> = container.decode_if_present(Key::Nickname).unwrap();
        assert_eq!(nick, None);
        assert_eq!(container.all_keys(), vec![Key::Name, Key::Nickname]);
    }

    #[test]
    fn missing_required_key() {
        let data = json!({});
        let decoder = Decoder::new(&data);
        let container = decoder.container::<Key>().unwrap();
        let err = container.decode::<String>(Key::Name).unwrap_err();
        assert!(matches!(err, DecodingError::KeyNotFound { key: "name" }));

        let absent: Option<String> = container.decode_if_present(Key::Nickname).unwrap();
        assert!(absent.is_none());
    }

    #[test]
    fn type_mismatch() {
        let data = json!({ "name": 42, "nick": 7 });
        let decoder = Decoder::new(&data);
        let container = decoder.container::<Key>().unwrap();
        assert!(matches!(
            container.decode::<String>(Key::Name),
            Err(DecodingError::TypeMismatch { key: "name", .. })
        ));
        assert!(matches!(
            container.decode_if_present::<String>(Key::Nickname),
            Err(DecodingError::TypeMismatch { key: "nick", .. })
        ));
    }

    #[test]
    fn non_object_is_corrupted() {
        let data = json!([1, 2]);
        let err = Decoder::new(&data).container::<Key>().unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"data corrupted: expected an object, found an array");
    }

    #[test]
    fn encode_skips_absent_optionals() {
        let mut encoder = Encoder::new();
        {
            let mut container = encoder.container::<Key>();
            container.encode(Key::Name, "Ada").unwrap();
            container
                .encode_if_present::<String>(Key::Nickname, None)
                .unwrap();
        }
        assert_eq!(encoder.into_value(), json!({ "name": "Ada" }));
    }
}
