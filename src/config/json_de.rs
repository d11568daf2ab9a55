//! Serde Deserializer over the lenient JSON AST.
//!
//! This lets the `#[derive(Deserialize)]` schema structs decode straight
//! from [`Json`] values, so the relaxed dialect never has to be re-printed
//! into strict JSON first.

use core::fmt;
use std::collections::hash_map;

use serde::de::{self, Deserialize, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::forward_to_deserialize_any;

use super::parser::Json;

/// Error produced while decoding a schema struct from a [`Json`] value.
#[derive(Debug)]
pub struct DeError {
    message: String,
}

impl DeError {
    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl de::Error for DeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self {
            message: msg.to_string(),
        }
    }
}

impl fmt::Display for DeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DeError {}

/// Deserializes any `T: Deserialize` from a parsed [`Json`] value.
///
/// # Errors
///
/// Returns a [`DeError`] when the value's shape does not match `T`.
pub fn from_json<T: for<'de> Deserialize<'de>>(json: &Json) -> Result<T, DeError> {
    T::deserialize(JsonDeserializer { json })
}

struct JsonDeserializer<'a> {
    json: &'a Json,
}

impl<'de> serde::Deserializer<'de> for JsonDeserializer<'_> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.json {
            Json::Invalid => Err(de::Error::custom("invalid JSON value")),
            Json::Null => visitor.visit_unit(),
            Json::Bool(b) => visitor.visit_bool(*b),
            Json::Str(s) => visitor.visit_str(s),
            Json::Int(i) => visitor.visit_i64(*i),
            Json::Float(f) => visitor.visit_f64(*f),
            Json::Array(arr) => visitor.visit_seq(SeqAccessImpl {
                iter: arr.iter(),
                len: arr.len(),
            }),
            Json::Object(obj) => visitor.visit_map(MapAccessImpl {
                iter: obj.iter(),
                next_value: None,
            }),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.json {
            Json::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple tuple_struct
        map struct enum identifier ignored_any
    }
}

struct SeqAccessImpl<'a> {
    iter: std::slice::Iter<'a, Json>,
    len: usize,
}

impl<'de> SeqAccess<'de> for SeqAccessImpl<'_> {
    type Error = DeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.iter.next() {
            Some(next) => seed.deserialize(JsonDeserializer { json: next }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len)
    }
}

struct MapAccessImpl<'a> {
    iter: hash_map::Iter<'a, String, Json>,
    next_value: Option<&'a Json>,
}

impl<'de> MapAccess<'de> for MapAccessImpl<'_> {
    type Error = DeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.iter.next() {
            Some((key, value)) => {
                self.next_value = Some(value);
                seed.deserialize(key.as_str().into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        match self.next_value.take() {
            Some(value) => seed.deserialize(JsonDeserializer { json: value }),
            None => Err(de::Error::custom("value is missing for key")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_json;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Sample {
        name: String,
        rows: [Vec<bool>; 2],
        #[serde(default)]
        scale: f64,
        map: HashMap<String, Vec<String>>,
    }

    #[test]
    fn decodes_nested_shapes() {
        let (json, errors) = parse_json(
            r#"{
                "name": "pad", // comment
                "rows": [[true, false], [false, true],],
                "scale": 1,
                "map": {"a": ["x", "y"],},
            }"#,
        );
        assert!(errors.is_empty(), "{errors:?}");
        let sample: Sample = from_json(&json.expect("value")).expect("decodes");
        assert_eq!(sample.name, "pad");
        assert_eq!(sample.rows[1], vec![false, true]);
        assert!((sample.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(sample.map["a"], vec!["x", "y"]);
    }

    #[test]
    fn reports_shape_mismatches() {
        let (json, _) = parse_json("[1, 2]");
        let err = from_json::<Sample>(&json.expect("value")).unwrap_err();
        assert!(!err.message().is_empty());
    }
}
