use glam::DVec3;
use serde_json::{Map, Value};
use thiserror::Error;

/// A field value that does not have the expected shape.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("field {key:?} should be {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("field {key:?} should not be a zero vector")]
    ZeroVector { key: String },
}

/// Typed read access to the key-value block of a catalog record.
///
/// Getters return `Ok(None)` for missing keys and an error if the key exists but holds a value of
/// the wrong type. Keys are case-sensitive.
#[derive(Clone, Copy, Debug)]
pub struct FieldBlock<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> FieldBlock<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Returns [`None`] if `value` is not a JSON object.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(Self::new)
    }

    pub fn contains(self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn number(self, key: &str) -> Result<Option<f64>, FieldError> {
        self.get(key, "a number", Value::as_f64)
    }

    pub fn string(self, key: &str) -> Result<Option<&'a str>, FieldError> {
        self.get(key, "a string", Value::as_str)
    }

    pub fn boolean(self, key: &str) -> Result<Option<bool>, FieldError> {
        self.get(key, "a boolean", Value::as_bool)
    }

    /// Reads an array of exactly three numbers.
    pub fn vector(self, key: &str) -> Result<Option<DVec3>, FieldError> {
        self.get(key, "a vector of 3 numbers", |value| {
            match value.as_array()?.as_slice() {
                [x, y, z] => Some(DVec3::new(x.as_f64()?, y.as_f64()?, z.as_f64()?)),
                _ => None,
            }
        })
    }

    /// Reads a vector and normalizes it.
    pub fn direction(self, key: &str) -> Result<Option<DVec3>, FieldError> {
        self.vector(key)?
            .map(|vector| {
                vector.try_normalize().ok_or_else(|| FieldError::ZeroVector {
                    key: key.to_owned(),
                })
            })
            .transpose()
    }

    fn get<T>(
        self,
        key: &str,
        expected: &'static str,
        convert: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, FieldError> {
        self.map
            .get(key)
            .map(|value| {
                convert(value).ok_or_else(|| FieldError::WrongType {
                    key: key.to_owned(),
                    expected,
                })
            })
            .transpose()
    }
}
