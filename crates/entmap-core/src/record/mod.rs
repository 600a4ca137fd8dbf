//! Module: record
//! Responsibility: normalize raw, storage-keyed input into one lookup shape.
//! Does not own: field aliasing (see `entity`) or identity extraction (see `cache`).
//!
//! Accepted input shapes:
//! - an ordered mapping (`Value::Map`, JSON object),
//! - a sequence of `[key, value]` pairs with text keys.


use crate::{
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
    value::Value,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// RecordError
///

#[derive(Debug, ThisError)]
pub enum RecordError {
    #[error("unsupported record shape: expected a mapping or key/value pairs, found {found}")]
    UnsupportedShape { found: &'static str },

    #[error("unsupported record shape: pair at index {index} is not a [text key, value] pair")]
    MalformedPair { index: usize },
}

impl From<RecordError> for InternalError {
    fn from(err: RecordError) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Record,
            ErrorKind::UnsupportedRecordShape,
            err.to_string(),
        )
    }
}

///
/// RawRecord
///
/// Transient key/value record as produced by a record source. Keys are
/// usually storage field names but exposed names are accepted too.
/// Duplicate keys collapse to the last written value.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRecord {
    entries: BTreeMap<String, Value>,
}

impl RawRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    /// Insert one entry, replacing any previous value under the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a key; `Null` values count as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Normalize any supported raw shape into a record.
    pub fn try_from_value(value: Value) -> Result<Self, InternalError> {
        match value {
            Value::Map(entries) => Ok(Self::from_pairs(entries)),
            Value::List(items) => {
                let mut record = Self::new();
                for (index, item) in items.into_iter().enumerate() {
                    let (key, value) = split_pair(item).ok_or(RecordError::MalformedPair { index })?;
                    record.insert(key, value);
                }
                Ok(record)
            }
            other => Err(RecordError::UnsupportedShape {
                found: other.type_label(),
            }
            .into()),
        }
    }
}

// Split a `[text key, value]` list into its parts.
fn split_pair(item: Value) -> Option<(String, Value)> {
    let Value::List(parts) = item else {
        return None;
    };
    let [key, value]: [Value; 2] = parts.try_into().ok()?;

    match key {
        Value::Text(key) => Some((key, value)),
        _ => None,
    }
}

impl TryFrom<Value> for RawRecord {
    type Error = InternalError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::try_from_value(value)
    }
}

impl TryFrom<serde_json::Value> for RawRecord {
    type Error = InternalError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Self::try_from_value(Value::from(json))
    }
}

impl From<BTreeMap<String, Value>> for RawRecord {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
