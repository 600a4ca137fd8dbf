use crate::{
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
    model::EntityModel,
    record::RawRecord,
    value::Value,
};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// IdentityKeyError
///

#[derive(Debug, ThisError)]
pub enum IdentityKeyError {
    #[error("record for '{entity}' is missing identity field '{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("identity field '{field}' of '{entity}' holds a {found}, expected an integer or text")]
    InvalidKey {
        entity: &'static str,
        field: &'static str,
        found: &'static str,
    },
}

impl From<IdentityKeyError> for InternalError {
    fn from(err: IdentityKeyError) -> Self {
        let (class, kind) = match err {
            IdentityKeyError::MissingField { .. } => {
                (ErrorClass::NotFound, ErrorKind::MissingIdentityField)
            }
            IdentityKeyError::InvalidKey { .. } => {
                (ErrorClass::Unsupported, ErrorKind::InvalidIdentityKey)
            }
        };

        Self::new(class, ErrorOrigin::Cache, kind, err.to_string())
    }
}

///
/// IdentityKey
///
/// Canonical identity value. Integers and canonical decimal text share one
/// key space, so `101` and `"101"` identify the same record.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IdentityKey {
    Int(i128),
    Text(String),
}

impl IdentityKey {
    /// Canonicalize a raw value. Returns the value's type label when the
    /// value cannot identify a record.
    pub fn try_from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Int(v) => Ok(Self::Int(i128::from(*v))),
            Value::Uint(v) => Ok(Self::Int(i128::from(*v))),
            Value::Text(s) => Ok(canonical_int(s).map_or_else(|| Self::Text(s.clone()), Self::Int)),
            other => Err(other.type_label()),
        }
    }

    /// Read the identity field of a raw record for one model.
    /// The raw record must carry the storage-side name of the identity field.
    pub fn extract(model: &EntityModel, record: &RawRecord) -> Result<Self, InternalError> {
        let field = model
            .identity_field()
            .map_or(model.identity_key, |f| f.storage);
        let value = record.get(field).ok_or(IdentityKeyError::MissingField {
            entity: model.entity_name,
            field,
        })?;

        Self::try_from_value(value).map_err(|found| {
            IdentityKeyError::InvalidKey {
                entity: model.entity_name,
                field,
                found,
            }
            .into()
        })
    }
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for IdentityKey {
    fn from(v: i64) -> Self {
        Self::Int(i128::from(v))
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        canonical_int(s).map_or_else(|| Self::Text(s.to_string()), Self::Int)
    }
}

// Decimal text without sign noise or leading zeros, within the i64..=u64
// range, is treated as an integer key.
fn canonical_int(s: &str) -> Option<i128> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let first = digits.bytes().next()?;

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if first == b'0' && (digits.len() > 1 || s.starts_with('-')) {
        return None;
    }

    let parsed = s.parse::<i128>().ok()?;
    (i128::from(i64::MIN)..=i128::from(u64::MAX))
        .contains(&parsed)
        .then_some(parsed)
}
