//! Record sources: the only boundary between the mapping core and whatever
//! stores the raw records. Sources are synchronous; failures are surfaced
//! as-is and never retried or cached.

use crate::{
    cache::IdentityKey,
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
    record::RawRecord,
    value::Value,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// SourceError
///

#[derive(Debug, ThisError)]
pub enum SourceError {
    #[error("no {entity} record for id {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} source unavailable: {message}")]
    Unavailable { entity: String, message: String },
}

impl SourceError {
    pub fn not_found(entity: impl Into<String>, id: &Value) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_json().to_string(),
        }
    }

    pub fn unavailable(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            entity: entity.into(),
            message: message.into(),
        }
    }
}

impl From<SourceError> for InternalError {
    fn from(err: SourceError) -> Self {
        let (class, kind) = match err {
            SourceError::NotFound { .. } => (ErrorClass::NotFound, ErrorKind::RecordNotFound),
            SourceError::Unavailable { .. } => {
                (ErrorClass::Unavailable, ErrorKind::SourceUnavailable)
            }
        };

        Self::new(class, ErrorOrigin::Source, kind, err.to_string())
    }
}

///
/// RecordSource
///
/// Supplies raw records for one entity type by opaque id.
///

pub trait RecordSource: Send + Sync {
    fn fetch_by_id(&self, id: &Value) -> Result<RawRecord, SourceError>;
}

impl<F> RecordSource for F
where
    F: Fn(&Value) -> Result<RawRecord, SourceError> + Send + Sync,
{
    fn fetch_by_id(&self, id: &Value) -> Result<RawRecord, SourceError> {
        self(id)
    }
}

///
/// MemorySource
///
/// In-memory source keyed by canonical identity. Useful as a stub and in
/// tests.
///

#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    entity: String,
    records: BTreeMap<IdentityKey, RawRecord>,
}

impl MemorySource {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            records: BTreeMap::new(),
        }
    }

    /// Store a record under an id. Ids that cannot identify a record are
    /// rejected.
    pub fn insert(&mut self, id: impl Into<Value>, record: RawRecord) -> Result<(), InternalError> {
        let id = id.into();
        let key = IdentityKey::try_from_value(&id).map_err(|found| {
            InternalError::new(
                ErrorClass::Unsupported,
                ErrorOrigin::Source,
                ErrorKind::InvalidIdentityKey,
                format!("{} source cannot key records by a {found}", self.entity),
            )
        })?;

        self.records.insert(key, record);
        Ok(())
    }

    /// Builder form of [`Self::insert`].
    pub fn with(mut self, id: impl Into<Value>, record: RawRecord) -> Result<Self, InternalError> {
        self.insert(id, record)?;
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn fetch_by_id(&self, id: &Value) -> Result<RawRecord, SourceError> {
        IdentityKey::try_from_value(id)
            .ok()
            .and_then(|key| self.records.get(&key))
            .cloned()
            .ok_or_else(|| SourceError::not_found(&self.entity, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::author_record;

    #[test]
    fn memory_source_matches_text_and_integer_ids() {
        let source = MemorySource::new("Author")
            .with(101, author_record())
            .expect("integer id should key the record");

        let record = source
            .fetch_by_id(&Value::Text("101".into()))
            .expect("text id should find the record");
        assert_eq!(record, author_record());
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn missing_record_is_not_found() {
        let source = MemorySource::new("Author");
        let err: InternalError = source
            .fetch_by_id(&Value::Int(9))
            .expect_err("empty source")
            .into();

        assert_eq!(err.kind, ErrorKind::RecordNotFound);
        assert_eq!(err.message, "no Author record for id 9");
    }

    #[test]
    fn unkeyable_ids_are_rejected_on_insert() {
        let mut source = MemorySource::new("Author");
        let err = source
            .insert(1.5, author_record())
            .expect_err("float ids cannot key records");

        assert_eq!(err.kind, ErrorKind::InvalidIdentityKey);
        assert!(source.is_empty());
    }

    #[test]
    fn closures_are_sources() {
        let source = |id: &Value| -> Result<RawRecord, SourceError> {
            Err(SourceError::unavailable("Book", format!("offline while fetching {id:?}")))
        };

        let err: InternalError = source
            .fetch_by_id(&Value::Int(1))
            .expect_err("closure always fails")
            .into();
        assert_eq!(err.kind, ErrorKind::SourceUnavailable);
        assert_eq!(err.class, ErrorClass::Unavailable);
    }
}
