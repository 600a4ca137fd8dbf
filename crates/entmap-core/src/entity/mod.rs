//! Module: entity
//! Responsibility: the entity base shared by every declared subtype.
//!
//! Invariants:
//! - A declared field is set only if the raw record carried it (storage
//!   name first, exposed name second). Absent fields are never null-filled.
//! - Related entities are injected only at construction time and only when
//!   the model declares a relation for their entity type.
//! - Ordered export walks the declared field order; the compatible mode
//!   stops at the first unset field.

mod cursor;
mod export;


use crate::{
    cache::IdentityKey,
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
    model::{Cardinality, EntityModel},
    record::RawRecord,
    value::{FieldValue, Value},
};
use derive_more::Deref;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use cursor::FieldCursor;
pub use export::{ExportFormat, ExportedRecord, Fields, GapMode};

///
/// EntityError
///

#[derive(Debug, ThisError)]
pub enum EntityError {
    #[error("entity '{entity}' has no relation declared for related type '{related}'")]
    UndeclaredRelation {
        entity: &'static str,
        related: &'static str,
    },

    #[error("unsupported export format '{format}'")]
    UnsupportedFormat { format: String },

    #[error("cursor position {position} is out of range for '{entity}' ({len} fields)")]
    IndexOutOfRange {
        entity: &'static str,
        position: usize,
        len: usize,
    },
}

impl EntityError {
    pub(crate) const fn kind(&self) -> ErrorKind {
        match self {
            Self::UndeclaredRelation { .. } => ErrorKind::UndeclaredRelation,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
        }
    }

    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::UndeclaredRelation { .. } => ErrorClass::InvariantViolation,
            Self::UnsupportedFormat { .. } => ErrorClass::Unsupported,
            Self::IndexOutOfRange { .. } => ErrorClass::NotFound,
        }
    }
}

impl From<EntityError> for InternalError {
    fn from(err: EntityError) -> Self {
        Self::new(err.class(), ErrorOrigin::Entity, err.kind(), err.to_string())
    }
}

///
/// Entity
///
/// One constructed record of a declared subtype. Values are keyed by the
/// exposed field name; the model fixes which names exist and their order.
///

#[derive(Debug)]
pub struct Entity {
    model: &'static EntityModel,
    values: BTreeMap<&'static str, FieldValue>,
}

impl Entity {
    /// Resolve a raw record through the model's field map, then inject
    /// related entities through its relation map.
    pub fn new(
        model: &'static EntityModel,
        record: &RawRecord,
        related: &[EntityRef],
    ) -> Result<Self, InternalError> {
        if model.fields.is_empty() {
            return Err(model.missing_fields_error());
        }

        let mut values = BTreeMap::new();
        for field in model.fields {
            let found = record
                .get(field.storage)
                .or_else(|| record.get(field.exposed));

            if let Some(value) = found {
                values.insert(field.exposed, FieldValue::Scalar(value.clone()));
            }
        }

        let mut entity = Self { model, values };
        entity.inject_related(related)?;

        Ok(entity)
    }

    /// Construct from any supported raw shape.
    pub fn from_value(
        model: &'static EntityModel,
        raw: Value,
        related: &[EntityRef],
    ) -> Result<Self, InternalError> {
        let record = RawRecord::try_from_value(raw)?;

        Self::new(model, &record, related)
    }

    fn inject_related(&mut self, related: &[EntityRef]) -> Result<(), InternalError> {
        for entity in related {
            let relation = self.model.relation_for(entity.entity_name()).ok_or(
                EntityError::UndeclaredRelation {
                    entity: self.model.entity_name,
                    related: entity.entity_name(),
                },
            )?;

            match relation.cardinality {
                Cardinality::Single => {
                    self.values
                        .insert(relation.field, FieldValue::Entity(entity.clone()));
                }
                Cardinality::Multiple => match self.values.get_mut(relation.field) {
                    Some(FieldValue::Entities(list)) => list.push(entity.clone()),
                    _ => {
                        self.values
                            .insert(relation.field, FieldValue::Entities(vec![entity.clone()]));
                    }
                },
            }
        }

        Ok(())
    }

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        self.model.entity_name
    }

    /// Identity key carried by this entity, if its identity field is set
    /// to a keyable value. The field is found through the model's field
    /// map, so a storage-side identity name resolves to its exposed field.
    #[must_use]
    pub fn identity(&self) -> Option<IdentityKey> {
        let field = self.model.identity_field()?;
        let value = self.get_value(field.exposed)?;

        IdentityKey::try_from_value(value).ok()
    }

    /// Total accessor: `None` when the field is unset or undeclared.
    #[must_use]
    pub fn get_field(&self, exposed: &str) -> Option<&FieldValue> {
        self.values.get(exposed)
    }

    #[must_use]
    pub fn get_value(&self, exposed: &str) -> Option<&Value> {
        self.get_field(exposed).and_then(FieldValue::as_scalar)
    }

    #[must_use]
    pub fn get_entity(&self, exposed: &str) -> Option<&EntityRef> {
        self.get_field(exposed).and_then(FieldValue::as_entity)
    }

    #[must_use]
    pub fn get_entities(&self, exposed: &str) -> Option<&[EntityRef]> {
        self.get_field(exposed).and_then(FieldValue::as_entities)
    }

    #[must_use]
    pub fn has_field(&self, exposed: &str) -> bool {
        self.values.contains_key(exposed)
    }

    /// Exposed field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.model.field_names()
    }

    /// Ordered, populated fields; stops at the first unset declared field.
    #[must_use]
    pub fn fields(&self) -> Fields<'_> {
        self.fields_with(GapMode::StopAtGap)
    }

    #[must_use]
    pub fn fields_with(&self, mode: GapMode) -> Fields<'_> {
        Fields::new(self, mode)
    }

    /// Caller-owned cursor over the declared field order.
    #[must_use]
    pub fn cursor(&self) -> FieldCursor<'_> {
        FieldCursor::new(self)
    }

    /// Snapshot the compatible ordered export into the requested shape.
    #[must_use]
    pub fn to_record(&self, format: ExportFormat) -> ExportedRecord {
        self.to_record_with(format, GapMode::StopAtGap)
    }

    #[must_use]
    pub fn to_record_with(&self, format: ExportFormat, mode: GapMode) -> ExportedRecord {
        ExportedRecord::collect(format, self.fields_with(mode), mode)
    }

    /// Parse the format name, then export.
    pub fn to_record_named(&self, format: &str) -> Result<ExportedRecord, InternalError> {
        let format = format.parse::<ExportFormat>()?;

        Ok(self.to_record(format))
    }

    /// Nested-value form used when this entity is exported inside another.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.to_value_with(GapMode::StopAtGap)
    }

    #[must_use]
    pub fn to_value_with(&self, mode: GapMode) -> Value {
        Value::Map(
            self.fields_with(mode)
                .map(|(name, value)| (name.to_string(), value.to_value_with(mode)))
                .collect(),
        )
    }

    pub(crate) fn value_at(&self, position: usize) -> Option<(&'static str, Option<&FieldValue>)> {
        let field = self.model.fields.get(position)?;

        Some((field.exposed, self.values.get(field.exposed)))
    }
}

///
/// EntityRef
///
/// Shared handle to a constructed entity. Cached instances are handed out
/// as clones of the same handle; compare them with [`EntityRef::ptr_eq`].
///

#[derive(Clone, Debug, Deref)]
pub struct EntityRef(Arc<Entity>);

impl EntityRef {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self(Arc::new(entity))
    }

    /// Reference equality: both handles point at the same instance.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl From<Entity> for EntityRef {
    fn from(entity: Entity) -> Self {
        Self::new(entity)
    }
}
