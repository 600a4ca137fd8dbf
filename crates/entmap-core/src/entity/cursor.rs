use crate::{
    entity::{Entity, EntityError},
    error::InternalError,
    value::FieldValue,
};

///
/// FieldCursor
///
/// Position-based walk over the declared field order. The position belongs
/// to the cursor, so several cursors over one entity never interfere.
///
/// `valid()` is true only while the field at the current position is set,
/// so a `while cursor.valid()` loop yields the populated prefix.
///

#[derive(Clone, Debug)]
pub struct FieldCursor<'a> {
    entity: &'a Entity,
    position: usize,
}

impl<'a> FieldCursor<'a> {
    pub(super) const fn new(entity: &'a Entity) -> Self {
        Self {
            entity,
            position: 0,
        }
    }

    pub const fn rewind(&mut self) {
        self.position = 0;
    }

    /// Current position in the declared field order.
    #[must_use]
    pub const fn key(&self) -> usize {
        self.position
    }

    pub const fn advance(&mut self) {
        self.position += 1;
    }

    #[must_use]
    pub fn valid(&self) -> bool {
        matches!(self.entity.value_at(self.position), Some((_, Some(_))))
    }

    /// Exposed name at the current position.
    #[must_use]
    pub fn field_name(&self) -> Option<&'static str> {
        self.entity.value_at(self.position).map(|(name, _)| name)
    }

    /// Value at the current position; `Ok(None)` when the field is unset.
    pub fn current(&self) -> Result<Option<&'a FieldValue>, InternalError> {
        let (_, value) =
            self.entity
                .value_at(self.position)
                .ok_or_else(|| EntityError::IndexOutOfRange {
                    entity: self.entity.entity_name(),
                    position: self.position,
                    len: self.entity.model().field_count(),
                })?;

        Ok(value)
    }
}
