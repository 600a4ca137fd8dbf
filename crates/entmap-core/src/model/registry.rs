use crate::{
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
    model::entity::EntityModel,
    traits::EntityKind,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("unknown entity type '{0}'")]
    UnknownEntity(String),

    #[error("entity type '{0}' already registered")]
    AlreadyRegistered(&'static str),
}

impl From<RegistryError> for InternalError {
    fn from(err: RegistryError) -> Self {
        let (class, kind) = match err {
            RegistryError::UnknownEntity(_) => {
                (ErrorClass::NotFound, ErrorKind::UnknownEntityType)
            }
            RegistryError::AlreadyRegistered(_) => {
                (ErrorClass::Conflict, ErrorKind::DuplicateEntityType)
            }
        };

        Self::new(class, ErrorOrigin::Model, kind, err.to_string())
    }
}

///
/// EntityRegistry
///
/// Closed set of entity types known to a cache. Models are validated when
/// registered and are immutable afterwards.
///

#[derive(Debug, Default)]
pub struct EntityRegistry {
    models: BTreeMap<&'static str, &'static EntityModel>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register one model under its entity name.
    pub fn register(&mut self, model: &'static EntityModel) -> Result<(), InternalError> {
        if self.models.contains_key(model.entity_name) {
            return Err(RegistryError::AlreadyRegistered(model.entity_name).into());
        }
        model.validate()?;

        self.models.insert(model.entity_name, model);
        Ok(())
    }

    /// Register a typed entity.
    pub fn register_kind<E: EntityKind>(&mut self) -> Result<(), InternalError> {
        self.register(E::MODEL)
    }

    /// Builder form of [`Self::register_kind`].
    pub fn with_kind<E: EntityKind>(mut self) -> Result<Self, InternalError> {
        self.register_kind::<E>()?;
        Ok(self)
    }

    /// Look up a model by entity name.
    pub fn get(&self, entity_name: &str) -> Result<&'static EntityModel, InternalError> {
        self.models
            .get(entity_name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownEntity(entity_name.to_string()).into())
    }

    #[must_use]
    pub fn contains(&self, entity_name: &str) -> bool {
        self.models.contains_key(entity_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate registered models in entity-name order.
    pub fn iter(&self) -> impl Iterator<Item = &'static EntityModel> + '_ {
        self.models.values().copied()
    }
}
