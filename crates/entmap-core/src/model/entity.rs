use crate::{
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
    model::{field::FieldMapping, relation::RelationModel},
};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// ModelError
///

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("entity '{entity}' declares no fields")]
    MissingFields { entity: &'static str },

    #[error("entity '{entity}' declares storage field '{field}' more than once")]
    DuplicateStorageField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("entity '{entity}' declares exposed field '{field}' more than once")]
    DuplicateExposedField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("entity '{entity}' uses identity key '{field}' but declares no such field")]
    UndeclaredIdentity {
        entity: &'static str,
        field: &'static str,
    },

    #[error("entity '{entity}' declares relation target '{target}' more than once")]
    DuplicateRelation {
        entity: &'static str,
        target: &'static str,
    },
}

impl ModelError {
    pub(crate) const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields { .. } | Self::UndeclaredIdentity { .. } => {
                ErrorKind::MissingFieldDeclaration
            }
            Self::DuplicateStorageField { .. }
            | Self::DuplicateExposedField { .. }
            | Self::DuplicateRelation { .. } => ErrorKind::DuplicateFieldDeclaration,
        }
    }
}

impl From<ModelError> for InternalError {
    fn from(err: ModelError) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Model,
            err.kind(),
            err.to_string(),
        )
    }
}

///
/// EntityModel
/// Static declaration of one entity subtype.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable name used for cache keys and relation matching.
    pub entity_name: &'static str,
    /// Field carrying the identity key in raw records.
    pub identity_key: &'static str,
    /// Ordered field map (authoritative for iteration and export).
    pub fields: &'static [FieldMapping],
    /// Accepted related entity types.
    pub relations: &'static [RelationModel],
}

impl EntityModel {
    /// Exposed field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.exposed)
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Position of an exposed field in declaration order.
    #[must_use]
    pub fn field_index(&self, exposed: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.exposed == exposed)
    }

    /// Field carrying the identity key, matched by storage name first and
    /// exposed name second.
    #[must_use]
    pub fn identity_field(&self) -> Option<&'static FieldMapping> {
        self.fields
            .iter()
            .find(|f| f.storage == self.identity_key)
            .or_else(|| self.fields.iter().find(|f| f.exposed == self.identity_key))
    }

    /// Relation declared for a related entity type, if any.
    #[must_use]
    pub fn relation_for(&self, target: &str) -> Option<&'static RelationModel> {
        self.relations.iter().find(|r| r.target == target)
    }

    /// Check the declaration once, before the model is used.
    pub fn validate(&self) -> Result<(), InternalError> {
        let entity = self.entity_name;

        if self.fields.is_empty() {
            return Err(ModelError::MissingFields { entity }.into());
        }

        let mut storage = BTreeSet::new();
        let mut exposed = BTreeSet::new();
        for field in self.fields {
            if !storage.insert(field.storage) {
                return Err(ModelError::DuplicateStorageField {
                    entity,
                    field: field.storage,
                }
                .into());
            }
            if !exposed.insert(field.exposed) {
                return Err(ModelError::DuplicateExposedField {
                    entity,
                    field: field.exposed,
                }
                .into());
            }
        }

        if self.identity_field().is_none() {
            return Err(ModelError::UndeclaredIdentity {
                entity,
                field: self.identity_key,
            }
            .into());
        }

        let mut targets = BTreeSet::new();
        for relation in self.relations {
            if !targets.insert(relation.target) {
                return Err(ModelError::DuplicateRelation {
                    entity,
                    target: relation.target,
                }
                .into());
            }
        }

        Ok(())
    }

    pub(crate) fn missing_fields_error(&self) -> InternalError {
        ModelError::MissingFields {
            entity: self.entity_name,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cardinality;

    static AUTHOR: EntityModel = EntityModel {
        entity_name: "Author",
        identity_key: "id",
        fields: &[
            FieldMapping::same("id"),
            FieldMapping::new("first_name", "firstName"),
            FieldMapping::new("last_name", "lastName"),
        ],
        relations: &[],
    };

    #[test]
    fn field_names_follow_declaration_order() {
        let names: Vec<_> = AUTHOR.field_names().collect();

        assert_eq!(names, ["id", "firstName", "lastName"]);
        assert_eq!(AUTHOR.field_index("lastName"), Some(2));
        assert_eq!(AUTHOR.field_index("last_name"), None);
        AUTHOR.validate().expect("author model should validate");
    }

    #[test]
    fn empty_field_map_is_rejected() {
        static EMPTY: EntityModel = EntityModel {
            entity_name: "Empty",
            identity_key: "id",
            fields: &[],
            relations: &[],
        };

        let err = EMPTY.validate().expect_err("empty model should fail");
        assert_eq!(err.kind, ErrorKind::MissingFieldDeclaration);
        assert_eq!(err.origin, ErrorOrigin::Model);
    }

    #[test]
    fn duplicate_exposed_field_is_rejected() {
        static DUP: EntityModel = EntityModel {
            entity_name: "Dup",
            identity_key: "id",
            fields: &[FieldMapping::same("id"), FieldMapping::new("ident", "id")],
            relations: &[],
        };

        let err = DUP.validate().expect_err("duplicate exposed name should fail");
        assert_eq!(err.kind, ErrorKind::DuplicateFieldDeclaration);
        assert!(err.message.contains("exposed field 'id'"));
    }

    #[test]
    fn identity_key_must_name_a_declared_field() {
        static ODD: EntityModel = EntityModel {
            entity_name: "Odd",
            identity_key: "uuid",
            fields: &[FieldMapping::same("name")],
            relations: &[],
        };

        let err = ODD.validate().expect_err("uuid is not declared");
        assert_eq!(err.kind, ErrorKind::MissingFieldDeclaration);
        assert!(err.message.contains("'uuid'"));
        assert!(ODD.identity_field().is_none());
    }

    #[test]
    fn identity_key_resolves_through_storage_name() {
        static RENAMED: EntityModel = EntityModel {
            entity_name: "Renamed",
            identity_key: "book_id",
            fields: &[FieldMapping::new("book_id", "id"), FieldMapping::same("title")],
            relations: &[],
        };

        RENAMED.validate().expect("storage-side identity should validate");
        assert_eq!(
            RENAMED.identity_field(),
            Some(&FieldMapping::new("book_id", "id"))
        );
        assert_eq!(AUTHOR.identity_field().map(|f| f.exposed), Some("id"));
    }

    #[test]
    fn duplicate_relation_target_is_rejected() {
        static DUP: EntityModel = EntityModel {
            entity_name: "Dup",
            identity_key: "id",
            fields: &[FieldMapping::same("id")],
            relations: &[
                RelationModel::single("Author", "author"),
                RelationModel::multiple("Author", "authors"),
            ],
        };

        let err = DUP.validate().expect_err("duplicate relation should fail");
        assert_eq!(err.kind, ErrorKind::DuplicateFieldDeclaration);

        let relation = DUP.relation_for("Author").expect("relation should resolve");
        assert_eq!(relation.cardinality, Cardinality::Single);
        assert_eq!(relation.cardinality.to_string(), "single");
    }
}
