use derive_more::Display;

///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Cardinality {
    /// Assign the related entity; a later one of the same type replaces it.
    #[display("single")]
    Single,
    /// Append to an ordered sequence, preserving injection order.
    #[display("multiple")]
    Multiple,
}

///
/// RelationModel
///
/// Declares which related entity type an entity accepts and where the
/// injected instance lands.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationModel {
    /// Entity name of the accepted related type.
    pub target: &'static str,
    /// Exposed field the related entity is injected into.
    pub field: &'static str,
    pub cardinality: Cardinality,
    /// Storage field carrying the related id(s), used by the session to
    /// resolve the relation. `None` means callers inject it themselves.
    pub foreign_key: Option<&'static str>,
}

impl RelationModel {
    #[must_use]
    pub const fn single(target: &'static str, field: &'static str) -> Self {
        Self {
            target,
            field,
            cardinality: Cardinality::Single,
            foreign_key: None,
        }
    }

    #[must_use]
    pub const fn multiple(target: &'static str, field: &'static str) -> Self {
        Self {
            target,
            field,
            cardinality: Cardinality::Multiple,
            foreign_key: None,
        }
    }

    #[must_use]
    pub const fn via(mut self, foreign_key: &'static str) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }
}
