///
/// FieldMapping
///
/// One declared correspondence between a storage-side field name and the
/// publicly exposed field name. Declaration order is significant.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldMapping {
    /// Field name used by the backing store.
    pub storage: &'static str,
    /// Field name exposed on the entity.
    pub exposed: &'static str,
}

impl FieldMapping {
    #[must_use]
    pub const fn new(storage: &'static str, exposed: &'static str) -> Self {
        Self { storage, exposed }
    }

    /// A field stored and exposed under the same name.
    #[must_use]
    pub const fn same(name: &'static str) -> Self {
        Self::new(name, name)
    }
}
