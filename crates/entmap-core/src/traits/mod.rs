use crate::model::EntityModel;

// ============================================================================
// ENTITY IDENTITY & SCHEMA
// ============================================================================
//
// These traits describe *what an entity is*, not how instances are cached
// or built at runtime.
//

///
/// EntityKind
///
/// Typed handle on one entity subtype's static declaration.
/// Implemented by marker types, usually through the `entity!` macro.
///

pub trait EntityKind: 'static {
    const MODEL: &'static EntityModel;

    const ENTITY_NAME: &'static str = Self::MODEL.entity_name;
    const IDENTITY_KEY: &'static str = Self::MODEL.identity_key;
}
