//! ## Crate layout
//! - `core`: values, raw records, entity models, the entity base, the
//!   identity cache, record sources, and the session facade.
//! - `entity!`: declares an entity subtype and its static model.
//!
//! The `prelude` module mirrors the surface used by application code that
//! declares entities and loads them through a `Session`.

pub use entmap_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use entmap_core::entity;

pub use crate::core::{Error, config::Config};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        cache::{IdentityCache, IdentityKey},
        entity::{Entity, EntityRef, ExportFormat, ExportedRecord, GapMode},
        model::{Cardinality, EntityRegistry},
        record::RawRecord,
        session::Session,
        source::{MemorySource, RecordSource as _, SourceError},
        traits::EntityKind as _,
        value::{FieldValue, Value},
    };
    pub use serde::{Deserialize, Serialize};
}
