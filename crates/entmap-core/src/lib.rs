//! Core runtime for entmap: raw values and records, static entity models,
//! the mapped entity base, the identity cache, record sources, and the
//! session facade that ties them together.

#[macro_use]
mod macros;

// public exports are one module level down
pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod model;
pub mod obs;
pub mod record;
pub mod session;
pub mod source;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::InternalError as Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or configuration are re-exported here.
///

pub mod prelude {
    pub use crate::{
        cache::{IdentityCache, IdentityKey},
        entity::{Entity, EntityRef, ExportFormat, ExportedRecord, GapMode},
        model::{Cardinality, EntityModel, EntityRegistry, FieldMapping, RelationModel},
        record::RawRecord,
        session::Session,
        source::{MemorySource, RecordSource},
        traits::EntityKind,
        value::{FieldValue, Value},
    };
}
