//! Static, declarative entity metadata: field maps, relation maps and the
//! registry of known entity types.

pub mod entity;
pub mod field;
pub mod registry;
pub mod relation;

pub use entity::{EntityModel, ModelError};
pub use field::FieldMapping;
pub use registry::{EntityRegistry, RegistryError};
pub use relation::{Cardinality, RelationModel};
