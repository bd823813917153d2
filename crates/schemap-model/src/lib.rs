//! Value types shared by the schema mapping engine.
//!
//! Schemas and fields are produced by external discovery/catalog components;
//! mappings and changes are produced by `schemap-map` and `schemap-sync`.

#![deny(unsafe_code)]

pub mod change;
pub mod error;
pub mod mapping;
pub mod schema;

pub use change::{ChangeType, SchemaChange};
pub use error::{ModelError, Result};
pub use mapping::{FieldMapping, MappingKey, MappingType, TransformationLogic, clamp_confidence};
pub use schema::{Field, Schema};
