//! Airtable schema metadata

pub mod models;

pub use models::{FieldDefinition, FieldType, SchemaDefinition, TableDefinition};
