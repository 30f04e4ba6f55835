//! Airtable meta API module
//!
//! Schema models, creation payloads, the [`SchemaStore`] abstraction and its
//! HTTP implementation.

pub mod client;
pub mod error;
pub mod metadata;
pub mod operations;
pub mod resilience;
pub mod store;

pub use client::AirtableClient;
pub use error::StoreError;
pub use metadata::{FieldDefinition, SchemaDefinition, TableDefinition};
pub use operations::{BasePayload, FieldPayload, TablePayload};
pub use resilience::ClientConfig;
pub use store::SchemaStore;
