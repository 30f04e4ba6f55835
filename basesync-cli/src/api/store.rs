//! Schema store abstraction
//!
//! The reconciler only talks to a base through this trait. [`AirtableClient`]
//! implements it over HTTP.
//!
//! [`AirtableClient`]: crate::api::AirtableClient

use async_trait::async_trait;

use super::error::StoreError;
use super::metadata::SchemaDefinition;
use super::operations::{BasePayload, FieldPayload, TablePayload};

#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Fetch the current tables and fields of a base
    async fn fetch_schema(&self, base_id: &str) -> Result<SchemaDefinition, StoreError>;

    /// Create a base seeded with tables, returning its id
    async fn create_base(&self, payload: &BasePayload) -> Result<String, StoreError>;

    /// Create a table in an existing base, returning its id
    async fn create_table(&self, base_id: &str, payload: &TablePayload)
    -> Result<String, StoreError>;

    /// Add a field to an existing table, returning its id
    async fn add_field(
        &self,
        base_id: &str,
        table_id: &str,
        payload: &FieldPayload,
    ) -> Result<String, StoreError>;
}
