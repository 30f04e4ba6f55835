//! Core Operation types for Airtable schema (meta API) calls

use serde::{Deserialize, Serialize};

use super::payload::{BasePayload, FieldPayload, TablePayload};

/// Represents a single schema call that can be executed against the Airtable meta API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    /// List the tables (and their fields) of a base
    /// GET /bases/{baseId}/tables
    FetchSchema {
        /// Base ID (e.g., "appXXXXXXXXXXXXXX")
        base_id: String,
    },
    /// Create a new base seeded with tables
    /// POST /bases
    CreateBase {
        /// Full base payload, including every table and field
        payload: BasePayload,
    },
    /// Create a table in an existing base
    /// POST /bases/{baseId}/tables
    CreateTable {
        base_id: String,
        payload: TablePayload,
    },
    /// Add a field to an existing table
    /// POST /bases/{baseId}/tables/{tableIdOrName}/fields
    AddField {
        base_id: String,
        /// Table ID, or the table name (the API accepts either)
        table_id: String,
        payload: FieldPayload,
    },
}

impl Operation {
    /// Create a new FetchSchema operation
    pub fn fetch_schema(base_id: impl Into<String>) -> Self {
        Self::FetchSchema {
            base_id: base_id.into(),
        }
    }

    /// Create a new CreateBase operation
    pub fn create_base(payload: BasePayload) -> Self {
        Self::CreateBase { payload }
    }

    /// Create a new CreateTable operation
    pub fn create_table(base_id: impl Into<String>, payload: TablePayload) -> Self {
        Self::CreateTable {
            base_id: base_id.into(),
            payload,
        }
    }

    /// Create a new AddField operation
    pub fn add_field(
        base_id: impl Into<String>,
        table_id: impl Into<String>,
        payload: FieldPayload,
    ) -> Self {
        Self::AddField {
            base_id: base_id.into(),
            table_id: table_id.into(),
            payload,
        }
    }

    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> &'static str {
        match self {
            Self::FetchSchema { .. } => "GET",
            Self::CreateBase { .. } => "POST",
            Self::CreateTable { .. } => "POST",
            Self::AddField { .. } => "POST",
        }
    }

    /// Get the path relative to the meta API root, with segments URL-encoded
    pub fn path(&self) -> String {
        match self {
            Self::FetchSchema { base_id } => {
                format!("/bases/{}/tables", urlencoding::encode(base_id))
            }
            Self::CreateBase { .. } => "/bases".to_string(),
            Self::CreateTable { base_id, .. } => {
                format!("/bases/{}/tables", urlencoding::encode(base_id))
            }
            Self::AddField {
                base_id, table_id, ..
            } => format!(
                "/bases/{}/tables/{}/fields",
                urlencoding::encode(base_id),
                urlencoding::encode(table_id)
            ),
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::FetchSchema { .. } => "fetch_schema",
            Self::CreateBase { .. } => "create_base",
            Self::CreateTable { .. } => "create_table",
            Self::AddField { .. } => "add_field",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_payload() -> FieldPayload {
        FieldPayload {
            name: "Email".to_string(),
            field_type: "email".to_string(),
            description: None,
            options: None,
        }
    }

    #[test]
    fn test_paths() {
        assert_eq!(Operation::fetch_schema("app1").path(), "/bases/app1/tables");
        assert_eq!(
            Operation::create_base(BasePayload {
                name: "Acme".to_string(),
                workspace_id: None,
                tables: vec![],
            })
            .path(),
            "/bases"
        );
        assert_eq!(
            Operation::add_field("app1", "tbl1", field_payload()).path(),
            "/bases/app1/tables/tbl1/fields"
        );
    }

    #[test]
    fn test_table_name_is_encoded() {
        let op = Operation::add_field("app1", "Client Accounts", field_payload());
        assert_eq!(op.path(), "/bases/app1/tables/Client%20Accounts/fields");
    }

    #[test]
    fn test_method_and_type() {
        let fetch = Operation::fetch_schema("app1");
        assert_eq!(fetch.http_method(), "GET");
        assert_eq!(fetch.operation_type(), "fetch_schema");

        let add = Operation::add_field("app1", "tbl1", field_payload());
        assert_eq!(add.http_method(), "POST");
        assert_eq!(add.operation_type(), "add_field");
    }
}
