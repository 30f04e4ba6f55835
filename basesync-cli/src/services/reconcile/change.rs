//! Change records produced by a reconciliation run

use serde::{Deserialize, Serialize};
use std::fmt;

/// One structural change that was applied to a base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum ChangeRecord {
    BaseCreated {
        base_id: String,
        name: String,
    },
    TableCreated {
        table_id: String,
        table_name: String,
    },
    FieldAdded {
        table_id: String,
        table_name: String,
        field_id: String,
        field_name: String,
        field_type: String,
    },
}

/// Grouping key for change records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    BaseCreated,
    TableCreated,
    FieldAdded,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BaseCreated => "BASE_CREATED",
            Self::TableCreated => "TABLE_CREATED",
            Self::FieldAdded => "FIELD_ADDED",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ChangeRecord {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::BaseCreated { .. } => ChangeKind::BaseCreated,
            Self::TableCreated { .. } => ChangeKind::TableCreated,
            Self::FieldAdded { .. } => ChangeKind::FieldAdded,
        }
    }

    /// One-line description used in reports
    pub fn summary(&self) -> String {
        match self {
            Self::BaseCreated { base_id, name } => format!("{} ({})", name, base_id),
            Self::TableCreated { table_name, .. } => table_name.clone(),
            Self::FieldAdded {
                table_name,
                field_name,
                field_type,
                ..
            } => format!("{}.{} ({})", table_name, field_name, field_type),
        }
    }
}
