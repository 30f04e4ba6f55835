//! Creation payloads for the Airtable meta API
//!
//! Field conversion is identical whether a field is created as part of a new
//! base, a new table, or added to an existing table.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::metadata::{FieldDefinition, FieldType, SchemaDefinition, TableDefinition};

/// Palette used for select choices that don't specify a color
pub const CHOICE_COLORS: [&str; 10] = [
    "blueLight2",
    "cyanLight2",
    "tealLight2",
    "greenLight2",
    "yellowLight2",
    "orangeLight2",
    "redLight2",
    "pinkLight2",
    "purpleLight2",
    "grayLight2",
];

/// Body of `POST /bases/{baseId}/tables/{tableId}/fields`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Body of `POST /bases/{baseId}/tables`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldPayload>,
}

/// Body of `POST /bases`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    pub tables: Vec<TablePayload>,
}

/// Pick a color from the fixed palette
pub fn random_choice_color<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CHOICE_COLORS[rng.random_range(0..CHOICE_COLORS.len())]
}

impl FieldPayload {
    /// Convert a field definition into its creation payload
    pub fn from_definition<R: Rng + ?Sized>(field: &FieldDefinition, rng: &mut R) -> Self {
        let options = match &field.field_type {
            FieldType::SingleSelect { choices } | FieldType::MultipleSelects { choices } => {
                choices.as_ref().map(|choices| {
                    let choices: Vec<Value> = choices
                        .iter()
                        .map(|c| {
                            let color = c
                                .color
                                .clone()
                                .unwrap_or_else(|| random_choice_color(rng).to_string());
                            json!({ "name": c.name, "color": color })
                        })
                        .collect();
                    json!({ "choices": choices })
                })
            }
            FieldType::Number { precision }
            | FieldType::Currency { precision }
            | FieldType::Percent { precision } => precision.map(|p| json!({ "precision": p })),
            FieldType::MultipleRecordLinks {
                linked_table_id,
                prefers_single_record_link,
            } => linked_table_id.as_ref().map(|id| {
                json!({
                    "linkedTableId": id,
                    "prefersSingleRecordLink": prefers_single_record_link,
                })
            }),
            FieldType::Formula { formula } => formula.as_ref().map(|f| json!({ "formula": f })),
            FieldType::Rollup { config } => config.clone(),
            _ => None,
        };

        Self {
            name: field.name.clone(),
            field_type: field.field_type.tag().to_string(),
            description: field.description.clone(),
            options,
        }
    }
}

impl TablePayload {
    pub fn from_definition<R: Rng + ?Sized>(table: &TableDefinition, rng: &mut R) -> Self {
        Self {
            name: table.name.clone(),
            description: table.description.clone(),
            fields: table
                .fields
                .iter()
                .map(|f| FieldPayload::from_definition(f, rng))
                .collect(),
        }
    }
}

impl BasePayload {
    /// Build the payload for provisioning a base seeded with the whole schema
    pub fn from_schema<R: Rng + ?Sized>(
        name: impl Into<String>,
        schema: &SchemaDefinition,
        rng: &mut R,
    ) -> Self {
        Self {
            name: name.into(),
            workspace_id: schema.workspace_id.clone(),
            tables: schema
                .tables
                .iter()
                .map(|t| TablePayload::from_definition(t, rng))
                .collect(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.tables.iter().map(|t| t.fields.len()).sum()
    }
}
