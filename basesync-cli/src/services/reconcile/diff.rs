//! Schema diff logic for comparing a base against a source schema
//!
//! The delta is additive only: it lists tables to create and fields to add,
//! never anything to delete or modify. Names are matched case-insensitively.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::api::{FieldDefinition, SchemaDefinition, TableDefinition};

/// Fields missing from a table that already exists in the base
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldAdditions {
    /// Store id of the existing table (or its name when the id is unknown)
    pub table_id: String,
    /// Name of the existing table, with the base's casing
    pub table_name: String,
    pub fields: Vec<FieldDefinition>,
}

/// Additive difference between a base and a source schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDelta {
    pub tables_to_create: Vec<TableDefinition>,
    pub tables_to_update: Vec<TableFieldAdditions>,
}

impl SchemaDelta {
    /// Tables to create plus every missing field
    pub fn total_changes(&self) -> usize {
        self.tables_to_create.len() + self.fields_to_add()
    }

    pub fn fields_to_add(&self) -> usize {
        self.tables_to_update.iter().map(|t| t.fields.len()).sum()
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

/// Compare the current schema of a base with the source schema
///
/// # Arguments
/// * `current` - Schema fetched from the base
/// * `source` - Desired schema supplied by the caller
///
/// # Returns
/// A `SchemaDelta` in source order. When two tables of `current` share a
/// lower-cased name, the later one is matched.
pub fn compare_schemas(current: &SchemaDefinition, source: &SchemaDefinition) -> SchemaDelta {
    // Build lookup map for efficient comparison
    let current_map: HashMap<String, &TableDefinition> = current
        .tables
        .iter()
        .map(|t| (t.name.to_lowercase(), t))
        .collect();

    let mut delta = SchemaDelta::default();

    for source_table in &source.tables {
        match current_map.get(&source_table.name.to_lowercase()) {
            None => delta.tables_to_create.push(source_table.clone()),
            Some(current_table) => {
                let missing = find_missing_fields(&current_table.fields, &source_table.fields);
                if !missing.is_empty() {
                    delta.tables_to_update.push(TableFieldAdditions {
                        table_id: current_table
                            .id
                            .clone()
                            .unwrap_or_else(|| current_table.name.clone()),
                        table_name: current_table.name.clone(),
                        fields: missing,
                    });
                }
            }
        }
    }

    delta
}

/// Fields present in `source_fields` but absent (by lower-cased name) from `current_fields`
pub fn find_missing_fields(
    current_fields: &[FieldDefinition],
    source_fields: &[FieldDefinition],
) -> Vec<FieldDefinition> {
    let current_names: HashSet<String> = current_fields
        .iter()
        .map(|f| f.name.to_lowercase())
        .collect();

    source_fields
        .iter()
        .filter(|f| !current_names.contains(&f.name.to_lowercase()))
        .cloned()
        .collect()
}
