//! Delta application
//!
//! Tables are created first and a failure stops the run, since later fields
//! may depend on them. Field additions are independent: each one yields its
//! own `Result`, failures are logged and collected, and the loop moves on.

use log::{error, info, warn};
use std::time::Instant;

use super::change::ChangeRecord;
use super::diff::SchemaDelta;
use super::error::{Stage, SyncError};
use super::SchemaReconciler;
use crate::api::{FieldDefinition, FieldPayload, SchemaStore, TableDefinition, TablePayload};

/// Changes applied and field additions that failed
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub changes: Vec<ChangeRecord>,
    pub failures: Vec<SyncError>,
}

impl<S: SchemaStore + ?Sized> SchemaReconciler<'_, S> {
    /// Apply a delta to a base, in order: new tables, then missing fields
    pub async fn apply_delta(
        &mut self,
        base_id: &str,
        delta: &SchemaDelta,
    ) -> Result<ApplyOutcome, SyncError> {
        check_creatable(&delta.tables_to_create)?;

        let mut changes = Vec::with_capacity(delta.total_changes());

        for table in &delta.tables_to_create {
            match self.create_table(base_id, table).await {
                Ok(change) => changes.push(change),
                Err(e) => {
                    if !changes.is_empty() {
                        let applied: Vec<_> = changes.iter().map(ChangeRecord::summary).collect();
                        error!(
                            "[{}] Stopped after creating {} table(s): {}",
                            self.context.run_id(),
                            applied.len(),
                            applied.join(", ")
                        );
                    }
                    return Err(e.with_applied(changes));
                }
            }
        }

        let mut outcomes = Vec::with_capacity(delta.fields_to_add());
        for update in &delta.tables_to_update {
            info!(
                "[{}] Adding {} fields to table {}",
                self.context.run_id(),
                update.fields.len(),
                update.table_name
            );
            for field in &update.fields {
                outcomes.push(
                    self.add_field(base_id, &update.table_id, &update.table_name, field)
                        .await,
                );
            }
        }

        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(change) => changes.push(change),
                Err(e) => failures.push(e),
            }
        }

        info!(
            "[{}] Applied {} of {} changes",
            self.context.run_id(),
            changes.len(),
            delta.total_changes()
        );
        Ok(ApplyOutcome { changes, failures })
    }

    async fn create_table(
        &mut self,
        base_id: &str,
        table: &TableDefinition,
    ) -> Result<ChangeRecord, SyncError> {
        info!("[{}] Creating table: {}", self.context.run_id(), table.name);

        let payload = TablePayload::from_definition(table, &mut self.rng);
        let started = Instant::now();
        let created = self.store.create_table(base_id, &payload).await;
        self.context
            .metrics
            .record("create_table", created.is_ok(), started.elapsed());

        let table_id = created.map_err(|source| {
            SyncError::store_unavailable(
                Stage::CreateTable {
                    table: table.name.clone(),
                },
                source,
            )
        })?;

        info!("[{}] Table created: {} ({})", self.context.run_id(), table.name, table_id);
        Ok(ChangeRecord::TableCreated {
            table_id,
            table_name: table.name.clone(),
        })
    }

    async fn add_field(
        &mut self,
        base_id: &str,
        table_id: &str,
        table_name: &str,
        field: &FieldDefinition,
    ) -> Result<ChangeRecord, SyncError> {
        let payload = FieldPayload::from_definition(field, &mut self.rng);
        let started = Instant::now();
        let added = self.store.add_field(base_id, table_id, &payload).await;
        self.context
            .metrics
            .record("add_field", added.is_ok(), started.elapsed());

        match added {
            Ok(field_id) => {
                info!("[{}] Field added: {}.{}", self.context.run_id(), table_name, field.name);
                Ok(ChangeRecord::FieldAdded {
                    table_id: table_id.to_string(),
                    table_name: table_name.to_string(),
                    field_id,
                    field_name: field.name.clone(),
                    field_type: field.field_type.tag().to_string(),
                })
            }
            Err(source) => {
                let err = SyncError::FieldApplicationFailed {
                    table: table_name.to_string(),
                    field: field.name.clone(),
                    field_type: field.field_type.tag().to_string(),
                    source,
                };
                warn!("[{}] {}", self.context.run_id(), err);
                Err(err)
            }
        }
    }
}

/// Reject tables that would have to be created but cannot be
pub fn check_creatable(tables: &[TableDefinition]) -> Result<(), SyncError> {
    let problems: Vec<String> = tables.iter().filter_map(TableDefinition::creation_problem).collect();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(SyncError::InvalidSchema(problems))
    }
}
