//! Schema reconciliation service
//!
//! Brings an Airtable base in line with a source schema:
//! - Provisions a new base seeded with the whole schema, or
//! - Adds the tables and fields an existing base is missing
//!
//! Existing structure is never modified or deleted. Store calls are issued one
//! at a time, in source order.

pub mod apply;
pub mod change;
pub mod context;
pub mod diff;
pub mod error;
pub mod report;

pub use change::{ChangeKind, ChangeRecord};
pub use context::RunContext;
pub use diff::{SchemaDelta, compare_schemas};
pub use error::{Stage, SyncError};
pub use report::{SyncReport, export_report_to_json, generate_report};

use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

use crate::api::{BasePayload, SchemaDefinition, SchemaStore};
use apply::check_creatable;

/// Outcome of a reconciliation run
#[derive(Debug)]
pub struct ReconciliationResult {
    pub base_id: String,
    /// Changes applied, in the order they were performed
    pub changes: Vec<ChangeRecord>,
    /// Delta that was computed (incremental path only)
    pub delta: Option<SchemaDelta>,
    /// Field additions that failed; the rest of the run still went through
    pub failures: Vec<SyncError>,
}

impl ReconciliationResult {
    /// True when every planned change was applied
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn report(&self) -> SyncReport {
        generate_report(&self.changes)
            .with_base_id(&self.base_id)
            .with_failures(&self.failures)
    }
}

/// Reconciles a source schema against a base through a [`SchemaStore`]
pub struct SchemaReconciler<'a, S: SchemaStore + ?Sized> {
    store: &'a S,
    context: RunContext,
    rng: StdRng,
}

impl<'a, S: SchemaStore + ?Sized> SchemaReconciler<'a, S> {
    pub fn new(store: &'a S, context: RunContext) -> Self {
        Self {
            store,
            context,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Use a specific RNG for select choice colors
    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Reconcile `source` against a base.
    ///
    /// Without a base id, or with `force_create`, a new base is provisioned from
    /// the whole schema. Otherwise the base is fetched, diffed and brought up to
    /// date with additive changes only.
    pub async fn reconcile(
        &mut self,
        source: &SchemaDefinition,
        base_id: Option<&str>,
        force_create: bool,
    ) -> Result<ReconciliationResult, SyncError> {
        source.validate().map_err(SyncError::InvalidSchema)?;
        info!(
            "[{}] Starting schema synchronization ({} tables, {} fields)",
            self.context.run_id(),
            source.tables.len(),
            source.field_count()
        );

        let result = match base_id {
            Some(base_id) if !force_create => self.update_existing_base(source, base_id).await,
            _ => self.create_new_base(source).await,
        };

        let metrics = &self.context.metrics;
        match &result {
            Ok(r) => info!(
                "[{}] Synchronization finished in {}ms: {} changes, {} failed fields ({} store calls, {} failed: {})",
                self.context.run_id(),
                self.context.elapsed().num_milliseconds(),
                r.changes.len(),
                r.failures.len(),
                metrics.total_calls(),
                metrics.total_failures(),
                metrics.summary_line()
            ),
            Err(e) => error!(
                "[{}] Synchronization failed after {}ms: {}",
                self.context.run_id(),
                self.context.elapsed().num_milliseconds(),
                e
            ),
        }
        result
    }

    /// Compute the delta for a base without applying it
    pub async fn plan(
        &mut self,
        source: &SchemaDefinition,
        base_id: &str,
    ) -> Result<SchemaDelta, SyncError> {
        source.validate().map_err(SyncError::InvalidSchema)?;
        let current = self.fetch_current(base_id).await?;
        Ok(compare_schemas(&current, source))
    }

    async fn create_new_base(
        &mut self,
        source: &SchemaDefinition,
    ) -> Result<ReconciliationResult, SyncError> {
        if source.tables.is_empty() {
            return Err(SyncError::InvalidSchema(vec![
                "a new base needs at least one table".to_string(),
            ]));
        }
        check_creatable(&source.tables)?;

        let name = source
            .name
            .clone()
            .unwrap_or_else(|| format!("Client Base - {}", chrono::Utc::now().to_rfc3339()));
        info!("[{}] Creating new base '{}'", self.context.run_id(), name);

        let payload = BasePayload::from_schema(name.clone(), source, &mut self.rng);
        let started = Instant::now();
        let created = self.store.create_base(&payload).await;
        self.context
            .metrics
            .record("create_base", created.is_ok(), started.elapsed());

        let base_id = created.map_err(|source| {
            SyncError::store_unavailable(Stage::CreateBase { name: name.clone() }, source)
        })?;
        info!(
            "[{}] New base created: {} ({} tables, {} fields)",
            self.context.run_id(),
            base_id,
            payload.tables.len(),
            payload.field_count()
        );

        Ok(ReconciliationResult {
            changes: vec![ChangeRecord::BaseCreated {
                base_id: base_id.clone(),
                name,
            }],
            base_id,
            delta: None,
            failures: Vec::new(),
        })
    }

    async fn update_existing_base(
        &mut self,
        source: &SchemaDefinition,
        base_id: &str,
    ) -> Result<ReconciliationResult, SyncError> {
        info!("[{}] Analyzing existing base: {}", self.context.run_id(), base_id);

        let current = self.fetch_current(base_id).await?;
        let delta = compare_schemas(&current, source);

        if !delta.has_changes() {
            info!("[{}] Base is already up to date", self.context.run_id());
            return Ok(ReconciliationResult {
                base_id: base_id.to_string(),
                changes: Vec::new(),
                delta: Some(delta),
                failures: Vec::new(),
            });
        }

        info!(
            "[{}] Found {} changes to apply ({} tables, {} fields)",
            self.context.run_id(),
            delta.total_changes(),
            delta.tables_to_create.len(),
            delta.fields_to_add()
        );
        let outcome = self.apply_delta(base_id, &delta).await?;

        Ok(ReconciliationResult {
            base_id: base_id.to_string(),
            changes: outcome.changes,
            delta: Some(delta),
            failures: outcome.failures,
        })
    }

    async fn fetch_current(&mut self, base_id: &str) -> Result<SchemaDefinition, SyncError> {
        let started = Instant::now();
        let fetched = self.store.fetch_schema(base_id).await;
        self.context
            .metrics
            .record("fetch_schema", fetched.is_ok(), started.elapsed());

        fetched.map_err(|source| {
            SyncError::store_unavailable(
                Stage::FetchSchema {
                    base_id: base_id.to_string(),
                },
                source,
            )
        })
    }
}
