//! Reconciliation error types

use std::fmt;
use thiserror::Error;

use super::change::ChangeRecord;
use crate::api::StoreError;

/// The store call a fatal failure happened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    FetchSchema { base_id: String },
    CreateBase { name: String },
    CreateTable { table: String },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchSchema { base_id } => write!(f, "fetch schema of base {}", base_id),
            Self::CreateBase { name } => write!(f, "create base '{}'", name),
            Self::CreateTable { table } => write!(f, "create table '{}'", table),
        }
    }
}

/// Reconciliation errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// A structural call failed; the run stops
    #[error("schema store unavailable while trying to {stage}: {source}")]
    StoreUnavailable {
        stage: Stage,
        #[source]
        source: StoreError,
        /// Changes that went through earlier in the same run
        applied: Vec<ChangeRecord>,
    },

    /// A single field could not be added; the run continues
    #[error("failed to add field '{field}' ({field_type}) to table '{table}': {source}")]
    FieldApplicationFailed {
        table: String,
        field: String,
        field_type: String,
        #[source]
        source: StoreError,
    },

    /// The source schema cannot be reconciled
    #[error("invalid source schema: {}", .0.join("; "))]
    InvalidSchema(Vec<String>),
}

impl SyncError {
    /// A fatal store failure with nothing applied yet
    pub fn store_unavailable(stage: Stage, source: StoreError) -> Self {
        Self::StoreUnavailable {
            stage,
            source,
            applied: Vec::new(),
        }
    }

    /// Changes already applied when the run stopped
    pub fn applied(&self) -> &[ChangeRecord] {
        match self {
            Self::StoreUnavailable { applied, .. } => applied,
            _ => &[],
        }
    }

    /// Attach the changes applied before a fatal failure
    pub fn with_applied(mut self, changes: Vec<ChangeRecord>) -> Self {
        if let Self::StoreUnavailable { applied, .. } = &mut self {
            *applied = changes;
        }
        self
    }

    /// The underlying store error, if the failure came from the store
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::StoreUnavailable { source, .. } | Self::FieldApplicationFailed { source, .. } => {
                Some(source)
            }
            Self::InvalidSchema(_) => None,
        }
    }
}
