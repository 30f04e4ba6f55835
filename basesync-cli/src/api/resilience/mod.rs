//! Request pacing and client configuration
//!
//! Provides request pacing and monitoring configuration for calls against
//! the Airtable meta API.

pub mod config;
pub mod pacing;

pub use config::ClientConfig;
pub use pacing::{PacerStats, RequestPacer};
