//! Airtable meta API operations
//!
//! Operations describe a single schema call; payloads describe the bodies
//! sent when creating bases, tables and fields.

pub mod operation;
pub mod payload;

pub use operation::Operation;
pub use payload::{BasePayload, FieldPayload, TablePayload};
