//! cdx-bridge common types and errors.
//!
//! This crate provides foundational types shared across cdx-core modules:
//! - The error taxonomy (invalid parameter vs. computation failure)
//! - Structured error and batch result containers for machine output
//! - Output formats
//! - The output schema version

pub mod error;
pub mod output;
pub mod schema;

pub use error::{
    format_batch_human, format_error_human, BatchError, BatchResult, BatchSummary, Error,
    ErrorCategory, Result, StructuredError, SuggestedAction,
};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
