//! Error taxonomy for audit runs
//!
//! Everything here is fatal: no variant is retried or recovered internally.
//! The orchestrator converts these into `anyhow::Error` at its boundary and
//! the CLI reports a single human-readable failure message.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// A required column is absent from an input file. Raised during
    /// validation, before any mutation.
    #[error("Missing '{column}' column in {file}")]
    Validation { column: String, file: PathBuf },

    /// A header lookup failed mid-pipeline.
    #[error("Column '{header}' not found in sheet '{sheet}'")]
    ColumnNotFound { header: String, sheet: String },

    /// An audit against the same file pair is already running.
    #[error("An audit is already running for this file pair")]
    RunInProgress,

    /// Source unreadable or destination unwritable.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
