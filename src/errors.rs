// src/errors.rs

//! Crate-wide error type, aliases and the serialisable diagnostic form used
//! for per-record failures that must not abort a batch.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceviewError {
    /// Invalid setup (config values, worker/core layout). Fatal to the call.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Timestamp ordering violated inside a single record.
    #[error("Trace integrity error: {0}")]
    TraceIntegrity(String),

    #[error("Unrecognized edge format: {0}")]
    UnrecognizedEdgeFormat(String),

    #[error("Unrecognized path format: {0}")]
    UnrecognizedPathFormat(String),

    /// A record points at a `(worker, core)` slot that has no row.
    #[error("No row for worker {worker_id} core {core_id} ({record})")]
    MissingRow {
        worker_id: u32,
        core_id: u32,
        record: String,
    },

    #[error("Trace not found: {0}")]
    TraceNotFound(String),

    #[error("Graph not found: {0}")]
    GraphNotFound(u32),

    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of an error, stable enough to show to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Configuration,
    TraceIntegrity,
    UnrecognizedEdgeFormat,
    UnrecognizedPathFormat,
    MissingRow,
    Load,
}

/// Error that was contained rather than propagated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl TraceviewError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            TraceviewError::ConfigError(_) => DiagnosticKind::Configuration,
            TraceviewError::TraceIntegrity(_) => DiagnosticKind::TraceIntegrity,
            TraceviewError::UnrecognizedEdgeFormat(_) => DiagnosticKind::UnrecognizedEdgeFormat,
            TraceviewError::UnrecognizedPathFormat(_) => DiagnosticKind::UnrecognizedPathFormat,
            TraceviewError::MissingRow { .. } => DiagnosticKind::MissingRow,
            _ => DiagnosticKind::Load,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<&TraceviewError> for Diagnostic {
    fn from(err: &TraceviewError) -> Self {
        err.to_diagnostic()
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TraceviewError>;
