//! Error types for the codec.
//!
//! One variant per failure mode in the design's error taxonomy: failed
//! opens, I/O failures mid-operation, malformed containers or code tables,
//! truncated input, and worker failures wrapped with their section index.

use std::io;
use thiserror::Error;

/// The error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input could not be read or output could not be created/written.
    #[error("failed to open {path}: {reason}")]
    OpenFailed {
        /// The path that could not be opened.
        path: String,
        /// Underlying I/O error.
        #[source]
        reason: io::Error,
    },

    /// A read, write, or seek failed mid-operation.
    #[error("I/O failure during {phase}: {reason}")]
    IoFailed {
        /// The phase of the operation in progress (e.g. "frequency counting", "section 3 encode").
        phase: String,
        /// Underlying I/O error.
        #[source]
        reason: io::Error,
    },

    /// The container header is malformed.
    #[error("malformed container: {reason}")]
    BadContainer {
        /// Description of what is wrong with the header.
        reason: String,
    },

    /// The code table does not form a valid prefix-free code.
    #[error("invalid code table: {reason}")]
    BadCodeTable {
        /// Description of why the table is invalid.
        reason: String,
    },

    /// Input ended before a codeword completed, or the compressed file is
    /// shorter than the header declares.
    #[error("truncated input: {0}")]
    Truncated(String),

    /// A worker failed; the section index and the inner error are
    /// preserved for diagnostics.
    #[error("worker for section {worker_id} failed: {inner}")]
    WorkerFailed {
        /// Index of the section the failing worker was processing.
        worker_id: usize,
        /// The underlying error.
        #[source]
        inner: Box<CodecError>,
    },
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Wraps a plain I/O error with a descriptive phase label.
    pub fn io(phase: impl Into<String>, reason: io::Error) -> Self {
        CodecError::IoFailed {
            phase: phase.into(),
            reason,
        }
    }

    /// Wraps an open failure.
    pub fn open(path: impl Into<String>, reason: io::Error) -> Self {
        CodecError::OpenFailed {
            path: path.into(),
            reason,
        }
    }

    /// Wraps an error as having occurred inside a specific worker.
    pub fn in_worker(worker_id: usize, inner: CodecError) -> Self {
        CodecError::WorkerFailed {
            worker_id,
            inner: Box::new(inner),
        }
    }

    /// Builds a `BadContainer` error.
    pub fn bad_container(reason: impl Into<String>) -> Self {
        CodecError::BadContainer {
            reason: reason.into(),
        }
    }

    /// Builds a `BadCodeTable` error.
    pub fn bad_code_table(reason: impl Into<String>) -> Self {
        CodecError::BadCodeTable {
            reason: reason.into(),
        }
    }
}
