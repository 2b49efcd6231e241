//! Error types for the compiler layer.
//!
//! Compile failures are not errors here: backends report them as
//! [`Diagnostic`](crate::Diagnostic) data. These types cover the
//! infrastructure around the compilers.

use std::io;

use thiserror::Error;

use crate::language::Language;

/// Infrastructure failures while driving a compiler backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to initialize the {} toolchain: {reason}", .language.display_name())]
    Initialization { language: Language, reason: String },

    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("compiler scratch space I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Failures talking to the compiler worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("compiler worker has shut down")]
    Closed,

    #[error("compiler worker dropped request {0} without replying")]
    Dropped(u64),

    #[error("malformed worker message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("worker channel I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
#[error("unknown language tag `{0}` (expected `ts` or `rol`)")]
pub struct UnknownLanguage(pub String);

/// Result type for backend operations.
pub type Result<T, E = BackendError> = std::result::Result<T, E>;
