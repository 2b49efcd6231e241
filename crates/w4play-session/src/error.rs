//! Error types for session state.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid playground address: {0}")]
    Address(#[from] url::ParseError),

    #[error("failed to read storage file {}: {source}", .path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storage file {} is not a JSON object of strings: {source}", .path.display())]
    StorageFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
