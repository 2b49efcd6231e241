use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::platform::Platform;

/// Reasons a bundle cannot be produced.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot bundle an empty module")]
    EmptyModule,

    #[error("module of {0} bytes does not fit the footer's length field")]
    ModuleTooLarge(usize),

    #[error("failed to fetch the {platform} loader from {}: {source}", .path.display())]
    Fetch {
        platform: Platform,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("the {0} loader is empty")]
    EmptyLoader(Platform),

    #[error("failed to write bundle: {0}")]
    Write(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BundleError>;
