//! Where native loader executables come from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{BundleError, Result};
use crate::platform::Platform;

/// Fetches the native loader executable for a platform.
#[async_trait]
pub trait LoaderSource: Send + Sync {
    async fn fetch(&self, platform: Platform) -> Result<Vec<u8>>;
}

/// Loaders stored as files in one directory, named by
/// [`Platform::loader_file_name`].
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn loader_path(&self, platform: Platform) -> PathBuf {
        self.root.join(platform.loader_file_name())
    }
}

#[async_trait]
impl LoaderSource for AssetDir {
    async fn fetch(&self, platform: Platform) -> Result<Vec<u8>> {
        let path = self.loader_path(platform);
        tokio::fs::read(&path)
            .await
            .map_err(|source| BundleError::Fetch {
                platform,
                path,
                source,
            })
    }
}
