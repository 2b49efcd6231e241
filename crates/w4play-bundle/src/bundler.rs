use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use w4play_compiler::CompilationArtifact;

use crate::error::{BundleError, Result};
use crate::footer::{DEFAULT_TITLE, FOOTER_LEN, Footer};
use crate::loader::LoaderSource;
use crate::platform::Platform;

/// A finished standalone executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub platform: Platform,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Bundle {
    /// Write the bundle into `dir` under its file name, marking it
    /// executable where that applies.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).await?;
        }

        Ok(path)
    }
}

/// Builds bundles, fetching each platform's loader at most once.
///
/// A failed fetch is not cached; the next bundle for that platform tries
/// again.
pub struct Bundler<S> {
    source: S,
    title: String,
    loaders: [OnceCell<Arc<[u8]>>; 3],
}

impl<S: LoaderSource> Bundler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            title: DEFAULT_TITLE.to_string(),
            loaders: Default::default(),
        }
    }

    /// Override the title stamped into the footer.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The loader bytes for `platform`, fetched on first use.
    pub async fn loader(&self, platform: Platform) -> Result<Arc<[u8]>> {
        let bytes = self.loaders[platform.index()]
            .get_or_try_init(|| async {
                tracing::info!(%platform, "fetching native loader");
                let bytes = self.source.fetch(platform).await?;
                if bytes.is_empty() {
                    return Err(BundleError::EmptyLoader(platform));
                }
                tracing::debug!(%platform, bytes = bytes.len(), "cached native loader");
                Ok(Arc::from(bytes))
            })
            .await?;
        Ok(Arc::clone(bytes))
    }

    /// Pack `artifact` onto the loader for `platform`.
    pub async fn bundle(&self, platform: Platform, artifact: &CompilationArtifact) -> Result<Bundle> {
        let module = &artifact.module;
        if module.is_empty() {
            return Err(BundleError::EmptyModule);
        }
        let module_len =
            u32::try_from(module.len()).map_err(|_| BundleError::ModuleTooLarge(module.len()))?;

        let loader = self.loader(platform).await?;
        let footer = Footer::new(self.title.as_str(), module_len).to_bytes();

        let mut bytes = Vec::with_capacity(loader.len() + module.len() + FOOTER_LEN);
        bytes.extend_from_slice(&loader);
        bytes.extend_from_slice(module);
        bytes.extend_from_slice(&footer);

        tracing::info!(%platform, bytes = bytes.len(), "bundled cartridge");
        Ok(Bundle {
            platform,
            filename: platform.executable_name().to_string(),
            bytes,
        })
    }
}
