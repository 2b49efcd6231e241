/// Integration tests for bundle assembly and loader caching.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use w4play_bundle::{
    AssetDir, BundleError, Bundler, DEFAULT_TITLE, FOOTER_LEN, Footer, LoaderSource, MAGIC,
    Platform, Result,
};
use w4play_compiler::CompilationArtifact;

/// Serves a loader whose bytes name the platform, counting fetches.
#[derive(Default)]
struct CountingSource {
    fetches: Arc<AtomicUsize>,
    failures_left: AtomicUsize,
}

#[async_trait]
impl LoaderSource for CountingSource {
    async fn fetch(&self, platform: Platform) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BundleError::Fetch {
                platform,
                path: PathBuf::from(platform.loader_file_name()),
                source: io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"),
            });
        }
        Ok(format!("LOADER-{platform}").into_bytes())
    }
}

fn artifact(module: &[u8]) -> CompilationArtifact {
    CompilationArtifact::new(module.to_vec(), None)
}

#[tokio::test]
async fn test_bundle_composition() {
    let bundler = Bundler::new(CountingSource::default());
    let module = b"\0asm\x01\0\0\0cartridge";
    let bundle = bundler.bundle(Platform::Linux, &artifact(module)).await.unwrap();

    let loader = b"LOADER-linux";
    assert_eq!(bundle.bytes.len(), loader.len() + module.len() + FOOTER_LEN);
    assert_eq!(&bundle.bytes[..loader.len()], loader);
    assert_eq!(
        &bundle.bytes[loader.len()..loader.len() + module.len()],
        module
    );

    let tail = &bundle.bytes[bundle.bytes.len() - FOOTER_LEN..];
    assert_eq!(u32::from_le_bytes(tail[0..4].try_into().unwrap()), MAGIC);
    assert_eq!(
        u32::from_le_bytes(tail[132..136].try_into().unwrap()),
        module.len() as u32
    );
    assert_eq!(
        Footer::parse(&bundle.bytes),
        Some(Footer::new(DEFAULT_TITLE, module.len() as u32))
    );
}

#[tokio::test]
async fn test_filenames() {
    let bundler = Bundler::new(CountingSource::default());
    let module = artifact(b"\0asm");
    for (platform, name) in [
        (Platform::Linux, "wasm4-game"),
        (Platform::MacOS, "wasm4-game"),
        (Platform::Windows, "wasm4-game.exe"),
    ] {
        let bundle = bundler.bundle(platform, &module).await.unwrap();
        assert_eq!(bundle.filename, name);
        assert_eq!(bundle.platform, platform);
        assert!(bundle.bytes.starts_with(format!("LOADER-{platform}").as_bytes()));
    }
}

#[tokio::test]
async fn test_loader_fetched_once_per_platform() {
    let source = CountingSource::default();
    let fetches = Arc::clone(&source.fetches);
    let bundler = Bundler::new(source);
    let module = artifact(b"\0asm");

    bundler.bundle(Platform::Windows, &module).await.unwrap();
    bundler.bundle(Platform::Windows, &module).await.unwrap();
    bundler.bundle(Platform::Windows, &module).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    bundler.bundle(Platform::MacOS, &module).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_retried() {
    let source = CountingSource {
        failures_left: AtomicUsize::new(1),
        ..Default::default()
    };
    let fetches = Arc::clone(&source.fetches);
    let bundler = Bundler::new(source);
    let module = artifact(b"\0asm");

    let err = bundler.bundle(Platform::Linux, &module).await.unwrap_err();
    assert!(matches!(err, BundleError::Fetch { platform: Platform::Linux, .. }));

    let bundle = bundler.bundle(Platform::Linux, &module).await.unwrap();
    assert!(bundle.bytes.starts_with(b"LOADER-linux"));
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_empty_module_is_rejected_before_fetch() {
    let source = CountingSource::default();
    let fetches = Arc::clone(&source.fetches);
    let bundler = Bundler::new(source);

    let err = bundler.bundle(Platform::Linux, &artifact(b"")).await.unwrap_err();
    assert!(matches!(err, BundleError::EmptyModule));
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_custom_title() {
    let bundler = Bundler::new(CountingSource::default()).with_title("Snake");
    let bundle = bundler.bundle(Platform::Linux, &artifact(b"\0asm")).await.unwrap();
    assert_eq!(Footer::parse(&bundle.bytes).unwrap().title, "Snake");
}

#[tokio::test]
async fn test_asset_dir_loader() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("wasm4-toywasm-linux.exe"), b"\x7fELF-loader").unwrap();
    std::fs::write(dir.path().join("wasm4-toywasm-macos.exe"), b"").unwrap();
    let bundler = Bundler::new(AssetDir::new(dir.path()));
    let module = artifact(b"\0asm");

    let bundle = bundler.bundle(Platform::Linux, &module).await.unwrap();
    assert!(bundle.bytes.starts_with(b"\x7fELF-loader"));

    let missing = bundler.bundle(Platform::Windows, &module).await.unwrap_err();
    match missing {
        BundleError::Fetch { platform, path, .. } => {
            assert_eq!(platform, Platform::Windows);
            assert!(path.ends_with("wasm4-toywasm-windows.exe"));
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }

    let empty = bundler.bundle(Platform::MacOS, &module).await.unwrap_err();
    assert!(matches!(empty, BundleError::EmptyLoader(Platform::MacOS)));
}

#[tokio::test]
async fn test_write_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let bundler = Bundler::new(CountingSource::default());
    let bundle = bundler.bundle(Platform::Windows, &artifact(b"\0asm")).await.unwrap();

    let out = dir.path().join("dist");
    let path = bundle.write_to(&out).await.unwrap();
    assert_eq!(path, out.join("wasm4-game.exe"));
    assert_eq!(std::fs::read(&path).unwrap(), bundle.bytes);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
