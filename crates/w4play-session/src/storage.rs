//! Local key/value persistence for edited sources.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::SessionError;

/// A string key/value store, the counterpart of browser local storage.
///
/// Writes are fire-and-forget: implementations log failures instead of
/// reporting them, so persisting an edit can never fail the edit.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }
}

/// Storage backed by a single JSON object file.
///
/// `set` updates the map in memory and hands a snapshot to a background
/// writer task, so an edit never waits on the disk. Snapshots coalesce:
/// the writer persists only the newest one. Await [`FileStorage::flushed`]
/// before exiting to be sure the file is current.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
    pending: watch::Sender<Snapshot>,
    written: watch::Receiver<u64>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    generation: u64,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// Must be called from within a tokio runtime, which hosts the writer.
    pub async fn open(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        let entries: BTreeMap<String, String> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| {
                SessionError::StorageFormat {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SessionError::StorageRead { path, source }),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened storage");
        let (pending, snapshots) = watch::channel(Snapshot {
            generation: 0,
            entries: entries.clone(),
        });
        let (progress, written) = watch::channel(0);
        tokio::spawn(write_behind(path.clone(), snapshots, progress));

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            pending,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait until every `set` made so far has reached the writer. Failed
    /// writes count as done; they are logged, not retried.
    pub async fn flushed(&self) {
        let target = self.pending.borrow().generation;
        let mut written = self.written.clone();
        // Err means the writer is gone, so there is nothing left to wait for.
        let _ = written.wait_for(|generation| *generation >= target).await;
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        // Sent under the entries lock so generations follow insertion order.
        self.pending.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.entries = entries.clone();
        });
    }
}

/// Persist snapshots until the owning [`FileStorage`] is dropped. The last
/// snapshot sent before the drop is still written.
async fn write_behind(
    path: PathBuf,
    mut snapshots: watch::Receiver<Snapshot>,
    progress: watch::Sender<u64>,
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if let Err(err) = write_snapshot(&path, &snapshot.entries).await {
            tracing::warn!(path = %path.display(), "failed to persist storage: {}", err);
        }
        progress.send_replace(snapshot.generation);
    }
}

async fn write_snapshot(path: &Path, entries: &BTreeMap<String, String>) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(entries)?;
    tokio::fs::write(path, json).await
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
