//! Crash-safe JSON document store.
//!
//! Every document lives in its own file. Access to a file is serialized by a
//! per-path mutex held in a table owned by the [`ConfigStore`]; the table only
//! grows, so a waiter can never be left holding a lock that was swapped out.
//!
//! Writes go to a temp file in the target's directory, are fsynced, then
//! renamed over the target. The target is therefore always either absent or a
//! complete document. Reads never fail: missing, unreadable or corrupt files
//! come back as an empty document and are logged.
//!
//! File I/O runs on tokio's blocking pool. The owned lock guard moves into the
//! blocking task, so the lock is held until the I/O is done even if the
//! calling future is dropped halfway.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::models::guild::default_guild_config;
use crate::utils::paths::{ensure_parent_dir, DataPaths};

/// A JSON object as stored on disk. The store imposes no schema.
pub type Document = Map<String, Value>;

#[derive(Debug)]
pub struct ConfigStore {
    paths: DataPaths,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl ConfigStore {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            locks: DashMap::new(),
        }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// The lock for `path`, created on first use
    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        // Clone out of the map so the shard guard is gone before anyone awaits
        self.locks.entry(path.to_path_buf()).or_default().clone()
    }

    /// Runs `f` on the blocking pool while holding the lock for `path`
    async fn with_lock<T, F>(&self, path: PathBuf, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Path) -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.lock_for(&path).lock_owned().await;
        let out = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            f(&path)
        })
        .await?;
        Ok(out)
    }

    /// Reads the document at `path`; absent or corrupt files read as `{}`
    pub async fn read(&self, path: &Path) -> Document {
        match self.with_lock(path.to_path_buf(), read_document).await {
            Ok(doc) => doc,
            Err(e) => {
                error!("Read of {} aborted: {}", path.display(), e);
                Document::new()
            }
        }
    }

    /// Atomically replaces the document at `path`
    pub async fn write(&self, path: &Path, doc: &Document) -> Result<(), StoreError> {
        let bytes = to_pretty_json(doc)?;
        self.with_lock(path.to_path_buf(), move |p| write_bytes(p, &bytes))
            .await?
    }

    /// Read-modify-write of the document at `path` under a single lock
    /// acquisition, so concurrent updates to one file never lose each other.
    /// The document is saved even if `f` leaves it unchanged.
    pub async fn update<T, F>(&self, path: &Path, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Document) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.with_lock(path.to_path_buf(), move |p| -> Result<T, StoreError> {
            let mut doc = read_document(p);
            let out = f(&mut doc);
            write_document(p, &doc)?;
            Ok(out)
        })
        .await?
    }

    /// Loads a guild's config, creating it from defaults when the file is
    /// missing or reads as empty (which includes corrupt files).
    ///
    /// This is a read with a side effect: the defaults are persisted before
    /// returning. If that write fails the defaults are still returned and
    /// creation is retried on the next load.
    pub async fn load_guild_config(&self, guild_id: u64) -> Document {
        let path = self.paths.server_config(guild_id);
        let loaded = self
            .with_lock(path, move |p| {
                ensure_parent_dir(p);
                let doc = read_document(p);
                if !doc.is_empty() {
                    return doc;
                }
                let defaults = default_guild_config();
                info!("Creating default config for guild {}", guild_id);
                if let Err(e) = write_document(p, &defaults) {
                    error!("Failed to persist default config for guild {}: {}", guild_id, e);
                }
                defaults
            })
            .await;

        match loaded {
            Ok(doc) => doc,
            Err(e) => {
                error!("Loading config for guild {} aborted: {}", guild_id, e);
                default_guild_config()
            }
        }
    }

    /// Replaces a guild's config. No merging with defaults happens here.
    pub async fn save_guild_config(&self, guild_id: u64, doc: &Document) -> Result<(), StoreError> {
        let bytes = to_pretty_json(doc)?;
        self.with_lock(self.paths.server_config(guild_id), move |p| {
            ensure_parent_dir(p);
            write_bytes(p, &bytes)
        })
        .await?
    }

    /// Like [`update`](Self::update) for a guild config; `f` sees the default
    /// document if the guild has none yet.
    pub async fn update_guild_config<T, F>(&self, guild_id: u64, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Document) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.with_lock(self.paths.server_config(guild_id), move |p| -> Result<T, StoreError> {
            ensure_parent_dir(p);
            let mut doc = read_document(p);
            if doc.is_empty() {
                doc = default_guild_config();
            }
            let out = f(&mut doc);
            write_document(p, &doc)?;
            Ok(out)
        })
        .await?
    }

    pub async fn load_global_config(&self) -> Document {
        self.read(&self.paths.global_config()).await
    }

    // Whole-document replace; the commands mutate through update_global_config
    #[allow(dead_code)]
    pub async fn save_global_config(&self, doc: &Document) -> Result<(), StoreError> {
        self.write(&self.paths.global_config(), doc).await
    }

    pub async fn update_global_config<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Document) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.update(&self.paths.global_config(), f).await
    }

    pub async fn load_reaction_roles(&self) -> Document {
        self.read(&self.paths.reaction_roles()).await
    }

    // Whole-document replace; the commands mutate through update_reaction_roles
    #[allow(dead_code)]
    pub async fn save_reaction_roles(&self, doc: &Document) -> Result<(), StoreError> {
        self.write(&self.paths.reaction_roles(), doc).await
    }

    pub async fn update_reaction_roles<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Document) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.update(&self.paths.reaction_roles(), f).await
    }

    /// Minigame data such as `quiz.json` or `hangman.json`
    pub async fn load_dataset(&self, name: &str) -> Document {
        self.read(&self.paths.resource(name)).await
    }
}

/// Serializes with four-space indentation, matching the files already on disk
fn to_pretty_json(doc: &Document) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    Ok(buf)
}

fn read_document(path: &Path) -> Document {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist yet", path.display());
            return Document::new();
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            return Document::new();
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(doc)) => doc,
        Ok(other) => {
            warn!(
                "{} holds a JSON {} instead of an object, treating as empty",
                path.display(),
                json_kind(&other)
            );
            Document::new()
        }
        Err(e) => {
            warn!("Corrupt JSON in {}: {}, treating as empty", path.display(), e);
            Document::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let bytes = to_pretty_json(doc)?;
    write_bytes(path, &bytes)
}

/// temp file in the same directory -> write -> fsync -> rename.
///
/// `NamedTempFile` unlinks itself on drop, which covers cleanup on every
/// early return, including a failed rename.
fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let prefix = format!(
        ".{}.",
        path.file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default()
    );

    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| StoreError::io(dir, e))?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| StoreError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    sync_dir(dir);
    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Makes the rename itself durable. Not every platform can open a directory,
/// so failures are ignored.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = std::fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}
