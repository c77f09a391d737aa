use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::progress::errors::ProgressError;

const DEFAULT_TREE: &str = "snakesave";

/// Key-value store for raw save blobs. The engine never looks past strings.
pub trait BlobStore {
    /// Fetch the value under `key`, or `None` when it was never written.
    fn load_raw(&self, key: &str) -> Result<Option<String>, ProgressError>;

    /// Write `value` under `key`, replacing any previous value.
    fn save_raw(&self, key: &str, value: &str) -> Result<(), ProgressError>;
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct SledBlobStoreBuilder {
    path: PathBuf,
    tree: String,
}

impl SledBlobStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tree: DEFAULT_TREE.to_string(),
        }
    }

    /// Keep blobs in a named tree (several profiles can share one database).
    pub fn with_tree(mut self, tree: impl Into<String>) -> Self {
        self.tree = tree.into();
        self
    }

    pub fn open(self) -> Result<SledBlobStore, ProgressError> {
        SledBlobStore::open_with_tree(self.path, &self.tree)
    }
}

/// Sled-backed blob store on local disk.
pub struct SledBlobStore {
    _db: sled::Db,
    blobs: sled::Tree,
}

impl SledBlobStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        Self::open_with_tree(path, DEFAULT_TREE)
    }

    fn open_with_tree<P: AsRef<Path>>(path: P, tree: &str) -> Result<Self, ProgressError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let blobs = db.open_tree(tree)?;
        debug!("Opened blob store at {} (tree {})", path_ref.display(), tree);
        Ok(Self { _db: db, blobs })
    }
}

impl BlobStore for SledBlobStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, ProgressError> {
        let Some(bytes) = self.blobs.get(key.as_bytes())? else {
            return Ok(None);
        };
        Ok(Some(std::str::from_utf8(&bytes)?.to_string()))
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), ProgressError> {
        self.blobs.insert(key.as_bytes(), value.as_bytes())?;
        self.blobs.flush()?;
        Ok(())
    }
}

/// In-process store, used by tests and tools that never touch disk.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RefCell<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with_blob(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.blobs.borrow_mut().insert(key.into(), value.into());
        self
    }
}

impl BlobStore for MemoryBlobStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, ProgressError> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), ProgressError> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: BlobStore + ?Sized> BlobStore for &S {
    fn load_raw(&self, key: &str) -> Result<Option<String>, ProgressError> {
        (**self).load_raw(key)
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), ProgressError> {
        (**self).save_raw(key, value)
    }
}
