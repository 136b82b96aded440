//! Durable key-value backends for the booking store.
//!
//! The store never touches the filesystem directly; all durable access
//! goes through [`StoreBackend`] so a test double or a different
//! persistence layer can be substituted without touching the rest of
//! the crate.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::HyttebokResult;

/// A durable key-value record shared by every execution context.
pub trait StoreBackend: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn read(&self, key: &str) -> HyttebokResult<Option<String>>;

    /// Replace the value stored under `key` in one step.
    fn write(&self, key: &str, value: &str) -> HyttebokResult<()>;
}

/// File-per-key backend rooted at a data directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StoreBackend for FileBackend {
    fn read(&self, key: &str) -> HyttebokResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> HyttebokResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        // Write to a temp file first; the rename is atomic, so a failed
        // write never clobbers the previous value
        let temp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, self.key_path(key))?;
        Ok(())
    }
}

/// In-memory backend for tests and embedders without a filesystem.
#[derive(Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Make every subsequent write fail, mimicking an exhausted quota.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StoreBackend for MemoryBackend {
    fn read(&self, key: &str) -> HyttebokResult<Option<String>> {
        let values = self.values.lock().expect("backend mutex poisoned");
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> HyttebokResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("storage quota exceeded").into());
        }
        let mut values = self.values.lock().expect("backend mutex poisoned");
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
