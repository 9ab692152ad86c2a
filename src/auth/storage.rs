//! Durable storage for the session record.
//!
//! The session survives process restarts through a single JSON record on
//! disk. Storage is behind a trait so the store can run against an
//! in-memory backend when no usable directory exists, and in tests.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

use super::session::SessionRecord;

/// Session file name inside the app cache directory
const SESSION_FILE: &str = "session.json";

/// Backend holding at most one persisted session record.
///
/// Absence of the record means "no session". Implementations are
/// best-effort: callers treat any error as a degraded (memory-only)
/// session, never as a fatal condition.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<SessionRecord>>;
    fn store(&self, record: &SessionRecord) -> Result<()>;
    fn erase(&self) -> Result<()>;
}

/// File-backed storage, one pretty-printed JSON record per app.
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .context("Failed to read session file")?;
        let record: SessionRecord = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;
        Ok(Some(record))
    }

    fn store(&self, record: &SessionRecord) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(record)?;
        std::fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn erase(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// In-memory storage. The session lives only as long as the process.
#[derive(Default)]
pub struct MemorySessionStorage {
    record: Mutex<Option<SessionRecord>>,
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>> {
        Ok(self.record.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn store(&self, record: &SessionRecord) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        Ok(())
    }

    fn erase(&self) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cardbinder-storage-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = temp_dir("roundtrip");
        let storage = FileSessionStorage::new(dir.clone());

        assert!(storage.load().unwrap().is_none());

        let record = SessionRecord::new("tok-123".to_string());
        storage.store(&record).unwrap();

        let loaded = storage.load().unwrap().expect("record should exist");
        assert_eq!(loaded.token, "tok-123");

        storage.erase().unwrap();
        assert!(storage.load().unwrap().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_storage_erase_is_idempotent() {
        let dir = temp_dir("erase");
        let storage = FileSessionStorage::new(dir.clone());

        // Nothing stored yet; erasing twice must still succeed
        storage.erase().unwrap();
        storage.erase().unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemorySessionStorage::default();
        assert!(storage.load().unwrap().is_none());

        storage.store(&SessionRecord::new("tok".to_string())).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().token, "tok");

        storage.erase().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
