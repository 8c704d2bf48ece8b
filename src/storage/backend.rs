//! Storage backend trait and implementations.
//!
//! Every record is a JSON document stored under a string key:
//! - `FileBackend` - one `<key>.json` file per key under the data directory
//! - `MemoryBackend` - in-process map, for tests and throwaway sessions

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for storage backends that handle raw record persistence.
pub trait StorageBackend: Send + Sync {
    /// Read the raw document stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw document under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> &'static str;
}

/// Available storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// JSON files under the data directory (default)
    File,
    /// In-memory map
    Memory,
}

impl BackendType {
    /// Parse a backend type from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" | "default" => Some(Self::File),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(Error::InvalidId(format!("Invalid storage key: {:?}", key)));
    }
    Ok(())
}

/// File-per-key backend.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `root`, creating the directory if needed.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write then rename so a crash never leaves a torn document
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> &'static str {
        BackendType::File.as_str()
    }
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        BackendType::Memory.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backend_type_parse() {
        assert_eq!(BackendType::from_str("FILE"), Some(BackendType::File));
        assert_eq!(BackendType::from_str("mem"), Some(BackendType::Memory));
        assert_eq!(BackendType::from_str("sqlite"), None);
    }

    #[test]
    fn test_file_backend_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("data")).unwrap();
        assert_eq!(backend.read("replicator_risk").unwrap(), None);

        backend.write("replicator_risk", "3").unwrap();
        backend.write("replicator_tempo", "4").unwrap();
        assert_eq!(backend.read("replicator_risk").unwrap().as_deref(), Some("3"));
        assert_eq!(
            backend.keys().unwrap(),
            vec!["replicator_risk", "replicator_tempo"]
        );

        backend.remove("replicator_risk").unwrap();
        backend.remove("replicator_risk").unwrap();
        assert_eq!(backend.read("replicator_risk").unwrap(), None);
    }

    #[test]
    fn test_keys_are_validated() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();
        assert!(backend.write("../escape", "{}").is_err());
        assert!(backend.read("").is_err());

        let mut memory = MemoryBackend::new();
        assert!(memory.write("a/b", "{}").is_err());
    }
}
