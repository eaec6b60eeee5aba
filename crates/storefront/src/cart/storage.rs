//! Durable key-value slots for cart snapshots.
//!
//! A slot survives across sessions on the same client. The cart writes one
//! serialized snapshot under [`CART_STORAGE_KEY`] after every mutation and
//! reads it once at construction. Writers sharing a slot are
//! last-writer-wins; nothing merges concurrent snapshots.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Key of the slot holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "spacegoods_cart";

/// Errors from reading or writing a slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing would exceed the storage quota.
    #[error("storage quota exceeded: needs {attempted} bytes, limit is {limit}")]
    QuotaExceeded { limit: usize, attempted: usize },

    /// Storage is disabled or cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A durable key-value slot.
pub trait CartStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is rejected or fails.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for &mut T {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

/// In-process slot map with an optional byte quota.
///
/// Used for request-scoped carts (seeded from the session) and in tests.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    available: bool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create empty, unlimited storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            quota: None,
            available: true,
        }
    }

    /// Create storage that rejects writes once keys plus values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::new()
        }
    }

    /// Create storage where every read and write fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Seed storage with a single entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Read an entry without going through the trait.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Take an entry out of the storage.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable("storage is disabled".to_owned()))
        }
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;

        if let Some(limit) = self.quota {
            let attempted = self.used_bytes_excluding(key) + key.len() + value.len();
            if attempted > limit {
                return Err(StorageError::QuotaExceeded { limit, attempted });
            }
        }

        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================================
// File storage
// =============================================================================

/// One JSON file per key under a directory.
///
/// Writes go to a temp file in the same directory, are fsynced, then renamed
/// over the target so readers never see a partial snapshot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let final_path = self.path_for(key);
        let temp_path = self
            .dir
            .join(format!("{key}.json.tmp.{}", std::process::id()));

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load("k").unwrap().is_none());

        storage.save("k", "v1").unwrap();
        storage.save("k", "v2").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_memory_quota() {
        let mut storage = MemoryStorage::with_quota(10);
        storage.save("k", "123456789").unwrap();

        let err = storage.save("k", "1234567890").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                limit: 10,
                attempted: 11
            }
        ));
        // Rejected write leaves the old value in place.
        assert_eq!(storage.get("k"), Some("123456789"));
    }

    #[test]
    fn test_memory_unavailable() {
        let mut storage = MemoryStorage::unavailable();
        assert!(matches!(
            storage.load("k"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            storage.save("k", "v"),
            Err(StorageError::Unavailable(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert!(storage.load(CART_STORAGE_KEY).unwrap().is_none());
        storage.save(CART_STORAGE_KEY, "{\"items\":[]}").unwrap();

        assert_eq!(
            storage.load(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("{\"items\":[]}")
        );
        assert!(storage.path_for(CART_STORAGE_KEY).exists());
    }

    #[test]
    fn test_file_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.save(CART_STORAGE_KEY, "a").unwrap();
        storage.save(CART_STORAGE_KEY, "b").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{CART_STORAGE_KEY}.json")]);
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn write<S: CartStorage>(mut storage: S) {
            storage.save("k", "v").unwrap();
        }

        let mut storage = MemoryStorage::new();
        write(&mut storage);
        assert_eq!(storage.get("k"), Some("v"));
    }
}
