//! File-backed cart storage.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a sibling temporary file
//! that is then renamed over the target, so a crash mid-write leaves either
//! the previous cart or the new one, never a truncated file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use menu_cart_core::{CartStorage, StorageError};

/// Durable storage in a directory on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the value of `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` for keys that are not plain names.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use menu_cart_core::{CART_KEY, CartStore, CatalogEntry, PersistenceAdapter, Price};

    use super::*;

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.read(CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("carts"));

        storage.write(CART_KEY, "[]").unwrap();

        assert_eq!(storage.read(CART_KEY).unwrap().as_deref(), Some("[]"));
        assert!(storage.dir().join("cart.json").exists());
        assert!(!storage.dir().join("cart.json.tmp").exists());
    }

    #[test]
    fn test_write_replaces_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.write(CART_KEY, "first").unwrap();
        storage.write(CART_KEY, "second").unwrap();

        assert_eq!(storage.read(CART_KEY).unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let storage = FileStorage::new("/tmp");
        assert!(storage.path_for("../etc/passwd").is_err());
        assert!(storage.path_for("").is_err());
        assert!(storage.path_for("cart-v2").is_ok());
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let soup = CatalogEntry::new("soup1", "Borscht", Price::from(150), "borscht.jpg");

        let mut store = CartStore::open(PersistenceAdapter::new(FileStorage::new(dir.path())));
        store.add(&soup);
        store.add(&soup);
        let saved = store.cart().clone();
        drop(store);

        let reopened = CartStore::open(PersistenceAdapter::new(FileStorage::new(dir.path())));
        assert_eq!(reopened.cart(), &saved);
        assert_eq!(reopened.total(), Price::from(300));
    }

    #[test]
    fn test_corrupted_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cart.json"), "{{{").unwrap();

        let store = CartStore::open(PersistenceAdapter::new(FileStorage::new(dir.path())));
        assert!(store.cart().is_empty());
    }
}
