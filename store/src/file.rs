//! File-backed storage: one JSON file per key inside a private data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use capyflows_utils::{
    AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write_with_options, ensure_secure_dir,
    recover_bak_file,
};

use crate::storage::{StateStorage, StorageError};

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory with owner-only permissions.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        ensure_secure_dir(&dir).map_err(|source| StorageError::Write {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(path = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || key.starts_with('.')
            || !key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StateStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        recover_bak_file(&path);

        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let options = AtomicWriteOptions {
            file_sync: FileSyncPolicy::SyncAll,
            sync_parent_dir: true,
            mode: PersistMode::OwnerOnly,
        };
        atomic_write_with_options(&path, value.as_bytes(), options)
            .map_err(|source| StorageError::Write { path, source })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove { path, source }),
        }
    }
}
