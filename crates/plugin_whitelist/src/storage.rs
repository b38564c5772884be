//! Backing store for the identity list

use std::{
    fmt,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::error::{StorageError, StorageResult};

/// Synchronous read/write access to the persisted identity list.
pub trait BackingStore: Send + Sync + fmt::Debug {
    /// Read the whole store. Returns `Ok(None)` when it does not exist yet.
    fn read(&self) -> StorageResult<Option<String>>;

    /// Replace the whole store with `contents`.
    fn write(&self, contents: &str) -> StorageResult<()>;

    /// Human-readable location for logs
    fn location(&self) -> String;
}

/// Plain UTF-8 text file, one identity per line.
#[derive(Debug, Clone)]
pub struct TextFileStore {
    path: PathBuf,
}

impl TextFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory the list lives in, created on demand.
    fn ensure_parent(&self) -> StorageResult<&Path> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::DirectoryCreate(parent.to_path_buf(), e))?;
        }
        Ok(parent)
    }
}

impl BackingStore for TextFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn read(&self) -> StorageResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                debug!("Read {} bytes", contents.len());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::FileRead(self.path.clone(), e)),
        }
    }

    #[instrument(skip(self, contents), fields(path = %self.path.display()))]
    fn write(&self, contents: &str) -> StorageResult<()> {
        let parent = self.ensure_parent()?;

        // Unique sibling of the list; removed on drop if anything below fails
        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| StorageError::FileCreate(parent.to_path_buf(), e))?;

        temp.write_all(contents.as_bytes())
            .map_err(|e| StorageError::FileWrite(temp.path().to_path_buf(), e))?;

        temp.as_file()
            .sync_all()
            .map_err(|e| StorageError::FileSync(temp.path().to_path_buf(), e))?;

        // Atomic rename
        let temp_path = temp.path().to_path_buf();
        temp.persist(&self.path)
            .map_err(|e| StorageError::FileRename(temp_path, self.path.clone(), e.error))?;

        info!("💾 Saved identity list ({} bytes)", contents.len());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
