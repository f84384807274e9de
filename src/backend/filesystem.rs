//! Local filesystem backend.
//!
//! Each storage path maps to `root/<segment>/<segment>/...`. Writes go to a
//! hidden temporary file in the target directory and are renamed into
//! place, so concurrent readers (threads or processes sharing the
//! directory) see either the old value or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::Backend;
use crate::identity::StoragePath;
use crate::{Error, Result};

/// Filesystem-backed storage rooted at a directory.
///
/// All operations are synchronous; the async methods complete without
/// suspending.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a backend rooted at `root`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn local_path(&self, path: &StoragePath) -> PathBuf {
        let mut local = self.root.clone();
        local.extend(path.segments());
        local
    }

    fn write_atomic(&self, path: &StoragePath, bytes: &[u8]) -> Result<()> {
        let target = self.local_path(path);
        let dir = target
            .parent()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        fs::create_dir_all(&dir).map_err(|e| Error::from_io("write", path, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| Error::from_io("write", path, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| Error::backend_io("write", path, e))?;
        tmp.persist(&target)
            .map_err(|e| Error::backend_io("write", path, e.error))?;
        Ok(())
    }
}

impl Backend for FilesystemBackend {
    fn kind(&self) -> &'static str {
        "filesystem"
    }

    async fn write(&self, path: &StoragePath, bytes: Vec<u8>) -> Result<()> {
        self.write_atomic(path, &bytes)
    }

    async fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        let local = self.local_path(path);
        if local.is_dir() {
            return Err(Error::not_found("read", path));
        }
        fs::read(local).map_err(|e| Error::from_io("read", path, e))
    }

    async fn list(&self, path: &StoragePath) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.local_path(path)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::backend_io("list", path, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::backend_io("list", path, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                debug!(%path, "skipping non-UTF-8 directory entry");
                continue;
            };
            // Hidden entries are in-flight temporary files
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort_unstable();
        Ok(names)
    }

    async fn exists(&self, path: &StoragePath) -> Result<bool> {
        match fs::metadata(self.local_path(path)) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::backend_io("exists", path, e)),
        }
    }

    async fn delete(&self, path: &StoragePath) -> Result<()> {
        let local = self.local_path(path);
        let result = match fs::symlink_metadata(&local) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(&local),
            Ok(_) => fs::remove_file(&local),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                debug!(%path, "deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::backend_io("delete", path, e)),
        }
    }
}
