//! Storage backend adapters
//!
//! A uniform byte-level interface over three kinds of storage:
//! - [`FilesystemBackend`]: local disk, atomic write-then-rename
//! - [`MemoryBackend`]: process-wide concurrent map
//! - [`ObjectStoreBackend`]: any `object_store` provider (S3, GCS, Azure,
//!   local, in-memory), with bounded retries on idempotent reads
//!
//! The trait is async. The filesystem and memory backends never suspend,
//! so driving several of their futures concurrently executes them one
//! after another; only the object-store backend overlaps I/O.
//!
//! # Example
//!
//! ```rust
//! use rubicon_db::backend::{Backend, MemoryBackend};
//! use rubicon_db::identity::StoragePath;
//!
//! # async fn example() -> rubicon_db::Result<()> {
//! let backend = MemoryBackend::isolated("root");
//! let path = StoragePath::root().join("project").join("metadata");
//!
//! backend.write(&path, b"record".to_vec()).await?;
//! assert_eq!(backend.read(&path).await?, b"record".to_vec());
//! assert_eq!(backend.list(&StoragePath::root()).await?, vec!["project".to_string()]);
//!
//! backend.delete(&StoragePath::root().join("project")).await?;
//! assert!(!backend.exists(&path).await?);
//! # Ok(())
//! # }
//! ```

mod filesystem;
mod memory;
mod remote;
mod retry;

pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use remote::ObjectStoreBackend;
pub use retry::RetryPolicy;

use std::future::Future;

use crate::identity::StoragePath;
use crate::Result;

/// Byte-level storage primitives the repository is written against.
pub trait Backend: Send + Sync {
    /// Short backend name for logs.
    fn kind(&self) -> &'static str;

    /// Store `bytes` at `path`, replacing any previous value.
    ///
    /// Readers never observe a partially written value.
    fn write(&self, path: &StoragePath, bytes: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    /// Read the value at `path`.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if nothing was
    /// written there.
    fn read(&self, path: &StoragePath) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Names of the immediate children of `path`, sorted.
    ///
    /// A path with no children (including one that was never written) lists
    /// as empty.
    fn list(&self, path: &StoragePath) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// True if a value was written at exactly `path`.
    fn exists(&self, path: &StoragePath) -> impl Future<Output = Result<bool>> + Send;

    /// Remove the value at `path` and everything beneath it.
    ///
    /// No-op if nothing is there.
    fn delete(&self, path: &StoragePath) -> impl Future<Output = Result<()>> + Send;
}

/// Runtime-selected backend, built from a
/// [`RepositoryConfig`](crate::repository::RepositoryConfig).
#[derive(Debug, Clone)]
pub enum AnyBackend {
    /// Local disk
    Filesystem(FilesystemBackend),
    /// Process-wide memory
    Memory(MemoryBackend),
    /// Object storage
    ObjectStore(ObjectStoreBackend),
}

impl From<FilesystemBackend> for AnyBackend {
    fn from(backend: FilesystemBackend) -> Self {
        Self::Filesystem(backend)
    }
}

impl From<MemoryBackend> for AnyBackend {
    fn from(backend: MemoryBackend) -> Self {
        Self::Memory(backend)
    }
}

impl From<ObjectStoreBackend> for AnyBackend {
    fn from(backend: ObjectStoreBackend) -> Self {
        Self::ObjectStore(backend)
    }
}

impl Backend for AnyBackend {
    fn kind(&self) -> &'static str {
        match self {
            Self::Filesystem(b) => b.kind(),
            Self::Memory(b) => b.kind(),
            Self::ObjectStore(b) => b.kind(),
        }
    }

    async fn write(&self, path: &StoragePath, bytes: Vec<u8>) -> Result<()> {
        match self {
            Self::Filesystem(b) => b.write(path, bytes).await,
            Self::Memory(b) => b.write(path, bytes).await,
            Self::ObjectStore(b) => b.write(path, bytes).await,
        }
    }

    async fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        match self {
            Self::Filesystem(b) => b.read(path).await,
            Self::Memory(b) => b.read(path).await,
            Self::ObjectStore(b) => b.read(path).await,
        }
    }

    async fn list(&self, path: &StoragePath) -> Result<Vec<String>> {
        match self {
            Self::Filesystem(b) => b.list(path).await,
            Self::Memory(b) => b.list(path).await,
            Self::ObjectStore(b) => b.list(path).await,
        }
    }

    async fn exists(&self, path: &StoragePath) -> Result<bool> {
        match self {
            Self::Filesystem(b) => b.exists(path).await,
            Self::Memory(b) => b.exists(path).await,
            Self::ObjectStore(b) => b.exists(path).await,
        }
    }

    async fn delete(&self, path: &StoragePath) -> Result<()> {
        match self {
            Self::Filesystem(b) => b.delete(path).await,
            Self::Memory(b) => b.delete(path).await,
            Self::ObjectStore(b) => b.delete(path).await,
        }
    }
}
