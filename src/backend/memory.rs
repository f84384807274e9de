//! In-memory backend using `DashMap`.
//!
//! Data lives for the lifetime of the process and is never shared across
//! processes. Every `MemoryBackend::shared` handle in a process sees the
//! same map, created on first use.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::Backend;
use crate::identity::StoragePath;
use crate::{Error, Result};

type Store = Arc<DashMap<String, Vec<u8>>>;

static SHARED: OnceLock<Store> = OnceLock::new();

/// In-memory storage keyed by `<root>/<segment>/...`.
///
/// The concurrent map serialises mutation of each entry; beyond that no
/// ordering is promised between concurrent writers.
///
/// # Example
///
/// ```rust
/// use rubicon_db::backend::{Backend, MemoryBackend};
/// use rubicon_db::identity::StoragePath;
///
/// # async fn example() -> rubicon_db::Result<()> {
/// let a = MemoryBackend::shared("doc-example");
/// let b = MemoryBackend::shared("doc-example");
/// let path = StoragePath::root().join("hello");
///
/// a.write(&path, b"world".to_vec()).await?;
/// assert_eq!(b.read(&path).await?, b"world".to_vec());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Store,
    root: String,
}

impl MemoryBackend {
    /// Attach to the process-wide map under `root`.
    #[must_use]
    pub fn shared(root: impl Into<String>) -> Self {
        let store = SHARED.get_or_init(|| Arc::new(DashMap::new()));
        Self {
            store: Arc::clone(store),
            root: root.into(),
        }
    }

    /// Create a backend over a private map, invisible to every other handle.
    #[must_use]
    pub fn isolated(root: impl Into<String>) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            root: root.into(),
        }
    }

    /// Root prefix of this handle.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of values stored under this handle's root.
    #[must_use]
    pub fn len(&self) -> usize {
        let prefix = self.dir_prefix(&StoragePath::root());
        self.store
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .count()
    }

    /// True if nothing is stored under this handle's root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every value under this handle's root.
    pub fn clear(&self) {
        let prefix = self.dir_prefix(&StoragePath::root());
        self.store.retain(|key, _| !key.starts_with(&prefix));
    }

    fn key(&self, path: &StoragePath) -> String {
        if path.is_root() {
            self.root.clone()
        } else {
            format!("{}/{path}", self.root)
        }
    }

    fn dir_prefix(&self, path: &StoragePath) -> String {
        format!("{}/", self.key(path))
    }
}

impl Backend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn write(&self, path: &StoragePath, bytes: Vec<u8>) -> Result<()> {
        self.store.insert(self.key(path), bytes);
        Ok(())
    }

    async fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        self.store
            .get(&self.key(path))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found("read", path))
    }

    async fn list(&self, path: &StoragePath) -> Result<Vec<String>> {
        let prefix = self.dir_prefix(path);
        let names: BTreeSet<String> = self
            .store
            .iter()
            .filter_map(|entry| {
                entry
                    .key()
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.split('/').next())
                    .map(str::to_string)
            })
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn exists(&self, path: &StoragePath) -> Result<bool> {
        Ok(self.store.contains_key(&self.key(path)))
    }

    async fn delete(&self, path: &StoragePath) -> Result<()> {
        let key = self.key(path);
        let prefix = self.dir_prefix(path);
        self.store
            .retain(|k, _| k != &key && !k.starts_with(&prefix));
        Ok(())
    }
}
