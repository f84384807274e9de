//! Object-store backend.
//!
//! Wraps any [`ObjectStore`] provider. Storage paths become object keys
//! under a fixed prefix, and "directories" are the key prefixes that
//! `list_with_delimiter` reports. Single-object puts are atomic on every
//! provider, which is what gives readers whole values.
//!
//! Cloud providers are behind the `aws`, `gcp` and `azure` cargo features;
//! `file://` and `memory://` URLs always work. Every `memory://` URL in a
//! process resolves to the same in-memory store, so reopening one sees
//! earlier writes.

use std::sync::{Arc, OnceLock};

use futures::TryStreamExt;
use object_store::memory::InMemory;
use object_store::path::{Path, PathPart};
use object_store::{ObjectStore, PutPayload};
use percent_encoding::percent_decode_str;
use tracing::{debug, info};
use url::Url;

use super::{Backend, RetryPolicy};
use crate::identity::StoragePath;
use crate::{Error, Result};

static SHARED_MEMORY: OnceLock<Arc<InMemory>> = OnceLock::new();

/// Storage on an object store (S3, GCS, Azure, local, in-memory).
///
/// Reads, listings and existence checks are retried on transient
/// failures according to the configured [`RetryPolicy`]. Writes and
/// deletes are attempted once.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    prefix: Path,
    retry: RetryPolicy,
}

impl ObjectStoreBackend {
    /// Wrap an existing store, rooting every key under `prefix`.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, prefix: Path, retry: RetryPolicy) -> Self {
        Self {
            store,
            prefix,
            retry,
        }
    }

    /// Private in-memory object store, mostly for tests.
    #[must_use]
    pub fn in_memory(prefix: &str) -> Self {
        Self::new(Arc::new(InMemory::new()), Path::from(prefix), RetryPolicy::default())
    }

    /// Open the store a URL names (`s3://bucket/prefix`, `gs://...`,
    /// `az://...`, `file:///...`, `memory:///...`).
    ///
    /// `memory://` URLs share one process-wide store; the URL path is the
    /// key prefix that separates them.
    ///
    /// Credentials and region come from the environment, the same way the
    /// provider SDKs pick them up (`AWS_ACCESS_KEY_ID`,
    /// `GOOGLE_SERVICE_ACCOUNT`, `AZURE_STORAGE_ACCOUNT_NAME`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] if the URL is malformed or names a
    /// provider this build was compiled without.
    pub fn from_url(url: &str, retry: RetryPolicy) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::backend_io("open", url, e))?;
        let options = std::env::vars().map(|(key, value)| (key.to_ascii_lowercase(), value));
        let (store, prefix) = object_store::parse_url_opts(&parsed, options)
            .map_err(|e| Error::backend_io("open", url, e))?;
        let store: Arc<dyn ObjectStore> = if parsed.scheme() == "memory" {
            SHARED_MEMORY.get_or_init(|| Arc::new(InMemory::new())).clone()
        } else {
            Arc::from(store)
        };
        info!(url, %prefix, "opened object store");
        Ok(Self::new(store, prefix, retry))
    }

    /// Key prefix every path is rooted under.
    #[must_use]
    pub const fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Retry policy for idempotent calls.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn location(&self, path: &StoragePath) -> Path {
        path.segments()
            .iter()
            .fold(self.prefix.clone(), |location, segment| {
                location.child(PathPart::from(segment.as_str()))
            })
    }

    async fn list_once(&self, location: &Path) -> object_store::Result<Vec<String>> {
        let listing = self.store.list_with_delimiter(Some(location)).await?;
        let dirs = listing.common_prefixes.iter().filter_map(Path::filename);
        let files = listing
            .objects
            .iter()
            .filter_map(|meta| meta.location.filename());

        let mut names: Vec<String> = dirs
            .chain(files)
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
            .collect();
        names.sort_unstable();
        names.dedup();
        Ok(names)
    }
}

impl Backend for ObjectStoreBackend {
    fn kind(&self) -> &'static str {
        "object_store"
    }

    async fn write(&self, path: &StoragePath, bytes: Vec<u8>) -> Result<()> {
        let location = self.location(path);
        self.store
            .put(&location, PutPayload::from(bytes))
            .await
            .map_err(|e| Error::from_object_store("write", path, e))?;
        Ok(())
    }

    async fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        let store = &self.store;
        let location = &self.location(path);
        self.retry
            .run("read", path, || async move {
                let object = store
                    .get(location)
                    .await
                    .map_err(|e| Error::from_object_store("read", path, e))?;
                let bytes = object
                    .bytes()
                    .await
                    .map_err(|e| Error::from_object_store("read", path, e))?;
                Ok(bytes.to_vec())
            })
            .await
    }

    async fn list(&self, path: &StoragePath) -> Result<Vec<String>> {
        let location = &self.location(path);
        self.retry
            .run("list", path, || async move {
                match self.list_once(location).await {
                    Ok(names) => Ok(names),
                    Err(object_store::Error::NotFound { .. }) => Ok(Vec::new()),
                    Err(e) => Err(Error::backend_io("list", path, e)),
                }
            })
            .await
    }

    async fn exists(&self, path: &StoragePath) -> Result<bool> {
        let store = &self.store;
        let location = &self.location(path);
        self.retry
            .run("exists", path, || async move {
                match store.head(location).await {
                    Ok(_) => Ok(true),
                    Err(object_store::Error::NotFound { .. }) => Ok(false),
                    Err(e) => Err(Error::backend_io("exists", path, e)),
                }
            })
            .await
    }

    async fn delete(&self, path: &StoragePath) -> Result<()> {
        let location = self.location(path);

        let nested: Vec<Path> = match self
            .store
            .list(Some(&location))
            .map_ok(|meta| meta.location)
            .try_collect()
            .await
        {
            Ok(nested) => nested,
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(Error::backend_io("delete", path, e)),
        };

        // Directory-like prefixes are not objects on every provider
        let exact = match self.store.head(&location).await {
            Ok(_) => Some(&location),
            Err(object_store::Error::NotFound { .. }) => None,
            Err(e) => return Err(Error::backend_io("delete", path, e)),
        };

        for object in nested.iter().chain(exact) {
            match self.store.delete(object).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(Error::backend_io("delete", path, e)),
            }
        }
        debug!(%path, objects = nested.len(), "deleted");
        Ok(())
    }
}
