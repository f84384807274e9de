//! Repository configuration
//!
//! A [`RepositoryConfig`] is everything needed to point a fresh
//! [`Repository`] at an existing root. It is serde-serialisable so it can
//! travel inside a [`Catalog`](crate::catalog::Catalog) entry.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Repository, DEFAULT_ID_ATTEMPTS};
use crate::backend::{AnyBackend, FilesystemBackend, MemoryBackend, ObjectStoreBackend, RetryPolicy};
use crate::Result;

/// Which backend a repository persists to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Persistence {
    /// Local directory
    Filesystem,
    /// Process-wide in-memory map
    Memory,
    /// Object store; `root_dir` is the store URL (`s3://bucket/prefix`).
    /// `memory://` URLs name the process-wide in-memory store.
    ObjectStore,
}

/// Configuration for opening a [`Repository`].
///
/// # Example
///
/// ```rust
/// use rubicon_db::repository::{Persistence, RepositoryConfig};
///
/// let config = RepositoryConfig::builder(Persistence::Memory, "scratch")
///     .id_attempts(3)
///     .build();
/// assert_eq!(config.root_dir(), "scratch");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    persistence: Persistence,
    root_dir: String,
    #[serde(default)]
    retry: RetryPolicy,
    #[serde(default = "default_id_attempts")]
    id_attempts: usize,
}

const fn default_id_attempts() -> usize {
    DEFAULT_ID_ATTEMPTS
}

impl RepositoryConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder(persistence: Persistence, root_dir: impl Into<String>) -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::new(persistence, root_dir)
    }

    /// Filesystem repository rooted at `root_dir`.
    #[must_use]
    pub fn filesystem(root_dir: impl Into<String>) -> Self {
        Self::builder(Persistence::Filesystem, root_dir).build()
    }

    /// Memory repository under `root_dir` in the process-wide map.
    #[must_use]
    pub fn memory(root_dir: impl Into<String>) -> Self {
        Self::builder(Persistence::Memory, root_dir).build()
    }

    /// Object-store repository at `url`.
    #[must_use]
    pub fn object_store(url: impl Into<String>) -> Self {
        Self::builder(Persistence::ObjectStore, url).build()
    }

    /// Backend kind.
    #[must_use]
    pub const fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Root directory, memory root, or object-store URL.
    #[must_use]
    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    /// Retry policy for remote reads.
    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Experiment-id collision bound.
    #[must_use]
    pub const fn id_attempts(&self) -> usize {
        self.id_attempts
    }

    /// Build the backend this configuration names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`](crate::Error::BackendIo) if an
    /// object-store URL cannot be opened.
    pub fn backend(&self) -> Result<AnyBackend> {
        Ok(match self.persistence {
            Persistence::Filesystem => FilesystemBackend::new(&self.root_dir).into(),
            Persistence::Memory => MemoryBackend::shared(self.root_dir.clone()).into(),
            Persistence::ObjectStore => ObjectStoreBackend::from_url(&self.root_dir, self.retry)?.into(),
        })
    }

    /// Open a repository over the configured backend.
    ///
    /// # Errors
    ///
    /// See [`RepositoryConfig::backend`].
    pub fn open(&self) -> Result<Repository<AnyBackend>> {
        let backend = self.backend()?;
        info!(persistence = ?self.persistence, root_dir = %self.root_dir, "opening repository");
        Ok(Repository::new(backend)
            .with_id_attempts(self.id_attempts)
            .with_config(self.clone()))
    }
}

/// Builder for [`RepositoryConfig`].
#[derive(Debug, Clone)]
pub struct RepositoryConfigBuilder {
    persistence: Persistence,
    root_dir: String,
    retry: RetryPolicy,
    id_attempts: usize,
}

impl RepositoryConfigBuilder {
    /// Create a builder with default retry and id-collision settings.
    #[must_use]
    pub fn new(persistence: Persistence, root_dir: impl Into<String>) -> Self {
        Self {
            persistence,
            root_dir: root_dir.into(),
            retry: RetryPolicy::default(),
            id_attempts: DEFAULT_ID_ATTEMPTS,
        }
    }

    /// Retry policy for remote reads.
    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// How many fresh ids to try before experiment creation fails.
    #[must_use]
    pub const fn id_attempts(mut self, id_attempts: usize) -> Self {
        self.id_attempts = id_attempts;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> RepositoryConfig {
        RepositoryConfig {
            persistence: self.persistence,
            root_dir: self.root_dir,
            retry: self.retry,
            id_attempts: self.id_attempts.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;

    #[test]
    fn test_config_json_shape() {
        let config = RepositoryConfig::filesystem("/data/rubicon");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["persistence"]["type"], "filesystem");
        assert_eq!(json["root_dir"], "/data/rubicon");

        let back: RepositoryConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let config: RepositoryConfig = serde_json::from_str(
            r#"{"persistence":{"type":"memory"},"root_dir":"scratch"}"#,
        )
        .unwrap();
        assert_eq!(config.id_attempts(), DEFAULT_ID_ATTEMPTS);
        assert_eq!(config.retry(), &RetryPolicy::default());
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!(RepositoryConfig::memory("m").backend().unwrap().kind(), "memory");
        assert_eq!(
            RepositoryConfig::filesystem("/tmp/x").backend().unwrap().kind(),
            "filesystem"
        );
        assert_eq!(
            RepositoryConfig::object_store("memory:///x").backend().unwrap().kind(),
            "object_store"
        );
    }

    #[test]
    fn test_id_attempts_floor() {
        let config = RepositoryConfig::builder(Persistence::Memory, "m")
            .id_attempts(0)
            .build();
        assert_eq!(config.id_attempts(), 1);
    }
}
