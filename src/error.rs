//! Error types for Rubicon-DB
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Every variant names the operation that failed and the target it was
//! working on (a storage path or an entity identity), so callers never have
//! to guess which record a failure belongs to.

use std::fmt::Display;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed transport error carried by [`Error::BackendIo`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Rubicon-DB error types
#[derive(Error, Debug)]
pub enum Error {
    /// The entity or storage path does not exist.
    #[error("{operation}: not found: {target}")]
    NotFound {
        /// Operation that failed
        operation: &'static str,
        /// Path or identity that was looked up
        target: String,
    },

    /// A create collided with a caller-chosen key (e.g. a project name).
    #[error("{operation}: already exists: {target}")]
    AlreadyExists {
        /// Operation that failed
        operation: &'static str,
        /// Path or identity that already exists
        target: String,
    },

    /// Stored bytes could not be decoded (or a value could not be encoded).
    #[error("{operation}: malformed record at {target}: {reason}")]
    Codec {
        /// Operation that failed
        operation: &'static str,
        /// Path or record kind involved
        target: String,
        /// Decoder diagnostic
        reason: String,
    },

    /// Transport failure (disk, network, provider error).
    #[error("{operation}: backend I/O failed at {target}: {source}")]
    BackendIo {
        /// Operation that failed
        operation: &'static str,
        /// Path involved
        target: String,
        /// Underlying transport error
        #[source]
        source: BoxError,
    },

    /// Invalid project name, id or child name.
    #[error("invalid identity {value:?}: {reason}")]
    Identity {
        /// Offending name or id
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

impl Error {
    /// Build a [`Error::NotFound`].
    pub fn not_found(operation: &'static str, target: impl Display) -> Self {
        Self::NotFound {
            operation,
            target: target.to_string(),
        }
    }

    /// Build an [`Error::AlreadyExists`].
    pub fn already_exists(operation: &'static str, target: impl Display) -> Self {
        Self::AlreadyExists {
            operation,
            target: target.to_string(),
        }
    }

    /// Build an [`Error::Codec`].
    pub fn codec(operation: &'static str, target: impl Display, reason: impl Display) -> Self {
        Self::Codec {
            operation,
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an [`Error::BackendIo`].
    pub fn backend_io(
        operation: &'static str,
        target: impl Display,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::BackendIo {
            operation,
            target: target.to_string(),
            source: source.into(),
        }
    }

    /// Translate a filesystem error, keeping `NotFound` distinguishable.
    pub fn from_io(operation: &'static str, target: impl Display, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(operation, target)
        } else {
            Self::backend_io(operation, target, err)
        }
    }

    /// Translate an object-store error, keeping `NotFound` distinguishable.
    pub fn from_object_store(
        operation: &'static str,
        target: impl Display,
        err: object_store::Error,
    ) -> Self {
        match err {
            object_store::Error::NotFound { .. } => Self::not_found(operation, target),
            other => Self::backend_io(operation, target, other),
        }
    }

    /// True for [`Error::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for failures a retry might clear (transport errors only).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::BackendIo { .. })
    }

    /// Re-point a codec error at the storage path it was read from.
    #[must_use]
    pub(crate) fn at(self, path: impl Display) -> Self {
        match self {
            Self::Codec {
                operation, reason, ..
            } => Self::Codec {
                operation,
                target: path.to_string(),
                reason,
            },
            other => other,
        }
    }
}
