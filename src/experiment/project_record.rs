//! Project Record - root entity, keyed by its caller-supplied name

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{Record, Value};
use crate::identity::Identity;
use crate::Result;

/// Project Record represents a named collection of experiments.
///
/// The name is the storage key, so it must be a valid path segment (see
/// [`validate_name`](crate::identity::validate_name)).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRecord {
    name: String,
    description: Option<String>,
    github_url: Option<String>,
    training_metadata: Option<Value>,
    created_at: DateTime<Utc>,
}

impl Record for ProjectRecord {
    const KIND: &'static str = "project";
}

impl ProjectRecord {
    /// Create a project record with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Create a builder for constructing a project record with optional fields.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ProjectRecordBuilder {
        ProjectRecordBuilder::new(name)
    }

    /// Get the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the source repository URL, if any.
    #[must_use]
    pub fn github_url(&self) -> Option<&str> {
        self.github_url.as_deref()
    }

    /// Get the opaque training metadata, if any.
    #[must_use]
    pub const fn training_metadata(&self) -> Option<&Value> {
        self.training_metadata.as_ref()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Storage identity of this project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Identity`](crate::Error::Identity) if the name is not
    /// a valid path segment.
    pub fn identity(&self) -> Result<Identity> {
        Identity::project(self.name.as_str())
    }
}

/// Builder for `ProjectRecord`.
#[derive(Debug)]
pub struct ProjectRecordBuilder {
    name: String,
    description: Option<String>,
    github_url: Option<String>,
    training_metadata: Option<Value>,
    created_at: DateTime<Utc>,
}

impl ProjectRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            github_url: None,
            training_metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the source repository URL.
    #[must_use]
    pub fn github_url(mut self, url: impl Into<String>) -> Self {
        self.github_url = Some(url.into());
        self
    }

    /// Attach opaque training metadata.
    #[must_use]
    pub fn training_metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.training_metadata = Some(metadata.into());
        self
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `ProjectRecord`.
    #[must_use]
    pub fn build(self) -> ProjectRecord {
        ProjectRecord {
            name: self.name,
            description: self.description,
            github_url: self.github_url,
            training_metadata: self.training_metadata,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_record_builder() {
        let record = ProjectRecord::builder("Iris Model")
            .description("irises")
            .training_metadata(Value::Tuple(vec!["sklearn".into(), "iris".into()]))
            .build();

        assert_eq!(record.name(), "Iris Model");
        assert_eq!(record.description(), Some("irises"));
        assert!(record.github_url().is_none());
        assert!(record.training_metadata().is_some());
        assert!(record.identity().unwrap().is_project());
    }

    #[test]
    fn test_invalid_name_has_no_identity() {
        assert!(ProjectRecord::new("a/b").identity().is_err());
    }
}
