//! Artifact Record - metadata for a raw byte payload

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{collect_tags, new_id, ChildRecord};
use crate::codec::Record;
use crate::identity::ChildKind;

/// Artifact Record describes a stored artifact (a model file, a plot, a
/// pickled estimator).
///
/// The payload lives next to the record, in the artifact's `data` file;
/// `size_bytes` is filled in when the artifact is logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    id: String,
    name: String,
    description: Option<String>,
    content_type: Option<String>,
    size_bytes: u64,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl Record for ArtifactRecord {
    const KIND: &'static str = "artifact";
}

impl ArtifactRecord {
    /// Create a new artifact record.
    ///
    /// # Arguments
    ///
    /// * `name` - Artifact name (e.g., "model.pkl", "confusion_matrix.png")
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: None,
            content_type: None,
            size_bytes: 0,
            tags: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the content-type hint (e.g., "application/octet-stream").
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(collect_tags(tags));
        self
    }

    /// Get the artifact id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the content-type hint, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the payload size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub(crate) fn set_size(&mut self, size_bytes: usize) {
        self.size_bytes = size_bytes as u64;
    }
}

impl ChildRecord for ArtifactRecord {
    const CHILD_KIND: ChildKind = ChildKind::Artifact;

    fn child_id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}
