//! Experiment Record - a single tracked model run inside a project

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collect_tags;
use crate::codec::{Record, Value};
use crate::identity::Identity;
use crate::Result;

/// Experiment Record represents one tracked experiment.
///
/// The id is generated by the repository at creation time and never
/// changes. Tags are the only field that is ever rewritten in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentRecord {
    id: String,
    project_name: String,
    name: Option<String>,
    description: Option<String>,
    model_name: Option<String>,
    branch_name: Option<String>,
    commit_hash: Option<String>,
    training_metadata: Option<Value>,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl Record for ExperimentRecord {
    const KIND: &'static str = "experiment";
}

impl ExperimentRecord {
    /// Create a builder holding the caller-supplied fields of a new
    /// experiment. The repository assigns the id.
    #[must_use]
    pub fn builder() -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new()
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the owning project's name.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Get the experiment name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the model name, if any.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// Get the VCS branch name, if any.
    #[must_use]
    pub fn branch_name(&self) -> Option<&str> {
        self.branch_name.as_deref()
    }

    /// Get the VCS commit hash, if any.
    #[must_use]
    pub fn commit_hash(&self) -> Option<&str> {
        self.commit_hash.as_deref()
    }

    /// Get the opaque training metadata, if any.
    #[must_use]
    pub const fn training_metadata(&self) -> Option<&Value> {
        self.training_metadata.as_ref()
    }

    /// Get the tag set.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Storage identity of this experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Identity`](crate::Error::Identity) if the stored
    /// project name or id is not a valid path segment.
    pub fn identity(&self) -> Result<Identity> {
        Identity::experiment(self.project_name.as_str(), self.id.as_str())
    }

    /// Merge `tags` into the tag set. Adding an existing tag is a no-op.
    pub(crate) fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
    }

    /// Remove `tags` from the tag set. Absent tags are ignored.
    pub(crate) fn remove_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.tags.remove(&tag.into());
        }
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug, Clone, Default)]
pub struct ExperimentRecordBuilder {
    name: Option<String>,
    description: Option<String>,
    model_name: Option<String>,
    branch_name: Option<String>,
    commit_hash: Option<String>,
    training_metadata: Option<Value>,
    tags: BTreeSet<String>,
    created_at: Option<DateTime<Utc>>,
}

impl ExperimentRecordBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the experiment name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the model name.
    #[must_use]
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Set the VCS branch name.
    #[must_use]
    pub fn branch_name(mut self, branch_name: impl Into<String>) -> Self {
        self.branch_name = Some(branch_name.into());
        self
    }

    /// Set the VCS commit hash.
    #[must_use]
    pub fn commit_hash(mut self, commit_hash: impl Into<String>) -> Self {
        self.commit_hash = Some(commit_hash.into());
        self
    }

    /// Attach opaque training metadata.
    #[must_use]
    pub fn training_metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.training_metadata = Some(metadata.into());
        self
    }

    /// Add one tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add several tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(collect_tags(tags));
        self
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Build the `ExperimentRecord` under its assigned id.
    pub(crate) fn build(self, project_name: impl Into<String>, id: impl Into<String>) -> ExperimentRecord {
        ExperimentRecord {
            id: id.into(),
            project_name: project_name.into(),
            name: self.name,
            description: self.description,
            model_name: self.model_name,
            branch_name: self.branch_name,
            commit_hash: self.commit_hash,
            training_metadata: self.training_metadata,
            tags: self.tags,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_record_builder() {
        let record = ExperimentRecord::builder()
            .name("rf")
            .model_name("RandomForestClassifier")
            .commit_hash("abc123")
            .tags(["baseline", "success"])
            .build("Iris Model", "e1");

        assert_eq!(record.id(), "e1");
        assert_eq!(record.project_name(), "Iris Model");
        assert_eq!(record.model_name(), Some("RandomForestClassifier"));
        assert_eq!(record.commit_hash(), Some("abc123"));
        assert_eq!(record.tags().len(), 2);
        assert_eq!(
            record.identity().unwrap().record_path().to_string(),
            "Iris Model/experiments/e1/metadata"
        );
    }

    #[test]
    fn test_tags_idempotent() {
        let mut record = ExperimentRecord::builder().tag("a").build("p", "e");
        record.add_tags(["a", "b"]);
        record.add_tags(["a", "b"]);
        assert_eq!(record.tags().iter().collect::<Vec<_>>(), ["a", "b"]);

        record.remove_tags(["a", "missing"]);
        assert_eq!(record.tags().iter().collect::<Vec<_>>(), ["b"]);
    }
}
