//! Feature Record - a model input feature with optional importance

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{collect_tags, new_id, ChildRecord};
use crate::codec::Record;
use crate::identity::ChildKind;

/// Feature Record describes one model input.
///
/// Every logged feature gets its own id, so two features may share a name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRecord {
    id: String,
    name: String,
    description: Option<String>,
    importance: Option<f64>,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl Record for FeatureRecord {
    const KIND: &'static str = "feature";
}

impl FeatureRecord {
    /// Create a new feature record with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: None,
            importance: None,
            tags: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the importance score.
    #[must_use]
    pub const fn with_importance(mut self, importance: f64) -> Self {
        self.importance = Some(importance);
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

    /// Get the feature id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the importance score, if any.
    #[must_use]
    pub const fn importance(&self) -> Option<f64> {
        self.importance
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl ChildRecord for FeatureRecord {
    const CHILD_KIND: ChildKind = ChildKind::Feature;

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
