//! Parameter Record - a named hyperparameter value

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{collect_tags, ChildRecord};
use crate::codec::{Record, Value};
use crate::identity::ChildKind;

/// Parameter Record stores one hyperparameter of an experiment.
///
/// The name is the storage key: logging the same name twice leaves a single
/// record holding the second value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterRecord {
    name: String,
    value: Value,
    description: Option<String>,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl Record for ParameterRecord {
    const KIND: &'static str = "parameter";
}

impl ParameterRecord {
    /// Create a new parameter record with the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
            tags: BTreeSet::new(),
            created_at: Utc::now(),
        }
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

    /// Get the parameter value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl ChildRecord for ParameterRecord {
    const CHILD_KIND: ChildKind = ChildKind::Parameter;

    fn child_id(&self) -> &str {
        &self.name
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_keyed_by_name() {
        let mut parameter = ParameterRecord::new("n_estimators", 100).with_tags(["tree"]);
        assert_eq!(parameter.child_id(), "n_estimators");
        parameter.assign_id("ignored".to_string());
        assert_eq!(parameter.child_id(), "n_estimators");
        assert_eq!(parameter.value().as_i64(), Some(100));
    }
}
