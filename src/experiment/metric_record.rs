//! Metric Record - named evaluation results for experiments

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{collect_tags, ChildRecord};
use crate::codec::{Record, Value};
use crate::identity::ChildKind;

/// Which way a metric should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directionality {
    /// Larger values are better (accuracy, AUC).
    HigherIsBetter,
    /// Smaller values are better (loss, error rate).
    LowerIsBetter,
}

/// Metric Record stores one evaluation result of an experiment.
///
/// Like parameters, metrics are keyed by name; re-logging a name replaces
/// the previous value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    name: String,
    value: Value,
    directionality: Option<Directionality>,
    description: Option<String>,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl Record for MetricRecord {
    const KIND: &'static str = "metric";
}

impl MetricRecord {
    /// Create a new metric record.
    ///
    /// # Arguments
    ///
    /// * `name` - Metric name (e.g., "accuracy", "loss")
    /// * `value` - Metric value, usually numeric
    ///
    /// # Returns
    ///
    /// A new `MetricRecord` with the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::builder(name, value).build()
    }

    /// Create a builder for constructing a metric record with optional fields.
    #[must_use]
    pub fn builder(name: impl Into<String>, value: impl Into<Value>) -> MetricRecordBuilder {
        MetricRecordBuilder::new(name, value)
    }

    /// Get the metric value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Get the directionality hint, if any.
    #[must_use]
    pub const fn directionality(&self) -> Option<Directionality> {
        self.directionality
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl ChildRecord for MetricRecord {
    const CHILD_KIND: ChildKind = ChildKind::Metric;

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

/// Builder for `MetricRecord`.
#[derive(Debug)]
pub struct MetricRecordBuilder {
    name: String,
    value: Value,
    directionality: Option<Directionality>,
    description: Option<String>,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl MetricRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            directionality: None,
            description: None,
            tags: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the directionality hint.
    #[must_use]
    pub const fn directionality(mut self, directionality: Directionality) -> Self {
        self.directionality = Some(directionality);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(collect_tags(tags));
        self
    }

    /// Set a custom timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `MetricRecord`.
    #[must_use]
    pub fn build(self) -> MetricRecord {
        MetricRecord {
            name: self.name,
            value: self.value,
            directionality: self.directionality,
            description: self.description,
            tags: self.tags,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_record_new() {
        let metric = MetricRecord::new("accuracy", 0.5);
        assert_eq!(metric.name(), "accuracy");
        assert_eq!(metric.value().as_f64(), Some(0.5));
        assert!(metric.directionality().is_none());
    }

    #[test]
    fn test_metric_record_builder() {
        let metric = MetricRecord::builder("loss", 0.12)
            .directionality(Directionality::LowerIsBetter)
            .tags(["validation"])
            .build();
        assert_eq!(metric.directionality(), Some(Directionality::LowerIsBetter));
        assert!(metric.tags().contains("validation"));
    }
}
