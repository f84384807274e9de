//! Dataframe Record - metadata for a columnar payload

use std::collections::BTreeSet;

use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{collect_tags, new_id, ChildRecord};
use crate::codec::Record;
use crate::identity::ChildKind;

/// Dataframe Record describes a stored table (predictions, training
/// summaries). The table itself is a Parquet `data` file next to the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataframeRecord {
    id: String,
    name: String,
    description: Option<String>,
    num_rows: u64,
    num_columns: u64,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl Record for DataframeRecord {
    const KIND: &'static str = "dataframe";
}

impl DataframeRecord {
    /// Create a new dataframe record with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: None,
            num_rows: 0,
            num_columns: 0,
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

    /// Get the dataframe id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Row count of the stored table.
    #[must_use]
    pub const fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// Column count of the stored table.
    #[must_use]
    pub const fn num_columns(&self) -> u64 {
        self.num_columns
    }

    pub(crate) fn set_shape(&mut self, batch: &RecordBatch) {
        self.num_rows = batch.num_rows() as u64;
        self.num_columns = batch.num_columns() as u64;
    }
}

impl ChildRecord for DataframeRecord {
    const CHILD_KIND: ChildKind = ChildKind::Dataframe;

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
