//! Experiment Tracking Schema
//!
//! Plain, serde-serialisable records for every entity the repository
//! stores. Records never hold references to their parents; a child is
//! located through its owner's [`Identity`](crate::identity::Identity).
//!
//! ## Schema Overview
//!
//! ```text
//! ProjectRecord (1) ──< ExperimentRecord (N)
//!        │                     │
//!        │                     ├──< ParameterRecord (N) [keyed by name]
//!        │                     ├──< FeatureRecord (N)
//!        │                     ├──< MetricRecord (N)    [keyed by name]
//!        │                     ├──< ArtifactRecord (N)  [+ byte payload]
//!        │                     └──< DataframeRecord (N) [+ parquet payload]
//!        ├──< ArtifactRecord (N)
//!        └──< DataframeRecord (N)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rubicon_db::experiment::{ExperimentRecord, MetricRecord, ParameterRecord, ProjectRecord};
//!
//! let project = ProjectRecord::builder("Iris Model")
//!     .description("classifying irises")
//!     .build();
//!
//! let experiment = ExperimentRecord::builder()
//!     .model_name("RandomForestClassifier")
//!     .tag("baseline");
//!
//! let parameter = ParameterRecord::new("n_estimators", 100);
//! let metric = MetricRecord::new("accuracy", 0.94);
//! # let _ = (project, experiment, parameter, metric);
//! ```

mod artifact_record;
mod dataframe_record;
mod experiment_record;
mod feature_record;
mod metric_record;
mod parameter_record;
mod project_record;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

pub use artifact_record::ArtifactRecord;
pub use dataframe_record::DataframeRecord;
pub use experiment_record::{ExperimentRecord, ExperimentRecordBuilder};
pub use feature_record::FeatureRecord;
pub use metric_record::{Directionality, MetricRecord, MetricRecordBuilder};
pub use parameter_record::ParameterRecord;
pub use project_record::{ProjectRecord, ProjectRecordBuilder};

use crate::codec::Record;
use crate::identity::ChildKind;

/// A record owned by a project or experiment.
pub trait ChildRecord: Record + Clone + Send + Sync + 'static {
    /// Namespace the record is stored under.
    const CHILD_KIND: ChildKind;

    /// Storage key: the name for parameters and metrics, the generated id
    /// for every other kind.
    fn child_id(&self) -> &str;

    /// Human-readable name (not unique for id-keyed kinds).
    fn name(&self) -> &str;

    /// Tags attached at log time.
    fn tags(&self) -> &BTreeSet<String>;

    /// Creation timestamp.
    fn created_at(&self) -> DateTime<Utc>;

    /// Replace the generated id. Name-keyed kinds ignore this.
    fn assign_id(&mut self, _id: String) {}
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn collect_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter().map(Into::into).collect()
}
