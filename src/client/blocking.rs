//! Blocking client handles.
//!
//! Each handle drives the asynchronous client on a small tokio runtime it
//! owns, so every call blocks the calling thread until its I/O is done.
//! Handles are `Send + Sync` and may be cloned into worker threads.
//!
//! Do not call these from inside a tokio runtime (an `async fn`, or a
//! `#[tokio::main]` body): blocking a runtime thread on another runtime
//! panics. Use [`asynchronous`](super::asynchronous) there instead.
//!
//! # Example
//!
//! ```rust
//! use rubicon_db::client::Rubicon;
//! use rubicon_db::experiment::{ExperimentRecord, ParameterRecord, ProjectRecord};
//! use rubicon_db::repository::{ChildFilter, RepositoryConfig};
//!
//! # fn main() -> rubicon_db::Result<()> {
//! let dir = tempfile::tempdir().map_err(|e| rubicon_db::Error::backend_io("doc", "tmp", e))?;
//! let rubicon = Rubicon::from_config(&RepositoryConfig::filesystem(dir.path().display().to_string()))?;
//!
//! let project = rubicon.create_project(ProjectRecord::builder("Iris Model").description("irises").build())?;
//! let experiment = project.log_experiment(ExperimentRecord::builder().model_name("rf"))?;
//! experiment.log_parameter(ParameterRecord::new("n_estimators", 100))?;
//!
//! assert_eq!(experiment.parameters(&ChildFilter::new())?.len(), 1);
//! assert_eq!(rubicon.get_project("Iris Model")?.record().description(), Some("irises"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use tokio::runtime::{Builder, Runtime};

use super::asynchronous::{AsyncExperiment, AsyncProject, AsyncRubicon};
use crate::backend::{AnyBackend, Backend};
use crate::experiment::{
    ArtifactRecord, DataframeRecord, ExperimentRecord, ExperimentRecordBuilder, FeatureRecord,
    MetricRecord, ParameterRecord, ProjectRecord,
};
use crate::identity::Identity;
use crate::repository::{ChildFilter, MatchMode, Repository, RepositoryConfig};
use crate::{Error, Result};

fn runtime() -> Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("rubicon-io")
        .enable_all()
        .build()
        .map_err(|e| Error::backend_io("start_runtime", "tokio", e))
}

/// Entry point of the blocking client.
#[derive(Debug)]
pub struct Rubicon<B: Backend = AnyBackend> {
    inner: AsyncRubicon<B>,
    runtime: Arc<Runtime>,
}

impl<B: Backend> Clone for Rubicon<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl Rubicon<AnyBackend> {
    /// Open the repository `config` describes.
    ///
    /// # Errors
    ///
    /// See [`RepositoryConfig::open`]; also fails if the runtime cannot
    /// start.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        Self::new(config.open()?)
    }
}

impl<B: Backend> Rubicon<B> {
    /// Wrap a repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] if the I/O runtime cannot start.
    pub fn new(repo: Repository<B>) -> Result<Self> {
        Ok(Self {
            inner: AsyncRubicon::new(repo),
            runtime: Arc::new(runtime()?),
        })
    }

    /// The asynchronous client this handle drives.
    pub const fn as_async(&self) -> &AsyncRubicon<B> {
        &self.inner
    }

    fn project(&self, inner: AsyncProject<B>) -> Project<B> {
        Project {
            inner,
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the name is taken.
    pub fn create_project(&self, project: ProjectRecord) -> Result<Project<B>> {
        let inner = self.runtime.block_on(self.inner.create_project(project))?;
        Ok(self.project(inner))
    }

    /// Open an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub fn get_project(&self, name: &str) -> Result<Project<B>> {
        let inner = self.runtime.block_on(self.inner.get_project(name))?;
        Ok(self.project(inner))
    }

    /// Open a project, creating it if it is missing.
    ///
    /// # Errors
    ///
    /// Propagates storage and identity errors.
    pub fn get_or_create_project(&self, name: &str) -> Result<Project<B>> {
        let inner = self.runtime.block_on(self.inner.get_or_create_project(name))?;
        Ok(self.project(inner))
    }

    /// Every project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub fn projects(&self) -> Result<Vec<Project<B>>> {
        let projects = self.runtime.block_on(self.inner.projects())?;
        Ok(projects.into_iter().map(|inner| self.project(inner)).collect())
    }

    /// Delete a project and everything in it. No-op if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub fn delete_project(&self, name: &str) -> Result<()> {
        self.runtime.block_on(self.inner.delete_project(name))
    }
}

/// Blocking handle on a stored project.
#[derive(Debug)]
pub struct Project<B: Backend = AnyBackend> {
    inner: AsyncProject<B>,
    runtime: Arc<Runtime>,
}

impl<B: Backend> Clone for Project<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl<B: Backend> Project<B> {
    fn experiment(&self, inner: AsyncExperiment<B>) -> Experiment<B> {
        Experiment {
            inner,
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// Stored record.
    pub const fn record(&self) -> &ProjectRecord {
        self.inner.record()
    }

    /// Project name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Storage identity.
    pub const fn identity(&self) -> &Identity {
        self.inner.identity()
    }

    /// Create an experiment in this project.
    ///
    /// # Errors
    ///
    /// See [`Repository::create_experiment`].
    pub fn log_experiment(&self, fields: ExperimentRecordBuilder) -> Result<Experiment<B>> {
        let inner = self.runtime.block_on(self.inner.log_experiment(fields))?;
        Ok(self.experiment(inner))
    }

    /// Open one experiment by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub fn get_experiment(&self, id: &str) -> Result<Experiment<B>> {
        let inner = self.runtime.block_on(self.inner.experiment(id))?;
        Ok(self.experiment(inner))
    }

    /// Experiments matching `tags` under `match_mode`, oldest first.
    ///
    /// # Errors
    ///
    /// See [`Repository::query_experiments`].
    pub fn experiments<S>(&self, tags: &[S], match_mode: MatchMode) -> Result<Vec<Experiment<B>>>
    where
        S: AsRef<str> + Sync,
    {
        let experiments = self.runtime.block_on(self.inner.experiments(tags, match_mode))?;
        Ok(experiments
            .into_iter()
            .map(|inner| self.experiment(inner))
            .collect())
    }

    /// Store a project-level artifact.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_artifact`].
    pub fn log_artifact(&self, artifact: ArtifactRecord, data: Vec<u8>) -> Result<ArtifactRecord> {
        self.runtime.block_on(self.inner.log_artifact(artifact, data))
    }

    /// Project-level artifacts passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub fn artifacts(&self, filter: &ChildFilter) -> Result<Vec<ArtifactRecord>> {
        self.runtime.block_on(self.inner.artifacts(filter))
    }

    /// Payload of a project-level artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub fn artifact_data(&self, id: &str) -> Result<Vec<u8>> {
        self.runtime.block_on(self.inner.artifact_data(id))
    }

    /// Store a project-level dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_dataframe`].
    pub fn log_dataframe(&self, dataframe: DataframeRecord, batch: &RecordBatch) -> Result<DataframeRecord> {
        self.runtime.block_on(self.inner.log_dataframe(dataframe, batch))
    }

    /// Project-level dataframes passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub fn dataframes(&self, filter: &ChildFilter) -> Result<Vec<DataframeRecord>> {
        self.runtime.block_on(self.inner.dataframes(filter))
    }

    /// Table of a project-level dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_dataframe_data`].
    pub fn dataframe_data(&self, id: &str) -> Result<RecordBatch> {
        self.runtime.block_on(self.inner.dataframe_data(id))
    }

    /// Delete this project and everything in it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub fn delete(self) -> Result<()> {
        self.runtime.block_on(self.inner.delete())
    }
}

/// Blocking handle on a stored experiment.
#[derive(Debug)]
pub struct Experiment<B: Backend = AnyBackend> {
    inner: AsyncExperiment<B>,
    runtime: Arc<Runtime>,
}

impl<B: Backend> Clone for Experiment<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl<B: Backend> Experiment<B> {
    /// Stored record, as of the last write through this handle.
    pub const fn record(&self) -> &ExperimentRecord {
        self.inner.record()
    }

    /// Experiment id.
    pub fn id(&self) -> &str {
        self.inner.id()
    }

    /// Storage identity.
    pub const fn identity(&self) -> &Identity {
        self.inner.identity()
    }

    /// Log a parameter (last write wins by name).
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub fn log_parameter(&self, parameter: ParameterRecord) -> Result<ParameterRecord> {
        self.runtime.block_on(self.inner.log_parameter(parameter))
    }

    /// Parameters passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub fn parameters(&self, filter: &ChildFilter) -> Result<Vec<ParameterRecord>> {
        self.runtime.block_on(self.inner.parameters(filter))
    }

    /// One parameter by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it was never logged.
    pub fn parameter(&self, name: &str) -> Result<ParameterRecord> {
        self.runtime.block_on(self.inner.parameter(name))
    }

    /// Log a feature.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub fn log_feature(&self, feature: FeatureRecord) -> Result<FeatureRecord> {
        self.runtime.block_on(self.inner.log_feature(feature))
    }

    /// Features passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub fn features(&self, filter: &ChildFilter) -> Result<Vec<FeatureRecord>> {
        self.runtime.block_on(self.inner.features(filter))
    }

    /// Log a metric (last write wins by name).
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub fn log_metric(&self, metric: MetricRecord) -> Result<MetricRecord> {
        self.runtime.block_on(self.inner.log_metric(metric))
    }

    /// Metrics passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub fn metrics(&self, filter: &ChildFilter) -> Result<Vec<MetricRecord>> {
        self.runtime.block_on(self.inner.metrics(filter))
    }

    /// One metric by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it was never logged.
    pub fn metric(&self, name: &str) -> Result<MetricRecord> {
        self.runtime.block_on(self.inner.metric(name))
    }

    /// Store an artifact.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_artifact`].
    pub fn log_artifact(&self, artifact: ArtifactRecord, data: Vec<u8>) -> Result<ArtifactRecord> {
        self.runtime.block_on(self.inner.log_artifact(artifact, data))
    }

    /// Artifacts passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub fn artifacts(&self, filter: &ChildFilter) -> Result<Vec<ArtifactRecord>> {
        self.runtime.block_on(self.inner.artifacts(filter))
    }

    /// Payload of an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub fn artifact_data(&self, id: &str) -> Result<Vec<u8>> {
        self.runtime.block_on(self.inner.artifact_data(id))
    }

    /// Store a dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_dataframe`].
    pub fn log_dataframe(&self, dataframe: DataframeRecord, batch: &RecordBatch) -> Result<DataframeRecord> {
        self.runtime.block_on(self.inner.log_dataframe(dataframe, batch))
    }

    /// Dataframes passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub fn dataframes(&self, filter: &ChildFilter) -> Result<Vec<DataframeRecord>> {
        self.runtime.block_on(self.inner.dataframes(filter))
    }

    /// Table of a dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_dataframe_data`].
    pub fn dataframe_data(&self, id: &str) -> Result<RecordBatch> {
        self.runtime.block_on(self.inner.dataframe_data(id))
    }

    /// Add tags and refresh this handle's record.
    ///
    /// # Errors
    ///
    /// See [`Repository::add_tags`].
    pub fn add_tags<S>(&mut self, tags: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        self.runtime.block_on(self.inner.add_tags(tags))
    }

    /// Remove tags and refresh this handle's record.
    ///
    /// # Errors
    ///
    /// See [`Repository::remove_tags`].
    pub fn remove_tags<S>(&mut self, tags: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        self.runtime.block_on(self.inner.remove_tags(tags))
    }

    /// Delete this experiment and all of its children.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub fn delete(self) -> Result<()> {
        self.runtime.block_on(self.inner.delete())
    }
}
