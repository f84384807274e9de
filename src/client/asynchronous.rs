//! Asynchronous client handles.
//!
//! # Example
//!
//! ```rust
//! use rubicon_db::client::{try_gather, AsyncRubicon};
//! use rubicon_db::experiment::{ExperimentRecord, MetricRecord};
//! use rubicon_db::repository::RepositoryConfig;
//!
//! # async fn example() -> rubicon_db::Result<()> {
//! let rubicon = AsyncRubicon::from_config(&RepositoryConfig::object_store("memory:///runs"))?;
//! let project = rubicon.get_or_create_project("Iris Model").await?;
//! let experiment = project.log_experiment(ExperimentRecord::builder()).await?;
//!
//! let metrics = try_gather([
//!     experiment.log_metric(MetricRecord::new("accuracy", 0.94)),
//!     experiment.log_metric(MetricRecord::new("recall", 0.91)),
//! ])
//! .await?;
//! assert_eq!(metrics.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use futures::future::join_all;

use crate::backend::{AnyBackend, Backend};
use crate::experiment::{
    ArtifactRecord, DataframeRecord, ExperimentRecord, ExperimentRecordBuilder, FeatureRecord,
    MetricRecord, ParameterRecord, ProjectRecord,
};
use crate::identity::Identity;
use crate::repository::{ChildFilter, MatchMode, Repository, RepositoryConfig};
use crate::{Error, Result};

/// Await every future and return all results, or the first failure in
/// input order.
///
/// A failing future does not cancel the others; every write in the batch
/// runs to completion before this returns.
///
/// # Errors
///
/// Returns the first error, in input order.
pub async fn try_gather<I, F, T>(futures: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    join_all(futures).await.into_iter().collect()
}

/// Await every future and return each outcome independently.
pub async fn gather_settled<I, F, T>(futures: I) -> Vec<Result<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    join_all(futures).await
}

/// Entry point of the asynchronous client.
pub struct AsyncRubicon<B: Backend = AnyBackend> {
    repo: Arc<Repository<B>>,
}

impl<B: Backend> Clone for AsyncRubicon<B> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<B: Backend + fmt::Debug> fmt::Debug for AsyncRubicon<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRubicon").field("repo", &self.repo).finish()
    }
}

impl AsyncRubicon<AnyBackend> {
    /// Open the repository `config` describes.
    ///
    /// # Errors
    ///
    /// See [`RepositoryConfig::open`].
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        Ok(Self::new(config.open()?))
    }
}

impl<B: Backend> AsyncRubicon<B> {
    /// Wrap a repository.
    pub fn new(repo: Repository<B>) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// Shared repository.
    pub const fn repository(&self) -> &Arc<Repository<B>> {
        &self.repo
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the name is taken.
    pub async fn create_project(&self, project: ProjectRecord) -> Result<AsyncProject<B>> {
        let record = self.repo.create_project(project).await?;
        AsyncProject::attach(Arc::clone(&self.repo), record)
    }

    /// Open an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_project(&self, name: &str) -> Result<AsyncProject<B>> {
        let record = self.repo.get_project(name).await?;
        AsyncProject::attach(Arc::clone(&self.repo), record)
    }

    /// Open a project, creating it with no description if it is missing.
    ///
    /// # Errors
    ///
    /// Propagates storage and identity errors.
    pub async fn get_or_create_project(&self, name: &str) -> Result<AsyncProject<B>> {
        match self.get_project(name).await {
            Err(e) if e.is_not_found() => match self.create_project(ProjectRecord::new(name)).await {
                // Another writer created it first
                Err(Error::AlreadyExists { .. }) => self.get_project(name).await,
                other => other,
            },
            other => other,
        }
    }

    /// Every project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub async fn projects(&self) -> Result<Vec<AsyncProject<B>>> {
        self.repo
            .list_projects()
            .await?
            .into_iter()
            .map(|record| AsyncProject::attach(Arc::clone(&self.repo), record))
            .collect()
    }

    /// Delete a project and everything in it. No-op if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub async fn delete_project(&self, name: &str) -> Result<()> {
        self.repo.delete(&Identity::project(name)?).await
    }
}

/// Handle on a stored project.
pub struct AsyncProject<B: Backend = AnyBackend> {
    repo: Arc<Repository<B>>,
    record: ProjectRecord,
    identity: Identity,
}

impl<B: Backend> Clone for AsyncProject<B> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            record: self.record.clone(),
            identity: self.identity.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for AsyncProject<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncProject")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> AsyncProject<B> {
    fn attach(repo: Arc<Repository<B>>, record: ProjectRecord) -> Result<Self> {
        let identity = record.identity()?;
        Ok(Self {
            repo,
            record,
            identity,
        })
    }

    /// Stored record.
    pub const fn record(&self) -> &ProjectRecord {
        &self.record
    }

    /// Project name.
    pub fn name(&self) -> &str {
        self.record.name()
    }

    /// Storage identity.
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Create an experiment in this project.
    ///
    /// # Errors
    ///
    /// See [`Repository::create_experiment`].
    pub async fn log_experiment(&self, fields: ExperimentRecordBuilder) -> Result<AsyncExperiment<B>> {
        let record = self.repo.create_experiment(self.name(), fields).await?;
        AsyncExperiment::attach(Arc::clone(&self.repo), record)
    }

    /// Open one experiment by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn experiment(&self, id: &str) -> Result<AsyncExperiment<B>> {
        let record = self.repo.get_experiment(self.name(), id).await?;
        AsyncExperiment::attach(Arc::clone(&self.repo), record)
    }

    /// Experiments matching `tags` under `match_mode`, oldest first. An
    /// empty tag list returns every experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::query_experiments`].
    pub async fn experiments<S>(&self, tags: &[S], match_mode: MatchMode) -> Result<Vec<AsyncExperiment<B>>>
    where
        S: AsRef<str> + Sync,
    {
        self.repo
            .query_experiments(self.name(), tags, match_mode)
            .await?
            .into_iter()
            .map(|record| AsyncExperiment::attach(Arc::clone(&self.repo), record))
            .collect()
    }

    /// Store a project-level artifact.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_artifact`].
    pub async fn log_artifact(&self, artifact: ArtifactRecord, data: Vec<u8>) -> Result<ArtifactRecord> {
        self.repo.log_artifact(&self.identity, artifact, data).await
    }

    /// Project-level artifacts passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn artifacts(&self, filter: &ChildFilter) -> Result<Vec<ArtifactRecord>> {
        self.repo.list_artifacts(&self.identity, filter).await
    }

    /// Payload of a project-level artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn artifact_data(&self, id: &str) -> Result<Vec<u8>> {
        self.repo.get_artifact_data(&self.identity, id).await
    }

    /// Store a project-level dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_dataframe`].
    pub async fn log_dataframe(&self, dataframe: DataframeRecord, batch: &RecordBatch) -> Result<DataframeRecord> {
        self.repo.log_dataframe(&self.identity, dataframe, batch).await
    }

    /// Project-level dataframes passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn dataframes(&self, filter: &ChildFilter) -> Result<Vec<DataframeRecord>> {
        self.repo.list_dataframes(&self.identity, filter).await
    }

    /// Table of a project-level dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_dataframe_data`].
    pub async fn dataframe_data(&self, id: &str) -> Result<RecordBatch> {
        self.repo.get_dataframe_data(&self.identity, id).await
    }

    /// Delete this project and everything in it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub async fn delete(self) -> Result<()> {
        self.repo.delete(&self.identity).await
    }
}

/// Handle on a stored experiment.
pub struct AsyncExperiment<B: Backend = AnyBackend> {
    repo: Arc<Repository<B>>,
    record: ExperimentRecord,
    identity: Identity,
}

impl<B: Backend> Clone for AsyncExperiment<B> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            record: self.record.clone(),
            identity: self.identity.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for AsyncExperiment<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncExperiment")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> AsyncExperiment<B> {
    fn attach(repo: Arc<Repository<B>>, record: ExperimentRecord) -> Result<Self> {
        let identity = record.identity()?;
        Ok(Self {
            repo,
            record,
            identity,
        })
    }

    /// Stored record, as of the last write through this handle.
    pub const fn record(&self) -> &ExperimentRecord {
        &self.record
    }

    /// Experiment id.
    pub fn id(&self) -> &str {
        self.record.id()
    }

    /// Storage identity.
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Log a parameter (last write wins by name).
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub async fn log_parameter(&self, parameter: ParameterRecord) -> Result<ParameterRecord> {
        self.repo.log_parameter(&self.identity, parameter).await
    }

    /// Parameters passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn parameters(&self, filter: &ChildFilter) -> Result<Vec<ParameterRecord>> {
        self.repo.list_parameters(&self.identity, filter).await
    }

    /// One parameter by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it was never logged.
    pub async fn parameter(&self, name: &str) -> Result<ParameterRecord> {
        self.repo.get_parameter(&self.identity, name).await
    }

    /// Log a feature.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub async fn log_feature(&self, feature: FeatureRecord) -> Result<FeatureRecord> {
        self.repo.log_feature(&self.identity, feature).await
    }

    /// Features passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn features(&self, filter: &ChildFilter) -> Result<Vec<FeatureRecord>> {
        self.repo.list_features(&self.identity, filter).await
    }

    /// Log a metric (last write wins by name).
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub async fn log_metric(&self, metric: MetricRecord) -> Result<MetricRecord> {
        self.repo.log_metric(&self.identity, metric).await
    }

    /// Metrics passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn metrics(&self, filter: &ChildFilter) -> Result<Vec<MetricRecord>> {
        self.repo.list_metrics(&self.identity, filter).await
    }

    /// One metric by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it was never logged.
    pub async fn metric(&self, name: &str) -> Result<MetricRecord> {
        self.repo.get_metric(&self.identity, name).await
    }

    /// Store an artifact.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_artifact`].
    pub async fn log_artifact(&self, artifact: ArtifactRecord, data: Vec<u8>) -> Result<ArtifactRecord> {
        self.repo.log_artifact(&self.identity, artifact, data).await
    }

    /// Artifacts passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn artifacts(&self, filter: &ChildFilter) -> Result<Vec<ArtifactRecord>> {
        self.repo.list_artifacts(&self.identity, filter).await
    }

    /// Payload of an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn artifact_data(&self, id: &str) -> Result<Vec<u8>> {
        self.repo.get_artifact_data(&self.identity, id).await
    }

    /// Store a dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_dataframe`].
    pub async fn log_dataframe(&self, dataframe: DataframeRecord, batch: &RecordBatch) -> Result<DataframeRecord> {
        self.repo.log_dataframe(&self.identity, dataframe, batch).await
    }

    /// Dataframes passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn dataframes(&self, filter: &ChildFilter) -> Result<Vec<DataframeRecord>> {
        self.repo.list_dataframes(&self.identity, filter).await
    }

    /// Table of a dataframe.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_dataframe_data`].
    pub async fn dataframe_data(&self, id: &str) -> Result<RecordBatch> {
        self.repo.get_dataframe_data(&self.identity, id).await
    }

    /// Add tags and refresh this handle's record.
    ///
    /// # Errors
    ///
    /// See [`Repository::add_tags`].
    pub async fn add_tags<S>(&mut self, tags: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        self.record = self.repo.add_tags(&self.identity, tags).await?;
        Ok(())
    }

    /// Remove tags and refresh this handle's record.
    ///
    /// # Errors
    ///
    /// See [`Repository::remove_tags`].
    pub async fn remove_tags<S>(&mut self, tags: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        self.record = self.repo.remove_tags(&self.identity, tags).await?;
        Ok(())
    }

    /// Delete this experiment and all of its children.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub async fn delete(self) -> Result<()> {
        self.repo.delete(&self.identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn client() -> AsyncRubicon<MemoryBackend> {
        AsyncRubicon::new(Repository::new(MemoryBackend::isolated("client")))
    }

    #[tokio::test]
    async fn test_gather_settled_keeps_every_outcome() {
        let rubicon = client();
        let project = rubicon.create_project(ProjectRecord::new("p")).await.unwrap();
        let experiment = project.log_experiment(ExperimentRecord::builder()).await.unwrap();

        let outcomes = gather_settled([
            experiment.log_parameter(ParameterRecord::new("ok", 1)),
            experiment.log_parameter(ParameterRecord::new("bad/name", 2)),
            experiment.log_parameter(ParameterRecord::new("also_ok", 3)),
        ])
        .await;

        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1], Err(Error::Identity { .. })));
        assert!(outcomes[2].is_ok());
        assert_eq!(experiment.parameters(&ChildFilter::new()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_try_gather_runs_every_call_before_failing() {
        let rubicon = client();
        let project = rubicon.create_project(ProjectRecord::new("p")).await.unwrap();
        let experiment = project.log_experiment(ExperimentRecord::builder()).await.unwrap();

        let err = try_gather([
            experiment.log_metric(MetricRecord::new("bad/name", 0.0)),
            experiment.log_metric(MetricRecord::new("accuracy", 0.9)),
        ])
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Identity { .. }));
        assert!(experiment.metric("accuracy").await.is_ok());
    }

    #[tokio::test]
    async fn test_get_or_create_project_is_idempotent() {
        let rubicon = client();
        let first = rubicon.get_or_create_project("p").await.unwrap();
        let second = rubicon.get_or_create_project("p").await.unwrap();
        assert_eq!(first.record(), second.record());
        assert_eq!(rubicon.projects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tag_edits_refresh_handle() {
        let rubicon = client();
        let project = rubicon.create_project(ProjectRecord::new("p")).await.unwrap();
        let mut experiment = project
            .log_experiment(ExperimentRecord::builder().tag("draft"))
            .await
            .unwrap();

        experiment.add_tags(&["success"]).await.unwrap();
        experiment.remove_tags(&["draft"]).await.unwrap();

        let tags: Vec<&str> = experiment.record().tags().iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["success"]);

        let reloaded = project.experiment(experiment.id()).await.unwrap();
        assert_eq!(reloaded.record().tags(), experiment.record().tags());
    }
}
