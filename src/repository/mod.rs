//! Repository: entity CRUD over a storage backend
//!
//! The repository is the only component that writes to a backend. It turns
//! records into bytes with the [codec](crate::codec), places them at the
//! locations the [identity scheme](crate::identity) derives, and reads them
//! back for listings and queries.
//!
//! ## Concurrency
//!
//! There is no in-process lock. Correctness under concurrent writers
//! (threads, tasks, or processes sharing a directory or bucket) rests on
//! fresh ids for experiments and id-keyed children, plus the backend's
//! atomic write. Two writers targeting the same path (a parameter logged
//! twice at the same instant, or concurrent tag edits on one experiment)
//! race, and the last write wins.
//!
//! Listings are not linearizable with concurrent writes. A record whose
//! write is in flight may or may not appear.
//!
//! # Example
//!
//! ```rust
//! use rubicon_db::backend::MemoryBackend;
//! use rubicon_db::experiment::{ExperimentRecord, ParameterRecord, ProjectRecord};
//! use rubicon_db::repository::{ChildFilter, MatchMode, Repository};
//!
//! # async fn example() -> rubicon_db::Result<()> {
//! let repo = Repository::new(MemoryBackend::isolated("doc"));
//! repo.create_project(ProjectRecord::new("Iris Model")).await?;
//!
//! let experiment = repo
//!     .create_experiment("Iris Model", ExperimentRecord::builder().tag("baseline"))
//!     .await?;
//! let owner = experiment.identity()?;
//! repo.log_parameter(&owner, ParameterRecord::new("n_estimators", 100)).await?;
//!
//! let found = repo.query_experiments("Iris Model", &["baseline"], MatchMode::Any).await?;
//! assert_eq!(found.len(), 1);
//! assert_eq!(repo.list_parameters(&owner, &ChildFilter::new()).await?.len(), 1);
//! # Ok(())
//! # }
//! ```

mod config;
mod query;

pub use config::{Persistence, RepositoryConfig, RepositoryConfigBuilder};
pub use query::{ChildFilter, MatchMode};

use std::fmt;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use tracing::{debug, info, warn};

use crate::backend::{AnyBackend, Backend};
use crate::codec::{self, parquet, Record};
use crate::experiment::{
    new_id, ArtifactRecord, ChildRecord, DataframeRecord, ExperimentRecord, ExperimentRecordBuilder,
    FeatureRecord, MetricRecord, ParameterRecord, ProjectRecord,
};
use crate::identity::{ChildKind, Identity, StoragePath};
use crate::{Error, Result};

/// Default bound on experiment-id regeneration after a collision.
pub const DEFAULT_ID_ATTEMPTS: usize = 5;

type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Entity store over a [`Backend`].
///
/// Cheap to clone when the backend is; clients share one instance behind
/// an `Arc`.
#[derive(Clone)]
pub struct Repository<B: Backend = AnyBackend> {
    backend: B,
    id_attempts: usize,
    id_generator: IdGenerator,
    config: Option<RepositoryConfig>,
}

impl<B: Backend + fmt::Debug> fmt::Debug for Repository<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("backend", &self.backend)
            .field("id_attempts", &self.id_attempts)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Repository<B> {
    /// Create a repository over `backend` with random UUID experiment ids.
    pub fn new(backend: B) -> Self {
        let id_generator: IdGenerator = Arc::new(new_id);
        Self {
            backend,
            id_attempts: DEFAULT_ID_ATTEMPTS,
            id_generator,
            config: None,
        }
    }

    /// How many fresh ids to try before experiment creation fails
    /// (minimum 1).
    #[must_use]
    pub fn with_id_attempts(mut self, id_attempts: usize) -> Self {
        self.id_attempts = id_attempts.max(1);
        self
    }

    /// Replace the experiment-id generator.
    #[must_use]
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.id_generator = Arc::new(generator);
        self
    }

    #[must_use]
    pub(crate) fn with_config(mut self, config: RepositoryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Configuration this repository was opened from, if any.
    pub const fn config(&self) -> Option<&RepositoryConfig> {
        self.config.as_ref()
    }

    // ---------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------

    /// Persist a new project.
    ///
    /// # Errors
    ///
    /// - [`Error::Identity`] if the name is not a valid path segment
    /// - [`Error::AlreadyExists`] if a project with that name exists
    /// - [`Error::BackendIo`] on storage failure
    pub async fn create_project(&self, project: ProjectRecord) -> Result<ProjectRecord> {
        let identity = project.identity()?;
        if self.backend.exists(&identity.record_path()).await? {
            return Err(Error::already_exists("create_project", &identity));
        }
        self.write_record(&identity, &project).await?;
        info!(project = project.name(), backend = self.backend.kind(), "created project");
        Ok(project)
    }

    /// Fetch a project by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such project exists.
    pub async fn get_project(&self, name: &str) -> Result<ProjectRecord> {
        let identity = Identity::project(name)?;
        self.read_record("get_project", &identity).await
    }

    /// Every project under the root, oldest first.
    ///
    /// Unreadable project records are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] if the root cannot be listed.
    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        let mut projects = Vec::new();
        for name in self.backend.list(&StoragePath::root()).await? {
            let identity = match Identity::project(name.as_str()) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(entry = %name, error = %e, "skipping entry that is not a project");
                    continue;
                }
            };
            if let Some(project) = self
                .read_listed::<ProjectRecord>("list_projects", &identity)
                .await?
            {
                projects.push(project);
            }
        }
        projects.sort_by(|a, b| (a.created_at(), a.name()).cmp(&(b.created_at(), b.name())));
        Ok(projects)
    }

    // ---------------------------------------------------------------
    // Experiments
    // ---------------------------------------------------------------

    /// Create an experiment under `project` with a freshly generated id.
    ///
    /// Ids are regenerated on collision with an existing experiment, up to
    /// the configured bound.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the project does not exist
    /// - [`Error::BackendIo`] if no unused id was found, or on storage
    ///   failure
    pub async fn create_experiment(
        &self,
        project: &str,
        fields: ExperimentRecordBuilder,
    ) -> Result<ExperimentRecord> {
        let owner = Identity::project(project)?;
        if !self.backend.exists(&owner.record_path()).await? {
            return Err(Error::not_found("create_experiment", &owner));
        }

        let identity = self.fresh_experiment_identity(&owner).await?;
        let id = identity.experiment_id().unwrap_or_default().to_string();
        let experiment = fields.build(project, id);
        self.write_record(&identity, &experiment).await?;
        info!(project, experiment = experiment.id(), "created experiment");
        Ok(experiment)
    }

    async fn fresh_experiment_identity(&self, owner: &Identity) -> Result<Identity> {
        for attempt in 1..=self.id_attempts {
            let identity = Identity::experiment(owner.project_name(), (self.id_generator)())?;
            if !self.backend.exists(&identity.record_path()).await? {
                return Ok(identity);
            }
            warn!(%identity, attempt, "experiment id collision, regenerating");
        }
        Err(Error::backend_io(
            "create_experiment",
            owner,
            format!("no unused experiment id after {} attempts", self.id_attempts),
        ))
    }

    /// Fetch one experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_experiment(&self, project: &str, experiment_id: &str) -> Result<ExperimentRecord> {
        let identity = Identity::experiment(project, experiment_id)?;
        self.read_record("get_experiment", &identity).await
    }

    /// Every experiment in `project`, oldest first.
    ///
    /// # Errors
    ///
    /// See [`Repository::query_experiments`].
    pub async fn list_experiments(&self, project: &str) -> Result<Vec<ExperimentRecord>> {
        self.query_experiments::<&str>(project, &[], MatchMode::Any).await
    }

    /// Experiments in `project` whose tags satisfy `tags` under
    /// `match_mode`, ordered by creation time then id.
    ///
    /// An empty `tags` list selects every experiment. Unreadable records
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub async fn query_experiments<S>(
        &self,
        project: &str,
        tags: &[S],
        match_mode: MatchMode,
    ) -> Result<Vec<ExperimentRecord>>
    where
        S: AsRef<str> + Sync,
    {
        let owner = Identity::project(project)?;
        let mut experiments = Vec::new();
        for id in self.backend.list(&owner.experiments_path()).await? {
            let identity = match Identity::experiment(project, id.as_str()) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(entry = %id, error = %e, "skipping entry that is not an experiment");
                    continue;
                }
            };
            let Some(experiment) = self
                .read_listed::<ExperimentRecord>("query_experiments", &identity)
                .await?
            else {
                continue;
            };
            if match_mode.matches(tags, experiment.tags()) {
                experiments.push(experiment);
            }
        }
        experiments.sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));
        Ok(experiments)
    }

    /// Merge `tags` into an experiment's tag set and rewrite its record.
    ///
    /// Adding a tag that is already present is a no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::Identity`] if `experiment` is not an experiment identity
    /// - [`Error::NotFound`] if the experiment does not exist
    pub async fn add_tags<S>(&self, experiment: &Identity, tags: &[S]) -> Result<ExperimentRecord>
    where
        S: AsRef<str> + Sync,
    {
        self.update_tags("add_tags", experiment, |record| {
            record.add_tags(tags.iter().map(<S as AsRef<str>>::as_ref));
        })
        .await
    }

    /// Remove `tags` from an experiment's tag set and rewrite its record.
    ///
    /// Absent tags are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`Repository::add_tags`].
    pub async fn remove_tags<S>(&self, experiment: &Identity, tags: &[S]) -> Result<ExperimentRecord>
    where
        S: AsRef<str> + Sync,
    {
        self.update_tags("remove_tags", experiment, |record| {
            record.remove_tags(tags.iter().map(<S as AsRef<str>>::as_ref));
        })
        .await
    }

    async fn update_tags<F>(
        &self,
        operation: &'static str,
        experiment: &Identity,
        update: F,
    ) -> Result<ExperimentRecord>
    where
        F: FnOnce(&mut ExperimentRecord) + Send,
    {
        if !experiment.is_experiment() {
            return Err(Error::Identity {
                value: experiment.to_string(),
                reason: "tags can only be changed on an experiment",
            });
        }
        let mut record: ExperimentRecord = self.read_record(operation, experiment).await?;
        update(&mut record);
        self.write_record(experiment, &record).await?;
        debug!(%experiment, operation, tags = ?record.tags(), "updated tags");
        Ok(record)
    }

    // ---------------------------------------------------------------
    // Children
    // ---------------------------------------------------------------

    /// Write a child record (and, for artifacts and dataframes, its
    /// payload) under `owner`.
    ///
    /// Parameters and metrics are stored under their name, so logging the
    /// same name again replaces the earlier record. Every other kind gets
    /// a fresh id per call.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `owner` does not exist
    /// - [`Error::Identity`] if `owner` cannot own this kind, or a
    ///   name-keyed record has an invalid name
    /// - [`Error::Codec`] if a payload kind is logged without a payload
    pub async fn log_child<R: ChildRecord>(
        &self,
        owner: &Identity,
        mut record: R,
        payload: Option<Vec<u8>>,
    ) -> Result<R> {
        let kind = R::CHILD_KIND;
        if !self.backend.exists(&owner.record_path()).await? {
            return Err(Error::not_found("log_child", owner));
        }
        if !kind.keyed_by_name() {
            record.assign_id(new_id());
        }
        let identity = owner.child(kind, record.child_id())?;

        let has_payload = matches!(kind, ChildKind::Artifact | ChildKind::Dataframe);
        match (has_payload, payload) {
            (true, Some(bytes)) => self.backend.write(&identity.data_path(), bytes).await?,
            (true, None) => {
                return Err(Error::codec("log_child", &identity, "payload required"));
            }
            (false, _) => {}
        }
        self.write_record(&identity, &record).await?;
        debug!(%identity, name = record.name(), "logged {kind}");
        Ok(record)
    }

    /// Log a parameter on an experiment (last write wins by name).
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub async fn log_parameter(&self, experiment: &Identity, parameter: ParameterRecord) -> Result<ParameterRecord> {
        self.log_child(experiment, parameter, None).await
    }

    /// Log a feature on an experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub async fn log_feature(&self, experiment: &Identity, feature: FeatureRecord) -> Result<FeatureRecord> {
        self.log_child(experiment, feature, None).await
    }

    /// Log a metric on an experiment (last write wins by name).
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub async fn log_metric(&self, experiment: &Identity, metric: MetricRecord) -> Result<MetricRecord> {
        self.log_child(experiment, metric, None).await
    }

    /// Store an artifact payload on a project or experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::log_child`].
    pub async fn log_artifact(
        &self,
        owner: &Identity,
        mut artifact: ArtifactRecord,
        data: Vec<u8>,
    ) -> Result<ArtifactRecord> {
        artifact.set_size(data.len());
        self.log_child(owner, artifact, Some(data)).await
    }

    /// Store a dataframe on a project or experiment, as Parquet.
    ///
    /// # Errors
    ///
    /// [`Error::Codec`] if the batch cannot be encoded, otherwise see
    /// [`Repository::log_child`].
    pub async fn log_dataframe(
        &self,
        owner: &Identity,
        mut dataframe: DataframeRecord,
        batch: &RecordBatch,
    ) -> Result<DataframeRecord> {
        dataframe.set_shape(batch);
        let bytes = parquet::encode_batch(batch)?;
        self.log_child(owner, dataframe, Some(bytes)).await
    }

    /// Every child of type `R` under `owner` that passes `filter`, ordered
    /// by creation time then child id.
    ///
    /// A record that cannot be decoded, or that vanished between listing
    /// and reading, is skipped with a warning. One corrupt record never
    /// hides the rest.
    ///
    /// # Errors
    ///
    /// - [`Error::Identity`] if `owner` cannot own this kind
    /// - [`Error::BackendIo`] on storage failure
    pub async fn list_children<R: ChildRecord>(&self, owner: &Identity, filter: &ChildFilter) -> Result<Vec<R>> {
        let kind = R::CHILD_KIND;
        let mut children = Vec::new();
        for child_id in self.backend.list(&owner.children_path(kind)?).await? {
            let identity = match owner.child(kind, child_id.as_str()) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(%owner, entry = %child_id, error = %e, "skipping entry that is not a {kind}");
                    continue;
                }
            };
            if let Some(child) = self.read_listed::<R>("list_children", &identity).await? {
                if filter.accepts(&child) {
                    children.push(child);
                }
            }
        }
        children.sort_by(|a, b| (a.created_at(), a.child_id()).cmp(&(b.created_at(), b.child_id())));
        Ok(children)
    }

    /// Parameters of an experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn list_parameters(&self, experiment: &Identity, filter: &ChildFilter) -> Result<Vec<ParameterRecord>> {
        self.list_children(experiment, filter).await
    }

    /// Features of an experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn list_features(&self, experiment: &Identity, filter: &ChildFilter) -> Result<Vec<FeatureRecord>> {
        self.list_children(experiment, filter).await
    }

    /// Metrics of an experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn list_metrics(&self, experiment: &Identity, filter: &ChildFilter) -> Result<Vec<MetricRecord>> {
        self.list_children(experiment, filter).await
    }

    /// Artifacts of a project or experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn list_artifacts(&self, owner: &Identity, filter: &ChildFilter) -> Result<Vec<ArtifactRecord>> {
        self.list_children(owner, filter).await
    }

    /// Dataframes of a project or experiment.
    ///
    /// # Errors
    ///
    /// See [`Repository::list_children`].
    pub async fn list_dataframes(&self, owner: &Identity, filter: &ChildFilter) -> Result<Vec<DataframeRecord>> {
        self.list_children(owner, filter).await
    }

    /// Fetch one child record by id (by name for parameters and metrics).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_child<R: ChildRecord>(&self, owner: &Identity, child_id: &str) -> Result<R> {
        let identity = owner.child(R::CHILD_KIND, child_id)?;
        self.read_record("get_child", &identity).await
    }

    /// Fetch a parameter by name.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_child`].
    pub async fn get_parameter(&self, experiment: &Identity, name: &str) -> Result<ParameterRecord> {
        self.get_child(experiment, name).await
    }

    /// Fetch a feature by id.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_child`].
    pub async fn get_feature(&self, experiment: &Identity, id: &str) -> Result<FeatureRecord> {
        self.get_child(experiment, id).await
    }

    /// Fetch a metric by name.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_child`].
    pub async fn get_metric(&self, experiment: &Identity, name: &str) -> Result<MetricRecord> {
        self.get_child(experiment, name).await
    }

    /// Fetch an artifact record by id.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_child`].
    pub async fn get_artifact(&self, owner: &Identity, id: &str) -> Result<ArtifactRecord> {
        self.get_child(owner, id).await
    }

    /// Fetch a dataframe record by id.
    ///
    /// # Errors
    ///
    /// See [`Repository::get_child`].
    pub async fn get_dataframe(&self, owner: &Identity, id: &str) -> Result<DataframeRecord> {
        self.get_child(owner, id).await
    }

    /// Raw bytes of an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the artifact does not exist.
    pub async fn get_artifact_data(&self, owner: &Identity, id: &str) -> Result<Vec<u8>> {
        let identity = owner.child(ChildKind::Artifact, id)?;
        self.read_payload("get_artifact_data", &identity).await
    }

    /// Decoded table of a dataframe.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the dataframe does not exist
    /// - [`Error::Codec`] if the stored Parquet is unreadable
    pub async fn get_dataframe_data(&self, owner: &Identity, id: &str) -> Result<RecordBatch> {
        let identity = owner.child(ChildKind::Dataframe, id)?;
        let bytes = self.read_payload("get_dataframe_data", &identity).await?;
        parquet::decode_batch(bytes).map_err(|e| e.at(identity.data_path()))
    }

    // ---------------------------------------------------------------
    // Deletion
    // ---------------------------------------------------------------

    /// Delete an entity and everything beneath it. Deleting an absent
    /// entity is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendIo`] on storage failure.
    pub async fn delete(&self, entity: &Identity) -> Result<()> {
        self.backend.delete(&entity.path()).await?;
        info!(%entity, "deleted");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Record I/O
    // ---------------------------------------------------------------

    async fn write_record<R: Record + Sync>(&self, identity: &Identity, record: &R) -> Result<()> {
        let bytes = codec::encode(record).map_err(|e| e.at(identity.record_path()))?;
        self.backend.write(&identity.record_path(), bytes).await
    }

    async fn read_record<R: Record>(&self, operation: &'static str, identity: &Identity) -> Result<R> {
        let path = identity.record_path();
        let bytes = self
            .backend
            .read(&path)
            .await
            .map_err(|e| if e.is_not_found() { Error::not_found(operation, identity) } else { e })?;
        codec::decode(&bytes).map_err(|e| e.at(&path))
    }

    async fn read_payload(&self, operation: &'static str, identity: &Identity) -> Result<Vec<u8>> {
        self.backend
            .read(&identity.data_path())
            .await
            .map_err(|e| if e.is_not_found() { Error::not_found(operation, identity) } else { e })
    }

    /// Read a record found by a listing. Missing and undecodable records
    /// are logged and yield `None`; transport errors propagate.
    async fn read_listed<R: Record>(&self, operation: &'static str, identity: &Identity) -> Result<Option<R>> {
        match self.read_record(operation, identity).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => {
                debug!(%identity, "listed entry has no record, skipping");
                Ok(None)
            }
            Err(e @ Error::Codec { .. }) => {
                warn!(%identity, error = %e, "skipping unreadable record");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    async fn repo_with_experiment() -> (Repository<MemoryBackend>, Identity) {
        let repo = Repository::new(MemoryBackend::isolated("unit"));
        repo.create_project(ProjectRecord::new("p")).await.unwrap();
        let experiment = repo
            .create_experiment("p", ExperimentRecord::builder())
            .await
            .unwrap();
        let identity = experiment.identity().unwrap();
        (repo, identity)
    }

    #[tokio::test]
    async fn test_log_child_requires_owner() {
        let repo = Repository::new(MemoryBackend::isolated("unit"));
        let ghost = Identity::experiment("p", "missing").unwrap();
        let err = repo
            .log_parameter(&ghost, ParameterRecord::new("lr", 0.1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_payload_kind_without_payload_rejected() {
        let (repo, experiment) = repo_with_experiment().await;
        let err = repo
            .log_child(&experiment, ArtifactRecord::new("model.pkl"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Codec { .. }));
        assert!(repo
            .list_artifacts(&experiment, &ChildFilter::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_relogging_same_feature_gets_new_id() {
        let (repo, experiment) = repo_with_experiment().await;
        let feature = FeatureRecord::new("petal_width");
        let first = repo.log_feature(&experiment, feature.clone()).await.unwrap();
        let second = repo.log_feature(&experiment, feature).await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(
            repo.list_features(&experiment, &ChildFilter::new()).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_project_cannot_own_parameters() {
        let repo = Repository::new(MemoryBackend::isolated("unit"));
        repo.create_project(ProjectRecord::new("p")).await.unwrap();
        let project = Identity::project("p").unwrap();
        let err = repo
            .log_parameter(&project, ParameterRecord::new("lr", 0.1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Identity { .. }));
    }

    #[tokio::test]
    async fn test_tags_on_non_experiment_rejected() {
        let repo = Repository::new(MemoryBackend::isolated("unit"));
        let project = Identity::project("p").unwrap();
        let err = repo.add_tags(&project, &["x"]).await.unwrap_err();
        assert!(matches!(err, Error::Identity { .. }));
    }
}
