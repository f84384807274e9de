//! # Rubicon-DB: Experiment Metadata Logging and Retrieval
//!
//! **Version**: 0.1.0
//!
//! Rubicon-DB records machine-learning experiments (projects, experiments,
//! parameters, features, metrics, artifacts and dataframes) and persists them
//! through a pluggable storage backend: a local directory, a process-wide
//! in-memory map, or any object store (S3, GCS, Azure).
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke**: identities are validated before a path is ever computed,
//!   so no record can land outside its parent's directory
//! - **Jidoka**: one corrupt record is skipped with a warning and never
//!   hides the rest of a listing
//! - **Heijunka**: no global lock; concurrent writers are kept apart by
//!   fresh ids and atomic writes
//! - **Genchi Genbutsu**: backend equivalence tests (filesystem == memory ==
//!   object store)
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`identity`] | `(project, [experiment, [kind, id]])` to storage path |
//! | [`backend`] | byte-level read/write/list/exists/delete |
//! | [`codec`] | versioned record envelope, Parquet dataframes |
//! | [`experiment`] | record types |
//! | [`repository`] | entity CRUD, listing, tag queries |
//! | [`client`] | blocking and async typed handles |
//! | [`catalog`] | named, re-openable references to entities |
//!
//! ## Example Usage
//!
//! ```rust
//! use rubicon_db::client::Rubicon;
//! use rubicon_db::experiment::{ExperimentRecord, MetricRecord, ParameterRecord, ProjectRecord};
//! use rubicon_db::repository::{MatchMode, RepositoryConfig};
//!
//! # fn main() -> rubicon_db::Result<()> {
//! let rubicon = Rubicon::from_config(&RepositoryConfig::memory("lib-doc"))?;
//! let project = rubicon.create_project(
//!     ProjectRecord::builder("Iris Model").description("classifying irises").build(),
//! )?;
//!
//! let mut experiment = project.log_experiment(
//!     ExperimentRecord::builder().model_name("RandomForestClassifier"),
//! )?;
//! experiment.log_parameter(ParameterRecord::new("n_estimators", 100))?;
//! experiment.log_metric(MetricRecord::new("accuracy", 0.94))?;
//! experiment.add_tags(&["success"])?;
//!
//! let successes = project.experiments(&["success"], MatchMode::Any)?;
//! assert_eq!(successes.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod backend;
pub mod catalog;
pub mod client;
pub mod codec;
pub mod error;
pub mod experiment;
pub mod identity;
pub mod repository;

pub use error::{Error, Result};
