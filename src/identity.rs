//! Identity & path scheme
//!
//! Every record's storage location is derived from its parent chain alone:
//!
//! ```text
//! <project>/metadata
//! <project>/experiments/<experiment_id>/metadata
//! <project>/experiments/<experiment_id>/<kind>/<child_id>/metadata
//! <project>/experiments/<experiment_id>/<kind>/<child_id>/data     (artifacts, dataframes)
//! <project>/<kind>/<child_id>/metadata                             (project-level artifacts, dataframes)
//! ```
//!
//! Child kinds are sibling directories, so listing one kind never scans
//! another kind's records.
//!
//! Poka-Yoke: names are validated when an [`Identity`] is built, so a path
//! can never be computed from a name that would escape its directory.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name holding an entity's encoded record.
pub const RECORD_FILE: &str = "metadata";

/// File name holding an artifact or dataframe payload.
pub const DATA_FILE: &str = "data";

const EXPERIMENTS_DIR: &str = "experiments";

/// Kind of record owned by an experiment (or, for artifacts and
/// dataframes, by a project).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    /// Hyperparameter, keyed by name
    Parameter,
    /// Model input feature, keyed by generated id
    Feature,
    /// Evaluation metric, keyed by name
    Metric,
    /// Raw byte payload, keyed by generated id
    Artifact,
    /// Tabular payload, keyed by generated id
    Dataframe,
}

impl ChildKind {
    /// All child kinds, in storage-layout order.
    pub const ALL: [Self; 5] = [
        Self::Parameter,
        Self::Feature,
        Self::Metric,
        Self::Artifact,
        Self::Dataframe,
    ];

    /// Directory that namespaces this kind under its owner.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Parameter => "parameters",
            Self::Feature => "features",
            Self::Metric => "metrics",
            Self::Artifact => "artifacts",
            Self::Dataframe => "dataframes",
        }
    }

    /// Parameters and metrics are stored under their name (last write wins);
    /// every other kind gets a fresh id per log call.
    #[must_use]
    pub const fn keyed_by_name(self) -> bool {
        matches!(self, Self::Parameter | Self::Metric)
    }

    /// Artifacts and dataframes may hang directly off a project.
    #[must_use]
    pub const fn allowed_on_project(self) -> bool {
        matches!(self, Self::Artifact | Self::Dataframe)
    }

    /// Singular name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parameter => "parameter",
            Self::Feature => "feature",
            Self::Metric => "metric",
            Self::Artifact => "artifact",
            Self::Dataframe => "dataframe",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-relative location, as a sequence of validated path segments.
///
/// Backends decide how segments become a concrete location (a directory
/// tree, an object key prefix, a map key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoragePath {
    segments: Vec<String>,
}

impl StoragePath {
    /// The backend root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Append one segment.
    #[must_use]
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True for the backend root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Check that `value` is usable as a single path segment.
///
/// # Errors
///
/// Returns [`Error::Identity`] for empty names, `.`/`..`, names starting
/// with `.` (reserved for in-flight temporary files), names containing a
/// path separator, and names containing control characters.
pub fn validate_name(value: &str) -> Result<()> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.starts_with('.') {
        Some("must not start with '.'")
    } else if value.contains(['/', '\\']) {
        Some("must not contain a path separator")
    } else if value.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::Identity {
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Logical identity of a stored entity: `(project, [experiment_id, [kind, child_id]])`.
///
/// Project-level artifacts and dataframes have a child but no experiment id.
/// Identities are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "IdentityRepr", into = "IdentityRepr")]
pub struct Identity {
    project: String,
    experiment_id: Option<String>,
    child: Option<(ChildKind, String)>,
}

#[derive(Serialize, Deserialize)]
struct IdentityRepr {
    project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    experiment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ChildKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    child_id: Option<String>,
}

impl TryFrom<IdentityRepr> for Identity {
    type Error = Error;

    fn try_from(repr: IdentityRepr) -> Result<Self> {
        let owner = match repr.experiment_id {
            Some(experiment_id) => Self::experiment(repr.project, experiment_id)?,
            None => Self::project(repr.project)?,
        };
        match (repr.kind, repr.child_id) {
            (Some(kind), Some(child_id)) => owner.child(kind, child_id),
            (None, None) => Ok(owner),
            (_, Some(child_id)) => Err(Error::Identity {
                value: child_id,
                reason: "child id without a child kind",
            }),
            (Some(kind), None) => Err(Error::Identity {
                value: kind.to_string(),
                reason: "child kind without a child id",
            }),
        }
    }
}

impl From<Identity> for IdentityRepr {
    fn from(identity: Identity) -> Self {
        let (kind, child_id) = identity.child.unzip();
        Self {
            project: identity.project,
            experiment_id: identity.experiment_id,
            kind,
            child_id,
        }
    }
}

impl Identity {
    /// Identity of a project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Identity`] if `name` is not a valid path segment.
    pub fn project(name: impl Into<String>) -> Result<Self> {
        let project = name.into();
        validate_name(&project)?;
        Ok(Self {
            project,
            experiment_id: None,
            child: None,
        })
    }

    /// Identity of an experiment within a project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Identity`] if either component is invalid.
    pub fn experiment(project: impl Into<String>, experiment_id: impl Into<String>) -> Result<Self> {
        let experiment_id = experiment_id.into();
        validate_name(&experiment_id)?;
        let mut identity = Self::project(project)?;
        identity.experiment_id = Some(experiment_id);
        Ok(identity)
    }

    /// Identity of a child owned by this project or experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Identity`] if `self` is already a child, if `kind`
    /// cannot be owned by a project, or if `child_id` is invalid.
    pub fn child(&self, kind: ChildKind, child_id: impl Into<String>) -> Result<Self> {
        self.check_owner(kind)?;
        let child_id = child_id.into();
        validate_name(&child_id)?;
        Ok(Self {
            project: self.project.clone(),
            experiment_id: self.experiment_id.clone(),
            child: Some((kind, child_id)),
        })
    }

    fn check_owner(&self, kind: ChildKind) -> Result<()> {
        if self.child.is_some() {
            return Err(Error::Identity {
                value: self.to_string(),
                reason: "children cannot own other children",
            });
        }
        if self.experiment_id.is_none() && !kind.allowed_on_project() {
            return Err(Error::Identity {
                value: format!("{self} {kind}"),
                reason: "only artifacts and dataframes can be owned by a project",
            });
        }
        Ok(())
    }

    /// Project name.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project
    }

    /// Experiment id, for experiments and experiment-owned children.
    #[must_use]
    pub fn experiment_id(&self) -> Option<&str> {
        self.experiment_id.as_deref()
    }

    /// Child kind, for children.
    #[must_use]
    pub fn child_kind(&self) -> Option<ChildKind> {
        self.child.as_ref().map(|(kind, _)| *kind)
    }

    /// Child id (or name for parameters and metrics), for children.
    #[must_use]
    pub fn child_id(&self) -> Option<&str> {
        self.child.as_ref().map(|(_, id)| id.as_str())
    }

    /// True for a bare project identity.
    #[must_use]
    pub const fn is_project(&self) -> bool {
        self.experiment_id.is_none() && self.child.is_none()
    }

    /// True for a bare experiment identity.
    #[must_use]
    pub const fn is_experiment(&self) -> bool {
        self.experiment_id.is_some() && self.child.is_none()
    }

    /// The owning identity, or `None` for a project.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.child.is_some() {
            Some(Self {
                project: self.project.clone(),
                experiment_id: self.experiment_id.clone(),
                child: None,
            })
        } else if self.experiment_id.is_some() {
            Some(Self {
                project: self.project.clone(),
                experiment_id: None,
                child: None,
            })
        } else {
            None
        }
    }

    /// Directory that holds this entity and all of its descendants.
    #[must_use]
    pub fn path(&self) -> StoragePath {
        let mut path = StoragePath::root().join(self.project.as_str());
        if let Some(experiment_id) = &self.experiment_id {
            path = path.join(EXPERIMENTS_DIR).join(experiment_id.as_str());
        }
        if let Some((kind, child_id)) = &self.child {
            path = path.join(kind.dir_name()).join(child_id.as_str());
        }
        path
    }

    /// Location of this entity's encoded record.
    #[must_use]
    pub fn record_path(&self) -> StoragePath {
        self.path().join(RECORD_FILE)
    }

    /// Location of this entity's payload (artifacts and dataframes).
    #[must_use]
    pub fn data_path(&self) -> StoragePath {
        self.path().join(DATA_FILE)
    }

    /// Directory listing every child of `kind` owned by this entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Identity`] if this entity cannot own `kind`.
    pub fn children_path(&self, kind: ChildKind) -> Result<StoragePath> {
        self.check_owner(kind)?;
        Ok(self.path().join(kind.dir_name()))
    }

    /// Directory listing a project's experiments.
    #[must_use]
    pub fn experiments_path(&self) -> StoragePath {
        StoragePath::root()
            .join(self.project.as_str())
            .join(EXPERIMENTS_DIR)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}", self.project)?;
        if let Some(experiment_id) = &self.experiment_id {
            write!(f, ", {experiment_id:?}")?;
        }
        if let Some((kind, child_id)) = &self.child {
            write!(f, ", {kind}, {child_id:?}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let project = Identity::project("Iris Model").unwrap();
        assert_eq!(project.record_path().to_string(), "Iris Model/metadata");

        let experiment = Identity::experiment("Iris Model", "abc").unwrap();
        assert_eq!(
            experiment.record_path().to_string(),
            "Iris Model/experiments/abc/metadata"
        );

        let parameter = experiment.child(ChildKind::Parameter, "n_estimators").unwrap();
        assert_eq!(
            parameter.path().to_string(),
            "Iris Model/experiments/abc/parameters/n_estimators"
        );

        let artifact = project.child(ChildKind::Artifact, "a1").unwrap();
        assert_eq!(artifact.data_path().to_string(), "Iris Model/artifacts/a1/data");
    }

    #[test]
    fn test_rejects_separators() {
        for bad in ["", ".", "..", "a/b", "a\\b", ".hidden", "tab\there"] {
            let err = Identity::project(bad).unwrap_err();
            assert!(matches!(err, Error::Identity { .. }), "{bad:?} accepted");
        }
        assert!(Identity::experiment("p", "x/y").is_err());
    }

    #[test]
    fn test_parameter_not_allowed_on_project() {
        let project = Identity::project("p").unwrap();
        assert!(project.child(ChildKind::Parameter, "lr").is_err());
        assert!(project.children_path(ChildKind::Metric).is_err());
        assert!(project.child(ChildKind::Dataframe, "d1").is_ok());
    }

    #[test]
    fn test_children_cannot_nest() {
        let parameter = Identity::experiment("p", "e")
            .unwrap()
            .child(ChildKind::Parameter, "lr")
            .unwrap();
        assert!(parameter.child(ChildKind::Artifact, "a").is_err());
    }

    #[test]
    fn test_parent_chain() {
        let metric = Identity::experiment("p", "e")
            .unwrap()
            .child(ChildKind::Metric, "auc")
            .unwrap();
        let experiment = metric.parent().unwrap();
        assert!(experiment.is_experiment());
        let project = experiment.parent().unwrap();
        assert!(project.is_project());
        assert!(project.parent().is_none());
    }

    #[test]
    fn test_serde_validates() {
        let identity = Identity::experiment("p", "e")
            .unwrap()
            .child(ChildKind::Feature, "f1")
            .unwrap();
        let json = serde_json::to_string(&identity).unwrap();
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);

        let bad = r#"{"project":"../etc"}"#;
        assert!(serde_json::from_str::<Identity>(bad).is_err());

        let dangling = r#"{"project":"p","child_id":"x"}"#;
        assert!(serde_json::from_str::<Identity>(dangling).is_err());
    }
}
