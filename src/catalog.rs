//! Export catalog
//!
//! A catalog maps human-readable source names to the entity they name and
//! the repository that holds it. An external reader that receives the
//! JSON form can reopen the same root and resolve the same entity without
//! knowing which backend wrote it.
//!
//! ```json
//! {
//!   "sources": {
//!     "experiment_7f9c...": {
//!       "entity": { "project": "Iris Model", "experiment_id": "7f9c..." },
//!       "repository": { "persistence": { "type": "filesystem" }, "root_dir": "/data/rubicon", ... }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::AnyBackend;
use crate::identity::Identity;
use crate::repository::{Repository, RepositoryConfig};
use crate::{Error, Result};

/// One named source: an entity plus where it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Entity the source resolves to
    pub entity: Identity,
    /// Repository holding the entity
    pub repository: RepositoryConfig,
}

/// Named sources, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    sources: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of `entities` in one repository, named by
    /// [`Catalog::default_name`]. Publishing the same entity twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if two different entities map to
    /// the same source name.
    pub fn publish<I>(repository: &RepositoryConfig, entities: I) -> Result<Self>
    where
        I: IntoIterator<Item = Identity>,
    {
        let mut catalog = Self::new();
        for entity in entities {
            let name = Self::default_name(&entity);
            match catalog.get(&name) {
                Some(existing) if existing.entity == entity => {}
                Some(_) => return Err(Error::already_exists("catalog_publish", name)),
                None => catalog.insert(name, entity, repository.clone()),
            }
        }
        Ok(catalog)
    }

    /// Source name used by [`Catalog::publish`]: `project_<name>`,
    /// `experiment_<id>`, or `<kind>_<owner>_<id>` for children, where the
    /// owner is the experiment id or, for project-level children, the
    /// project name.
    #[must_use]
    pub fn default_name(entity: &Identity) -> String {
        match (entity.child_kind(), entity.child_id(), entity.experiment_id()) {
            (Some(kind), Some(child_id), Some(experiment_id)) => {
                format!("{kind}_{experiment_id}_{child_id}")
            }
            (Some(kind), Some(child_id), None) => {
                format!("{kind}_{}_{child_id}", entity.project_name())
            }
            (_, _, Some(experiment_id)) => format!("experiment_{experiment_id}"),
            _ => format!("project_{}", entity.project_name()),
        }
    }

    /// Add or replace a source.
    pub fn insert(&mut self, name: impl Into<String>, entity: Identity, repository: RepositoryConfig) {
        self.sources
            .insert(name.into(), CatalogEntry { entity, repository });
    }

    /// Look up a source.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.sources.get(name)
    }

    /// Number of sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True if there are no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.sources.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Reopen the repository behind `name` and return it with the entity.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the catalog has no such source
    /// - see [`RepositoryConfig::open`]
    pub fn open(&self, name: &str) -> Result<(Repository<AnyBackend>, Identity)> {
        let entry = self
            .get(name)
            .ok_or_else(|| Error::not_found("catalog_open", name))?;
        Ok((entry.repository.open()?, entry.entity.clone()))
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::codec("catalog_to_json", "catalog", e))
    }

    /// Parse the JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] on malformed JSON or an invalid identity.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::codec("catalog_from_json", "catalog", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ChildKind;

    #[test]
    fn test_default_names() {
        let project = Identity::project("Iris Model").unwrap();
        let experiment = Identity::experiment("Iris Model", "e1").unwrap();
        let artifact = experiment.child(ChildKind::Artifact, "a1").unwrap();

        assert_eq!(Catalog::default_name(&project), "project_Iris Model");
        assert_eq!(Catalog::default_name(&experiment), "experiment_e1");
        assert_eq!(Catalog::default_name(&artifact), "artifact_e1_a1");

        let project_metric = project.child(ChildKind::Metric, "loss").unwrap();
        assert_eq!(Catalog::default_name(&project_metric), "metric_Iris Model_loss");
    }

    #[test]
    fn test_same_named_parameters_from_two_experiments() {
        let config = RepositoryConfig::memory("m");
        let first = Identity::experiment("p", "e1").unwrap();
        let second = Identity::experiment("p", "e2").unwrap();
        let entities = [
            first.child(ChildKind::Parameter, "lr").unwrap(),
            second.child(ChildKind::Parameter, "lr").unwrap(),
        ];

        let catalog = Catalog::publish(&config, entities.clone()).unwrap();
        assert_eq!(catalog.len(), 2);
        for entity in &entities {
            let entry = catalog.get(&Catalog::default_name(entity)).unwrap();
            assert_eq!(&entry.entity, entity);
        }
    }

    #[test]
    fn test_publish_rejects_name_clash() {
        let config = RepositoryConfig::memory("m");
        let in_a = Identity::experiment("a", "e1").unwrap();
        let in_b = Identity::experiment("b", "e1").unwrap();

        let err = Catalog::publish(&config, [in_a.clone(), in_b]).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { operation: "catalog_publish", .. }));

        let catalog = Catalog::publish(&config, [in_a.clone(), in_a]).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_json_rejects_invalid_identity() {
        let json = r#"{"sources":{"bad":{"entity":{"project":"a/b","experiment_id":null,"kind":null,"child_id":null},"repository":{"persistence":{"type":"memory"},"root_dir":"m"}}}}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Codec { .. }));
    }

    #[test]
    fn test_open_unknown_source() {
        let err = Catalog::new().open("missing").unwrap_err();
        assert!(err.is_not_found());
    }
}
