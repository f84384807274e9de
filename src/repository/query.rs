//! Tag and name filters for listings.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::experiment::ChildRecord;

/// How a list of requested tags is matched against a record's tag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Union: at least one requested tag is present
    #[default]
    Any,
    /// Intersection: every requested tag is present
    All,
}

impl MatchMode {
    /// True if `have` satisfies `wanted` under this mode.
    ///
    /// An empty `wanted` list matches everything.
    #[must_use]
    pub fn matches<S: AsRef<str>>(self, wanted: &[S], have: &BTreeSet<String>) -> bool {
        if wanted.is_empty() {
            return true;
        }
        let mut wanted = wanted.iter().map(<S as AsRef<str>>::as_ref);
        match self {
            Self::Any => wanted.any(|tag| have.contains(tag)),
            Self::All => wanted.all(|tag| have.contains(tag)),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            other => Err(format!("unknown match mode {other:?}, expected \"any\" or \"all\"")),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Any => "any",
            Self::All => "all",
        })
    }
}

/// Optional name and tag filter applied while listing children.
///
/// # Example
///
/// ```rust
/// use rubicon_db::repository::{ChildFilter, MatchMode};
///
/// let filter = ChildFilter::new()
///     .tags(["final", "validated"])
///     .match_mode(MatchMode::All);
/// assert_eq!(filter.tag_list().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildFilter {
    name: Option<String>,
    tags: Vec<String>,
    match_mode: MatchMode,
}

impl ChildFilter {
    /// A filter that keeps every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only records with this exact name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Keep only records carrying these tags (see [`MatchMode`]).
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// How requested tags are combined.
    #[must_use]
    pub const fn match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// Requested name, if any.
    #[must_use]
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Requested tags.
    #[must_use]
    pub fn tag_list(&self) -> &[String] {
        &self.tags
    }

    /// True if `record` passes the filter.
    #[must_use]
    pub fn accepts<R: ChildRecord>(&self, record: &R) -> bool {
        self.name.as_deref().map_or(true, |name| record.name() == name)
            && self.match_mode.matches(&self.tags, record.tags())
    }
}
