//! Hierarchical identity tags and require/ignore predicates
//!
//! Tags are dotted names such as `Terrain.Ground.Grass`. A container holding
//! `Terrain.Ground.Grass` satisfies a query for `Terrain.Ground` or `Terrain`,
//! but not the other way around.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single dotted, hierarchical tag name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameplayTag(String);

impl GameplayTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this tag is `query` or a child of it
    pub fn matches(&self, query: &GameplayTag) -> bool {
        match self.0.strip_prefix(query.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }

    /// The parent tag (`A.B.C` -> `A.B`), if any
    pub fn parent(&self) -> Option<GameplayTag> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| GameplayTag(parent.to_string()))
    }
}

impl From<&str> for GameplayTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered set of tags without duplicates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagContainer {
    tags: Vec<GameplayTag>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; returns false if it was already present
    pub fn add(&mut self, tag: impl Into<GameplayTag>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn with(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.add(tag);
        self
    }

    pub fn remove(&mut self, tag: &GameplayTag) -> bool {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
            true
        } else {
            false
        }
    }

    /// Exact membership, no hierarchy
    pub fn contains_exact(&self, tag: &GameplayTag) -> bool {
        self.tags.contains(tag)
    }

    /// Hierarchical membership: some tag here is `tag` or one of its children
    pub fn has_tag(&self, tag: &GameplayTag) -> bool {
        self.tags.iter().any(|t| t.matches(tag))
    }

    /// Every tag of `other` is matched here. Vacuously true for an empty `other`.
    pub fn has_all(&self, other: &TagContainer) -> bool {
        other.tags.iter().all(|t| self.has_tag(t))
    }

    /// Some tag of `other` is matched here. Always false for an empty `other`.
    pub fn has_any(&self, other: &TagContainer) -> bool {
        other.tags.iter().any(|t| self.has_tag(t))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameplayTag> {
        self.tags.iter()
    }
}

impl<T: Into<GameplayTag>> FromIterator<T> for TagContainer {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut container = TagContainer::new();
        for tag in iter {
            container.add(tag);
        }
        container
    }
}

impl fmt::Display for TagContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

/// Predicate a neighbor's tags must satisfy to count as adjacent
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagRequirements {
    /// All of these tags must be present
    #[serde(default, skip_serializing_if = "TagContainer::is_empty")]
    pub require_tags: TagContainer,
    /// None of these tags may be present
    #[serde(default, skip_serializing_if = "TagContainer::is_empty")]
    pub ignore_tags: TagContainer,
}

impl TagRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.require_tags.add(tag);
        self
    }

    pub fn ignore(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.ignore_tags.add(tag);
        self
    }

    /// True if all required tags and no ignored tags are found in `container`
    pub fn requirements_met(&self, container: &TagContainer) -> bool {
        container.has_all(&self.require_tags) && !container.has_any(&self.ignore_tags)
    }

    /// True if neither list has any tags (everything passes)
    pub fn is_empty(&self) -> bool {
        self.require_tags.is_empty() && self.ignore_tags.is_empty()
    }
}

impl fmt::Display for TagRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.require_tags.is_empty() {
            parts.push(format!("require: {}", self.require_tags));
        }
        if !self.ignore_tags.is_empty() {
            parts.push(format!("ignore: {}", self.ignore_tags));
        }
        f.write_str(&parts.join(" "))
    }
}
