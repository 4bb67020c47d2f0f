use std::{collections::{BTreeMap, BTreeSet}, fmt};

use serde::{Deserialize, Serialize};

/// A resolved POI category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// Raw tag found in the mapping.
    Known(String),
    /// Raw tag with no mapping entry, passed through as is.
    Unmapped(String),
}

impl Category {
    pub fn name(&self) -> &str {
        match self {
            Category::Known(name) | Category::Unmapped(name) => name,
        }
    }

    pub fn is_known(&self) -> bool { matches!(self, Category::Known(_)) }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw OSM tag value to category name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap(BTreeMap<String, String>);

impl CategoryMap {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, raw: impl Into<String>, category: impl Into<String>) -> Self {
        self.0.insert(raw.into(), category.into());
        self
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn resolve(&self, raw: &str) -> Category {
        match self.0.get(raw) {
            Some(category) => Category::Known(category.clone()),
            None => Category::Unmapped(raw.to_string()),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The closed set of categories kept in the destinations table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(BTreeSet<String>);

impl CategorySet {
    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn contains(&self, name: &str) -> bool { self.0.contains(name) }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }

    /// Whether rows of `category` are kept. Known and unmapped categories
    /// are treated alike: only the name counts.
    pub fn retains(&self, category: &Category) -> bool { self.contains(category.name()) }
}

impl<S: Into<String>> FromIterator<S> for CategorySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
