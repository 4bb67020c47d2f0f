use std::collections::BTreeMap;

use geo::Geometry;
use serde::{Deserialize, Serialize};

/// One point of interest as delivered by the extraction collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiRecord {
    pub geometry: Option<Geometry<f64>>,
    pub amenity: Option<String>,
    pub shop: Option<String>,
    pub leisure: Option<String>,
    /// Unstructured tag text, searched by substring.
    pub tags: Option<String>,
}

impl PoiRecord {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self { geometry: Some(geometry), ..Default::default() }
    }

    pub fn with_amenity(mut self, value: impl Into<String>) -> Self {
        self.amenity = Some(value.into());
        self
    }

    pub fn with_shop(mut self, value: impl Into<String>) -> Self {
        self.shop = Some(value.into());
        self
    }

    pub fn with_leisure(mut self, value: impl Into<String>) -> Self {
        self.leisure = Some(value.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// A structured tag column by key. Empty strings count as missing.
    pub fn column(&self, key: &str) -> Option<&str> {
        let value = match key {
            "amenity" => self.amenity.as_deref(),
            "shop" => self.shop.as_deref(),
            "leisure" => self.leisure.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Which POIs to extract: tag key to accepted values. An empty value list
/// accepts any value for that key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagFilter(pub BTreeMap<String, Vec<String>>);

impl TagFilter {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, key: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.0.insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// A record matches when any key matches. Structured keys (`amenity`,
    /// `shop`, `leisure`) compare the column value; other keys are looked up
    /// in the free-text tags. An empty filter matches everything.
    pub fn matches(&self, record: &PoiRecord) -> bool {
        if self.0.is_empty() {
            return true
        }
        self.0.iter().any(|(key, values)| match key.as_str() {
            "amenity" | "shop" | "leisure" => record.column(key)
                .is_some_and(|value| values.is_empty() || values.iter().any(|v| v == value)),
            _ => record.tags.as_deref()
                .is_some_and(|tags| tags.contains(key.as_str())
                    && (values.is_empty() || values.iter().any(|v| tags.contains(v.as_str())))),
        })
    }
}
