use crate::vector::FeatureVector;
use serde::{Deserialize, Serialize};

/// Catalog item identifier.
///
/// Integers order before strings, integers compare numerically; this order is
/// the tie-break used when two results share a similarity score.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Integer(u64),
    String(String),
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Integer(i) => write!(f, "{}", i),
            ItemId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for ItemId {
    fn from(i: u64) -> Self {
        ItemId::Integer(i)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::String(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::String(s.to_string())
    }
}

/// A product record eligible for ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL or filesystem path of the product image
    pub image_url: String,
    /// Previously persisted feature vector, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
}

impl CatalogItem {
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            description: None,
            image_url: image_url.into(),
            features: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_features(mut self, features: FeatureVector) -> Self {
        self.features = Some(features);
        self
    }

    /// Persisted features, ignoring empty vectors
    #[inline]
    pub fn persisted_features(&self) -> Option<&FeatureVector> {
        self.features.as_ref().filter(|f| !f.is_empty())
    }

    /// ASCII case-insensitive category comparison
    #[inline]
    pub fn in_category(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category)
    }
}
