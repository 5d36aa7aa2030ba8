//! Identifier indexing.
//!
//! Maps raw identifiers (user ids, ASINs, category labels) to dense
//! zero-based indices so they can address rows of a factor table.
//!
//! - [`IndexMapping`]: bijection in first-occurrence order
//! - [`CategoryMapping`]: same, with a reserved unknown bucket as the last index
//! - [`InteractionIndexer`]: builds all mappings for a corpus snapshot

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::data::{Interaction, SentimentCategory, UNKNOWN_CATEGORY};
use crate::error::{RecommendError, Result};

/// Immutable bijection from distinct identifiers to `[0, n)`.
///
/// Indices are assigned in first-occurrence order.
///
/// # Examples
///
/// ```
/// use recobook::preprocessing::IndexMapping;
///
/// let users = IndexMapping::from_values(["bob", "amy", "bob", "cat"]);
/// assert_eq!(users.len(), 3);
/// assert_eq!(users.to_index("amy").unwrap(), 1);
/// assert_eq!(*users.from_index(2).unwrap(), "cat");
/// assert!(users.to_index("dan").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMapping<K: Eq + Hash> {
    forward: HashMap<K, usize>,
    reverse: Vec<K>,
}

impl<K: Eq + Hash + Clone> IndexMapping<K> {
    /// Builds a mapping from a sequence of identifiers, duplicates allowed.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut forward = HashMap::new();
        let mut reverse = Vec::new();
        for value in values {
            if !forward.contains_key(&value) {
                forward.insert(value.clone(), reverse.len());
                reverse.push(value);
            }
        }
        Self { forward, reverse }
    }

    /// Index of `key`.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if the identifier was not seen when the
    /// mapping was built.
    pub fn to_index<Q>(&self, key: &Q) -> Result<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
    {
        self.forward
            .get(key)
            .copied()
            .ok_or_else(|| RecommendError::key_not_found(key))
    }

    /// Identifier at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= len()`.
    pub fn from_index(&self, index: usize) -> Result<&K> {
        self.reverse
            .get(index)
            .ok_or_else(|| RecommendError::index_out_of_range("index_mapping", index, self.len()))
    }

    /// Whether `key` has an index.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.contains_key(key)
    }

    /// Number of distinct identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Identifiers in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &K)> {
        self.reverse.iter().enumerate()
    }
}

/// Category labels with a reserved unknown bucket.
///
/// Observed labels other than [`UNKNOWN_CATEGORY`] receive indices
/// `[0, n_known)` in first-occurrence order. The unknown bucket is always
/// the last index, `n_known`, whether or not the marker was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    known: IndexMapping<String>,
}

impl CategoryMapping {
    /// Builds the mapping from observed labels.
    ///
    /// # Examples
    ///
    /// ```
    /// use recobook::preprocessing::CategoryMapping;
    ///
    /// let categories = CategoryMapping::from_labels(["Fantasy", "unknown", "History"]);
    /// assert_eq!(categories.len(), 3);
    /// assert_eq!(categories.unknown_index(), 2);
    /// assert_eq!(categories.to_index("unknown").unwrap(), 2);
    /// assert_eq!(categories.to_index("History").unwrap(), 1);
    /// ```
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known = IndexMapping::from_values(
            labels
                .into_iter()
                .map(|label| label.as_ref().to_string())
                .filter(|label| label.as_str() != UNKNOWN_CATEGORY),
        );
        Self { known }
    }

    /// The reserved unknown index (always the last one).
    #[must_use]
    pub fn unknown_index(&self) -> usize {
        self.known.len()
    }

    /// Total number of indices, unknown bucket included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len() + 1
    }

    /// Always false: the unknown bucket is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of `label`; the literal unknown marker maps to the sentinel.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` for any other label not seen at build time.
    pub fn to_index(&self, label: &str) -> Result<usize> {
        if label == UNKNOWN_CATEGORY {
            return Ok(self.unknown_index());
        }
        self.known.to_index(label)
    }

    /// Index of `label`, routing labels absent from the mapping to the sentinel.
    #[must_use]
    pub fn to_index_or_unknown(&self, label: &str) -> usize {
        self.to_index(label).unwrap_or(self.unknown_index())
    }

    /// Label at `index`; the sentinel yields the unknown marker.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= len()`.
    pub fn from_index(&self, index: usize) -> Result<&str> {
        if index == self.unknown_index() {
            return Ok(UNKNOWN_CATEGORY);
        }
        self.known
            .from_index(index)
            .map(String::as_str)
            .map_err(|_| RecommendError::index_out_of_range("category_mapping", index, self.len()))
    }
}

/// A record with every identifier resolved to a table index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedInteraction {
    /// User row
    pub user: usize,
    /// Item row
    pub item: usize,
    /// Category row (sentinel for unknown)
    pub category: usize,
    /// Sentiment row, if labeled
    pub sentiment: Option<usize>,
    /// Observed rating
    pub rating: f32,
}

/// User, item and category mappings for one corpus snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionIndexer {
    users: IndexMapping<String>,
    items: IndexMapping<String>,
    categories: CategoryMapping,
}

impl InteractionIndexer {
    /// Builds all mappings from the full corpus (before splitting), so
    /// that held-out records resolve to the same indices as training ones.
    #[must_use]
    pub fn fit(records: &[Interaction]) -> Self {
        let users = IndexMapping::from_values(records.iter().map(|r| r.user_id.clone()));
        let items = IndexMapping::from_values(records.iter().map(|r| r.item_id.clone()));
        let categories = CategoryMapping::from_labels(records.iter().map(Interaction::category_or_unknown));

        tracing::debug!(
            n_users = users.len(),
            n_items = items.len(),
            n_categories = categories.len(),
            "built interaction indexer"
        );

        Self {
            users,
            items,
            categories,
        }
    }

    /// User mapping.
    #[must_use]
    pub fn users(&self) -> &IndexMapping<String> {
        &self.users
    }

    /// Item mapping.
    #[must_use]
    pub fn items(&self) -> &IndexMapping<String> {
        &self.items
    }

    /// Category mapping.
    #[must_use]
    pub fn categories(&self) -> &CategoryMapping {
        &self.categories
    }

    /// Resolves one record.
    ///
    /// A missing category maps to the unknown sentinel; a category label
    /// never seen at fit time also maps to the sentinel.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if the user or item has no index, and
    /// `InvalidInput` for a non-finite rating.
    pub fn transform_one(&self, record: &Interaction) -> Result<IndexedInteraction> {
        if !record.rating.is_finite() {
            return Err(RecommendError::invalid_input(format!(
                "rating must be finite, got {}",
                record.rating
            )));
        }
        Ok(IndexedInteraction {
            user: self.users.to_index(record.user_id.as_str())?,
            item: self.items.to_index(record.item_id.as_str())?,
            category: self
                .categories
                .to_index_or_unknown(record.category_or_unknown()),
            sentiment: record.sentiment.map(SentimentCategory::index),
            rating: record.rating,
        })
    }

    /// Resolves every record, failing on the first unresolvable one.
    ///
    /// # Errors
    ///
    /// See [`InteractionIndexer::transform_one`].
    pub fn transform(&self, records: &[Interaction]) -> Result<Vec<IndexedInteraction>> {
        records.iter().map(|r| self.transform_one(r)).collect()
    }
}
