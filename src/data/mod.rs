//! Interaction records consumed by the recommender.
//!
//! A record is one historical review: who rated which book, the rating,
//! and the optional context features produced upstream (a cleaned
//! category label and a discretized sentiment level). Parsing files and
//! running the sentiment classifier happen outside this crate.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Literal category marker for books without a usable category.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Number of discrete sentiment levels.
pub const N_SENTIMENTS: usize = 4;

/// Confidence above which a classifier verdict counts as strong.
const STRONG_SENTIMENT_THRESHOLD: f32 = 0.9;

/// Discretized review sentiment.
///
/// The discriminant is the index used to look up the sentiment factor
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentCategory {
    /// Strongly negative review
    Hated = 0,
    /// Mildly negative review
    Disliked = 1,
    /// Mildly positive review
    Liked = 2,
    /// Strongly positive review
    Loved = 3,
}

impl SentimentCategory {
    /// All levels in index order.
    pub const ALL: [SentimentCategory; N_SENTIMENTS] = [
        SentimentCategory::Hated,
        SentimentCategory::Disliked,
        SentimentCategory::Liked,
        SentimentCategory::Loved,
    ];

    /// Maps a binary sentiment classifier verdict to a level.
    ///
    /// `label` is `POSITIVE` or `NEGATIVE` (case-insensitive) and `score`
    /// is the classifier confidence, nominally in `[0.5, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unrecognized label or a non-finite score.
    ///
    /// # Examples
    ///
    /// ```
    /// use recobook::data::SentimentCategory;
    ///
    /// let level = SentimentCategory::from_classifier("POSITIVE", 0.97).unwrap();
    /// assert_eq!(level, SentimentCategory::Loved);
    /// ```
    pub fn from_classifier(label: &str, score: f32) -> Result<Self> {
        if !score.is_finite() {
            return Err(RecommendError::invalid_input(format!(
                "sentiment score must be finite, got {score}"
            )));
        }
        let strong = score > STRONG_SENTIMENT_THRESHOLD;
        if label.eq_ignore_ascii_case("POSITIVE") {
            Ok(if strong { Self::Loved } else { Self::Liked })
        } else if label.eq_ignore_ascii_case("NEGATIVE") {
            Ok(if strong { Self::Hated } else { Self::Disliked })
        } else {
            Err(RecommendError::invalid_input(format!(
                "unknown sentiment label '{label}'"
            )))
        }
    }

    /// Index into the sentiment factor table.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Level for a table index.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for indices `>= 4`.
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| RecommendError::index_out_of_range("sentiment", index, N_SENTIMENTS))
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hated => "hated",
            Self::Disliked => "disliked",
            Self::Liked => "liked",
            Self::Loved => "loved",
        };
        f.write_str(name)
    }
}

/// One review: a user's rating of an item with optional context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Raw user identifier
    pub user_id: String,
    /// Raw item identifier
    pub item_id: String,
    /// Observed rating
    pub rating: f32,
    /// Cleaned category label, if known
    pub category: Option<String>,
    /// Discretized sentiment of the review text, if labeled
    pub sentiment: Option<SentimentCategory>,
}

impl Interaction {
    /// Creates a record without context features.
    #[must_use]
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, rating: f32) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
            category: None,
            sentiment: None,
        }
    }

    /// Attaches a category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attaches a sentiment level.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: SentimentCategory) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Category label, falling back to [`UNKNOWN_CATEGORY`].
    #[must_use]
    pub fn category_or_unknown(&self) -> &str {
        self.category.as_deref().unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// Keeps only the records of users with between `min_reviews` and
/// `max_reviews` records (inclusive), preserving input order.
///
/// # Errors
///
/// Returns `InvalidInput` if `min_reviews > max_reviews`.
///
/// # Examples
///
/// ```
/// use recobook::data::{filter_by_user_activity, Interaction};
///
/// let records = vec![
///     Interaction::new("a", "x", 5.0),
///     Interaction::new("a", "y", 4.0),
///     Interaction::new("b", "x", 3.0),
/// ];
/// let kept = filter_by_user_activity(&records, 2, 10).unwrap();
/// assert_eq!(kept.len(), 2);
/// assert!(kept.iter().all(|r| r.user_id == "a"));
/// ```
pub fn filter_by_user_activity(
    records: &[Interaction],
    min_reviews: usize,
    max_reviews: usize,
) -> Result<Vec<Interaction>> {
    if min_reviews > max_reviews {
        return Err(RecommendError::invalid_input(format!(
            "min_reviews ({min_reviews}) exceeds max_reviews ({max_reviews})"
        )));
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.user_id.as_str()).or_default() += 1;
    }

    let kept: Vec<Interaction> = records
        .iter()
        .filter(|r| {
            let n = counts.get(r.user_id.as_str()).copied().unwrap_or(0);
            (min_reviews..=max_reviews).contains(&n)
        })
        .cloned()
        .collect();

    tracing::debug!(
        total = records.len(),
        kept = kept.len(),
        min_reviews,
        max_reviews,
        "filtered interactions by user activity"
    );

    Ok(kept)
}
