//! Top-K recommendation from a trained predictor.

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

use super::factorization::{FeatureIndices, MatrixFactorization};

/// Item recommendations for one user, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecommendations {
    /// User row
    pub user: usize,
    /// Item rows, highest predicted rating first
    pub items: Vec<usize>,
}

/// Ranks candidate items for a user by predicted rating.
///
/// Queries carry no review context: variants with category factors score
/// with the given category (the unknown sentinel unless set), and the
/// sentiment variant needs an explicit sentiment.
///
/// # Examples
///
/// ```
/// use recobook::recommend::{FactorizationConfig, MatrixFactorization, Recommender, TableSizes};
///
/// let model = MatrixFactorization::new(
///     TableSizes::new(2, 5),
///     FactorizationConfig::default().with_seed(3),
/// )
/// .unwrap();
///
/// let top = Recommender::new(&model).top_k(0, &[0, 1, 2, 3, 4], 3).unwrap();
/// assert_eq!(top.len(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    model: &'a MatrixFactorization,
    category: Option<usize>,
    sentiment: Option<usize>,
}

impl<'a> Recommender<'a> {
    /// Creates a recommender over a trained model.
    #[must_use]
    pub fn new(model: &'a MatrixFactorization) -> Self {
        Self {
            model,
            category: None,
            sentiment: None,
        }
    }

    /// Scores with a fixed category row instead of the unknown sentinel.
    #[must_use]
    pub fn with_category(mut self, category: usize) -> Self {
        self.category = Some(category);
        self
    }

    /// Scores with a fixed sentiment row.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: usize) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    fn query(&self, user: usize, item: usize) -> Result<FeatureIndices> {
        let variant = self.model.variant();
        let mut indices = FeatureIndices::new(user, item);
        if variant.uses_category() {
            indices.category = self.category.or_else(|| self.model.unknown_category());
        }
        if variant.uses_sentiment() {
            let sentiment = self.sentiment.ok_or_else(|| {
                RecommendError::invalid_input(
                    "sentiment variant cannot score items without a sentiment",
                )
            })?;
            indices.sentiment = Some(sentiment);
        }
        Ok(indices)
    }

    /// Up to `k` `(item, predicted rating)` pairs, highest rating first.
    ///
    /// Items with equal scores keep their order in `items`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for an unknown user or item row and
    /// `InvalidInput` if the sentiment variant has no sentiment set.
    pub fn top_k_scored(&self, user: usize, items: &[usize], k: usize) -> Result<Vec<(usize, f32)>> {
        self.model.user_factors().check_index(user)?;

        let mut scored = items
            .iter()
            .map(|&item| {
                let indices = self.query(user, item)?;
                Ok((item, self.model.predict(&indices)?))
            })
            .collect::<Result<Vec<_>>>()?;

        // sort_by is stable
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }

    /// Up to `k` item rows, highest predicted rating first.
    ///
    /// # Errors
    ///
    /// See [`Recommender::top_k_scored`].
    pub fn top_k(&self, user: usize, items: &[usize], k: usize) -> Result<Vec<usize>> {
        Ok(self
            .top_k_scored(user, items, k)?
            .into_iter()
            .map(|(item, _)| item)
            .collect())
    }

    /// Top `k` items for every user in `users`, in the given user order.
    ///
    /// # Errors
    ///
    /// Fails on the first user that [`Recommender::top_k`] rejects.
    pub fn recommend_all(
        &self,
        users: &[usize],
        items: &[usize],
        k: usize,
    ) -> Result<Vec<UserRecommendations>> {
        let recommendations = users
            .iter()
            .map(|&user| {
                Ok(UserRecommendations {
                    user,
                    items: self.top_k(user, items, k)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            n_users = users.len(),
            n_items = items.len(),
            k,
            "generated recommendations"
        );
        Ok(recommendations)
    }
}
