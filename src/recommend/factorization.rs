//! Embedding-based rating predictor.
//!
//! A single parameterized model covers the four variants compared when
//! building the book recommender: plain factors, factors with bias, and
//! bias plus category (and sentiment) context. The forward pass is
//!
//! ```text
//! s    = Σ_d u[d] · i[d] (· c[d]) (· e[d])  +  b_u + b_i
//! pred = y_min + (y_max - y_min) · σ(s)
//! ```
//!
//! where `c` is the category factor, replaced by a zero vector for the
//! unknown-category sentinel, and `e` is the sentiment factor. Because the
//! context factors multiply into the same product, an unknown category
//! zeroes the interaction term and leaves only the biases.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::N_SENTIMENTS;
use crate::error::{RecommendError, Result};
use crate::preprocessing::{IndexedInteraction, InteractionIndexer};

use super::embedding::EmbeddingTable;

/// Which factor tables participate in the forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    /// User and item factors only
    Plain,
    /// Factors plus user and item bias
    Biased,
    /// Bias plus category factors
    Category,
    /// Bias plus category and sentiment factors
    Sentiment,
}

impl ModelVariant {
    /// All variants, simplest first.
    pub const ALL: [ModelVariant; 4] = [
        ModelVariant::Plain,
        ModelVariant::Biased,
        ModelVariant::Category,
        ModelVariant::Sentiment,
    ];

    /// Whether user and item bias tables are present.
    #[must_use]
    pub fn uses_bias(self) -> bool {
        !matches!(self, Self::Plain)
    }

    /// Whether a category factor table is present.
    #[must_use]
    pub fn uses_category(self) -> bool {
        matches!(self, Self::Category | Self::Sentiment)
    }

    /// Whether a sentiment factor table is present.
    #[must_use]
    pub fn uses_sentiment(self) -> bool {
        matches!(self, Self::Sentiment)
    }

    /// Name under which evaluation results of this variant are logged.
    #[must_use]
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Plain => "first_cf_model",
            Self::Biased => "fc_with_bias_model",
            Self::Category => "fc_with_category",
            Self::Sentiment => "cf_with_sentiment",
        }
    }
}

/// Predictor hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorizationConfig {
    /// Embedding width `d`
    pub n_factors: usize,
    /// Output range `(y_min, y_max)`
    pub y_range: (f32, f32),
    /// Active factor tables
    pub variant: ModelVariant,
    /// Seed for parameter initialization; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for FactorizationConfig {
    fn default() -> Self {
        Self {
            n_factors: 5,
            y_range: (0.0, 5.5),
            variant: ModelVariant::Biased,
            seed: None,
        }
    }
}

impl FactorizationConfig {
    /// Sets the embedding width.
    #[must_use]
    pub fn with_n_factors(mut self, n_factors: usize) -> Self {
        self.n_factors = n_factors;
        self
    }

    /// Sets the output range.
    #[must_use]
    pub fn with_y_range(mut self, y_min: f32, y_max: f32) -> Self {
        self.y_range = (y_min, y_max);
        self
    }

    /// Sets the variant.
    #[must_use]
    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the initialization seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a zero embedding width or a
    /// non-finite or empty output range.
    pub fn validate(&self) -> Result<()> {
        if self.n_factors == 0 {
            return Err(RecommendError::invalid_hyperparameter("n_factors", 0, "> 0"));
        }
        let (y_min, y_max) = self.y_range;
        if !(y_min.is_finite() && y_max.is_finite() && y_min < y_max) {
            return Err(RecommendError::invalid_hyperparameter(
                "y_range",
                format!("({y_min}, {y_max})"),
                "finite with y_min < y_max",
            ));
        }
        Ok(())
    }
}

/// Row counts of the factor tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSizes {
    /// Distinct users
    pub n_users: usize,
    /// Distinct items
    pub n_items: usize,
    /// Category rows, unknown sentinel included as the last one
    pub n_categories: usize,
    /// Sentiment levels
    pub n_sentiments: usize,
}

impl TableSizes {
    /// Sizes for user and item tables; one category row (the sentinel)
    /// and the standard four sentiment levels.
    #[must_use]
    pub fn new(n_users: usize, n_items: usize) -> Self {
        Self {
            n_users,
            n_items,
            n_categories: 1,
            n_sentiments: N_SENTIMENTS,
        }
    }

    /// Sets the category row count (sentinel included).
    #[must_use]
    pub fn with_categories(mut self, n_categories: usize) -> Self {
        self.n_categories = n_categories;
        self
    }

    /// Sets the sentiment row count.
    #[must_use]
    pub fn with_sentiments(mut self, n_sentiments: usize) -> Self {
        self.n_sentiments = n_sentiments;
        self
    }
}

impl From<&InteractionIndexer> for TableSizes {
    fn from(indexer: &InteractionIndexer) -> Self {
        Self::new(indexer.users().len(), indexer.items().len())
            .with_categories(indexer.categories().len())
    }
}

/// Indices of one prediction query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureIndices {
    /// User row
    pub user: usize,
    /// Item row
    pub item: usize,
    /// Category row, required by the category and sentiment variants
    pub category: Option<usize>,
    /// Sentiment row, required by the sentiment variant
    pub sentiment: Option<usize>,
}

impl FeatureIndices {
    /// Query without context.
    #[must_use]
    pub fn new(user: usize, item: usize) -> Self {
        Self {
            user,
            item,
            category: None,
            sentiment: None,
        }
    }

    /// Adds a category row.
    #[must_use]
    pub fn with_category(mut self, category: usize) -> Self {
        self.category = Some(category);
        self
    }

    /// Adds a sentiment row.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: usize) -> Self {
        self.sentiment = Some(sentiment);
        self
    }
}

impl From<&IndexedInteraction> for FeatureIndices {
    fn from(record: &IndexedInteraction) -> Self {
        Self {
            user: record.user,
            item: record.item,
            category: Some(record.category),
            sentiment: record.sentiment,
        }
    }
}

/// Intermediate values of one forward pass, kept for backpropagation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ForwardPass {
    /// Pre-activation score `s`
    pub score: f32,
    /// `σ(s)`
    pub activation: f32,
    /// Rescaled prediction
    pub prediction: f32,
}

/// Gradient buffers shaped like the model's parameter tables.
#[derive(Debug, Clone)]
pub(crate) struct Gradients {
    buffers: Vec<Vec<f32>>,
}

impl Gradients {
    /// Clears every buffer to zero.
    pub fn zero(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
    }

    /// Buffers in [`MatrixFactorization::tables_mut`] order.
    pub fn buffers(&self) -> impl Iterator<Item = &[f32]> {
        self.buffers.iter().map(Vec::as_slice)
    }
}

/// Rating predictor built from latent factor and bias tables.
///
/// # Examples
///
/// ```
/// use recobook::recommend::{FactorizationConfig, FeatureIndices, MatrixFactorization, TableSizes};
///
/// let config = FactorizationConfig::default().with_seed(42);
/// let model = MatrixFactorization::new(TableSizes::new(3, 4), config).unwrap();
///
/// let rating = model.predict(&FeatureIndices::new(0, 2)).unwrap();
/// assert!((0.0..=5.5).contains(&rating));
/// assert!(model.predict(&FeatureIndices::new(3, 0)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixFactorization {
    config: FactorizationConfig,
    user_factors: EmbeddingTable,
    item_factors: EmbeddingTable,
    user_bias: Option<EmbeddingTable>,
    item_bias: Option<EmbeddingTable>,
    category_factors: Option<EmbeddingTable>,
    sentiment_factors: Option<EmbeddingTable>,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl MatrixFactorization {
    /// Creates a randomly initialized predictor.
    ///
    /// All tables are drawn from N(0, 1).
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for an invalid config or an empty
    /// table required by the variant.
    pub fn new(sizes: TableSizes, config: FactorizationConfig) -> Result<Self> {
        config.validate()?;
        let variant = config.variant;
        let required = [
            ("n_users", sizes.n_users, true),
            ("n_items", sizes.n_items, true),
            ("n_categories", sizes.n_categories, variant.uses_category()),
            ("n_sentiments", sizes.n_sentiments, variant.uses_sentiment()),
        ];
        for (param, rows, needed) in required {
            if needed && rows == 0 {
                return Err(RecommendError::invalid_hyperparameter(param, 0, "> 0"));
            }
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let d = config.n_factors;

        let user_factors = EmbeddingTable::standard_normal("user_factors", sizes.n_users, d, &mut rng);
        let item_factors = EmbeddingTable::standard_normal("item_factors", sizes.n_items, d, &mut rng);
        let (user_bias, item_bias) = if variant.uses_bias() {
            (
                Some(EmbeddingTable::standard_normal("user_bias", sizes.n_users, 1, &mut rng)),
                Some(EmbeddingTable::standard_normal("item_bias", sizes.n_items, 1, &mut rng)),
            )
        } else {
            (None, None)
        };
        let category_factors = variant.uses_category().then(|| {
            EmbeddingTable::standard_normal("category_factors", sizes.n_categories, d, &mut rng)
        });
        let sentiment_factors = variant.uses_sentiment().then(|| {
            EmbeddingTable::standard_normal("sentiment_factors", sizes.n_sentiments, d, &mut rng)
        });

        Ok(Self {
            config,
            user_factors,
            item_factors,
            user_bias,
            item_bias,
            category_factors,
            sentiment_factors,
        })
    }

    /// Creates a predictor sized for every identifier known to `indexer`.
    ///
    /// # Errors
    ///
    /// See [`MatrixFactorization::new`].
    pub fn from_indexer(indexer: &InteractionIndexer, config: FactorizationConfig) -> Result<Self> {
        Self::new(TableSizes::from(indexer), config)
    }

    /// Hyperparameters.
    #[must_use]
    pub fn config(&self) -> &FactorizationConfig {
        &self.config
    }

    /// Active variant.
    #[must_use]
    pub fn variant(&self) -> ModelVariant {
        self.config.variant
    }

    /// Number of user rows.
    #[must_use]
    pub fn n_users(&self) -> usize {
        self.user_factors.rows()
    }

    /// Number of item rows.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.item_factors.rows()
    }

    /// Number of category rows (sentinel included), zero without category context.
    #[must_use]
    pub fn n_categories(&self) -> usize {
        self.category_factors.as_ref().map_or(0, EmbeddingTable::rows)
    }

    /// The unknown-category sentinel, if the variant has category context.
    #[must_use]
    pub fn unknown_category(&self) -> Option<usize> {
        self.category_factors.as_ref().map(|t| t.rows() - 1)
    }

    /// User factor table.
    #[must_use]
    pub fn user_factors(&self) -> &EmbeddingTable {
        &self.user_factors
    }

    /// Item factor table.
    #[must_use]
    pub fn item_factors(&self) -> &EmbeddingTable {
        &self.item_factors
    }

    /// Parameter tables in a fixed order.
    pub fn tables(&self) -> impl Iterator<Item = &EmbeddingTable> {
        [Some(&self.user_factors), Some(&self.item_factors)]
            .into_iter()
            .chain([
                self.user_bias.as_ref(),
                self.item_bias.as_ref(),
                self.category_factors.as_ref(),
                self.sentiment_factors.as_ref(),
            ])
            .flatten()
    }

    /// Parameter tables, mutable, in [`MatrixFactorization::tables`] order.
    pub(crate) fn tables_mut(&mut self) -> impl Iterator<Item = &mut EmbeddingTable> {
        [Some(&mut self.user_factors), Some(&mut self.item_factors)]
            .into_iter()
            .chain([
                self.user_bias.as_mut(),
                self.item_bias.as_mut(),
                self.category_factors.as_mut(),
                self.sentiment_factors.as_mut(),
            ])
            .flatten()
    }

    /// Zeroed gradient buffers matching the parameter tables.
    pub(crate) fn zero_gradients(&self) -> Gradients {
        Gradients {
            buffers: self.tables().map(|t| vec![0.0; t.as_slice().len()]).collect(),
        }
    }

    /// Checks that every index the variant needs is present and in range.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for an index past its table and
    /// `InvalidInput` when a required context index is missing.
    pub fn check_indices(&self, indices: &FeatureIndices) -> Result<()> {
        self.user_factors.check_index(indices.user)?;
        self.item_factors.check_index(indices.item)?;
        if let Some(table) = &self.category_factors {
            let category = indices.category.ok_or_else(|| {
                RecommendError::invalid_input("category index required by this variant")
            })?;
            table.check_index(category)?;
        }
        if let Some(table) = &self.sentiment_factors {
            let sentiment = indices.sentiment.ok_or_else(|| {
                RecommendError::invalid_input("sentiment index required by this variant")
            })?;
            table.check_index(sentiment)?;
        }
        Ok(())
    }

    /// Whether the category row is the unknown sentinel.
    fn is_unknown_category(&self, indices: &FeatureIndices) -> bool {
        matches!(
            (indices.category, self.unknown_category()),
            (Some(c), Some(sentinel)) if c == sentinel
        )
    }

    /// Rows participating in the elementwise product, unknown category excluded.
    fn factor_rows(&self, indices: &FeatureIndices) -> Result<Vec<&[f32]>> {
        self.check_indices(indices)?;
        let mut rows = vec![
            self.user_factors.row(indices.user)?,
            self.item_factors.row(indices.item)?,
        ];
        if let (Some(table), Some(category)) = (&self.category_factors, indices.category) {
            rows.push(table.row(category)?);
        }
        if let (Some(table), Some(sentiment)) = (&self.sentiment_factors, indices.sentiment) {
            rows.push(table.row(sentiment)?);
        }
        Ok(rows)
    }

    pub(crate) fn forward(&self, indices: &FeatureIndices) -> Result<ForwardPass> {
        let rows = self.factor_rows(indices)?;

        let interaction = if self.is_unknown_category(indices) {
            0.0
        } else {
            (0..self.config.n_factors)
                .map(|d| rows.iter().map(|row| row[d]).product::<f32>())
                .sum()
        };

        let mut score = interaction;
        if let (Some(user_bias), Some(item_bias)) = (&self.user_bias, &self.item_bias) {
            score += user_bias.row(indices.user)?[0] + item_bias.row(indices.item)?[0];
        }

        let (y_min, y_max) = self.config.y_range;
        let activation = sigmoid(score);
        let prediction = (y_min + (y_max - y_min) * activation).clamp(y_min, y_max);

        Ok(ForwardPass {
            score,
            activation,
            prediction,
        })
    }

    /// Raw score before squashing.
    ///
    /// # Errors
    ///
    /// See [`MatrixFactorization::check_indices`].
    pub fn raw_score(&self, indices: &FeatureIndices) -> Result<f32> {
        Ok(self.forward(indices)?.score)
    }

    /// Predicted rating, always within the configured `y_range`.
    ///
    /// # Errors
    ///
    /// See [`MatrixFactorization::check_indices`].
    pub fn predict(&self, indices: &FeatureIndices) -> Result<f32> {
        Ok(self.forward(indices)?.prediction)
    }

    /// Predicted ratings for indexed records, in order.
    ///
    /// # Errors
    ///
    /// Fails on the first record with an invalid index.
    pub fn predict_batch(&self, records: &[IndexedInteraction]) -> Result<Vec<f32>> {
        records
            .iter()
            .map(|r| self.predict(&FeatureIndices::from(r)))
            .collect()
    }

    /// Adds the gradient of one sample's loss to `grads`.
    ///
    /// `dloss_dpred` is the derivative of the loss with respect to this
    /// sample's prediction. The unknown-category row receives no gradient.
    pub(crate) fn accumulate_gradients(
        &self,
        indices: &FeatureIndices,
        pass: &ForwardPass,
        dloss_dpred: f32,
        grads: &mut Gradients,
    ) -> Result<()> {
        let (y_min, y_max) = self.config.y_range;
        let dscore = dloss_dpred * (y_max - y_min) * pass.activation * (1.0 - pass.activation);
        let d = self.config.n_factors;
        let unknown_category = self.is_unknown_category(indices);

        // (buffer position, row) of each factor in the product, in tables() order
        let mut slots: Vec<(usize, usize, &[f32])> = vec![
            (0, indices.user, self.user_factors.row(indices.user)?),
            (1, indices.item, self.item_factors.row(indices.item)?),
        ];
        let mut next = 2;
        if self.user_bias.is_some() {
            grads.buffers[next][indices.user] += dscore;
            grads.buffers[next + 1][indices.item] += dscore;
            next += 2;
        }
        if let (Some(table), Some(category)) = (&self.category_factors, indices.category) {
            slots.push((next, category, table.row(category)?));
            next += 1;
        }
        if let (Some(table), Some(sentiment)) = (&self.sentiment_factors, indices.sentiment) {
            slots.push((next, sentiment, table.row(sentiment)?));
        }

        // the unknown category contributes a zero vector, so every factor
        // gradient vanishes
        if unknown_category {
            return Ok(());
        }

        for dim in 0..d {
            for (k, &(buffer, row, _)) in slots.iter().enumerate() {
                let others: f32 = slots
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != k)
                    .map(|(_, &(_, _, values))| values[dim])
                    .product();
                grads.buffers[buffer][row * d + dim] += dscore * others;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "factorization_tests.rs"]
mod tests;
