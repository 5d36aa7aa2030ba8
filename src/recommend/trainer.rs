//! Mini-batch training of a [`MatrixFactorization`] with Adam.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};
use crate::optim::{Adam, Optimizer};
use crate::preprocessing::IndexedInteraction;

use super::factorization::{FeatureIndices, MatrixFactorization};

/// Training hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Adam step size
    pub learning_rate: f32,
    /// L2 penalty coefficient, 0 disables regularization
    pub weight_decay: f32,
    /// Records per mini-batch; the last batch of an epoch may be smaller
    pub batch_size: usize,
    /// Passes over the training set
    pub epochs: usize,
    /// Seed for batch shuffling; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            weight_decay: 0.0,
            batch_size: 1024,
            epochs: 20,
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the L2 weight decay.
    #[must_use]
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Sets the mini-batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the number of epochs.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the shuffling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a non-positive learning rate,
    /// negative weight decay, or zero batch size or epoch count.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(RecommendError::invalid_hyperparameter(
                "learning_rate",
                self.learning_rate,
                "> 0",
            ));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(RecommendError::invalid_hyperparameter(
                "weight_decay",
                self.weight_decay,
                ">= 0",
            ));
        }
        if self.batch_size == 0 {
            return Err(RecommendError::invalid_hyperparameter("batch_size", 0, "> 0"));
        }
        if self.epochs == 0 {
            return Err(RecommendError::invalid_hyperparameter("epochs", 0, "> 0"));
        }
        Ok(())
    }
}

/// Loss trace of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Mean batch MSE of each epoch, penalty excluded
    pub epoch_losses: Vec<f32>,
    /// Loss of the last epoch
    pub final_loss: f32,
}

/// Fits a predictor's tables to observed ratings.
///
/// Each epoch shuffles the training set, splits it into mini-batches and
/// applies one Adam step per batch to every parameter table.
///
/// # Examples
///
/// ```
/// use recobook::preprocessing::IndexedInteraction;
/// use recobook::recommend::{FactorizationConfig, MatrixFactorization, TableSizes, Trainer, TrainerConfig};
///
/// let data = vec![
///     IndexedInteraction { user: 0, item: 0, category: 0, sentiment: None, rating: 5.0 },
///     IndexedInteraction { user: 1, item: 1, category: 0, sentiment: None, rating: 1.0 },
/// ];
/// let mut model = MatrixFactorization::new(
///     TableSizes::new(2, 2),
///     FactorizationConfig::default().with_seed(1),
/// )
/// .unwrap();
///
/// let trainer = Trainer::new(TrainerConfig::default().with_epochs(3).with_seed(1));
/// let history = trainer.fit(&mut model, &data).unwrap();
/// assert_eq!(history.epoch_losses.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Creates a trainer.
    #[must_use]
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Hyperparameters.
    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Trains `model` in place on `data`.
    ///
    /// Every record is checked against the model's tables before the
    /// first update, so a failed call leaves the model untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidHyperparameter` for an invalid config
    /// - `InvalidInput` for an empty training set, a non-finite rating, or
    ///   a missing context index the variant requires
    /// - `IndexOutOfRange` for an index past its table
    pub fn fit(
        &self,
        model: &mut MatrixFactorization,
        data: &[IndexedInteraction],
    ) -> Result<TrainingHistory> {
        self.config.validate()?;
        if data.is_empty() {
            return Err(RecommendError::invalid_input("training set is empty"));
        }
        let samples: Vec<FeatureIndices> = data.iter().map(FeatureIndices::from).collect();
        for (indices, record) in samples.iter().zip(data) {
            model.check_indices(indices)?;
            if !record.rating.is_finite() {
                return Err(RecommendError::invalid_input(format!(
                    "rating must be finite, got {}",
                    record.rating
                )));
            }
        }

        tracing::debug!(
            variant = ?model.variant(),
            n_users = model.n_users(),
            n_items = model.n_items(),
            n_categories = model.n_categories(),
            n_samples = data.len(),
            learning_rate = self.config.learning_rate,
            weight_decay = self.config.weight_decay,
            batch_size = self.config.batch_size,
            epochs = self.config.epochs,
            "starting training"
        );

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut optimizers: Vec<Adam> = model
            .tables()
            .map(|_| Adam::new(self.config.learning_rate).with_weight_decay(self.config.weight_decay))
            .collect();
        let mut grads = model.zero_gradients();
        let mut order: Vec<usize> = (0..data.len()).collect();
        let mut epoch_losses = Vec::with_capacity(self.config.epochs);

        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            let mut loss_sum = 0.0;
            let mut n_batches = 0usize;

            for batch in order.chunks(self.config.batch_size) {
                grads.zero();
                let batch_len = batch.len() as f32;
                let mut squared_error = 0.0;

                for &i in batch {
                    let pass = model.forward(&samples[i])?;
                    let error = pass.prediction - data[i].rating;
                    squared_error += error * error;
                    model.accumulate_gradients(&samples[i], &pass, 2.0 * error / batch_len, &mut grads)?;
                }

                for ((table, optimizer), gradient) in model
                    .tables_mut()
                    .zip(optimizers.iter_mut())
                    .zip(grads.buffers())
                {
                    optimizer.step(table.as_mut_slice(), gradient)?;
                }

                loss_sum += squared_error / batch_len;
                n_batches += 1;
            }

            let epoch_loss = loss_sum / n_batches as f32;
            tracing::info!(epoch = epoch + 1, loss = epoch_loss, "epoch complete");
            epoch_losses.push(epoch_loss);
        }

        let final_loss = epoch_losses.last().copied().unwrap_or(f32::NAN);
        Ok(TrainingHistory {
            epoch_losses,
            final_loss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::{FactorizationConfig, ModelVariant, TableSizes};

    fn record(user: usize, item: usize, rating: f32) -> IndexedInteraction {
        IndexedInteraction {
            user,
            item,
            category: 0,
            sentiment: None,
            rating,
        }
    }

    fn toy_data() -> Vec<IndexedInteraction> {
        vec![
            record(0, 0, 5.0),
            record(0, 1, 3.0),
            record(1, 1, 4.0),
            record(1, 2, 1.0),
            record(2, 0, 2.0),
            record(2, 3, 5.0),
        ]
    }

    fn toy_model(variant: ModelVariant) -> MatrixFactorization {
        let config = FactorizationConfig::default()
            .with_n_factors(2)
            .with_variant(variant)
            .with_seed(7);
        MatrixFactorization::new(TableSizes::new(3, 4).with_categories(2), config).expect("valid")
    }

    #[test]
    fn test_config_defaults() {
        let config = TrainerConfig::default();
        assert!((config.learning_rate - 0.01).abs() < 1e-9);
        assert_eq!(config.weight_decay, 0.0);
        assert_eq!(config.batch_size, 1024);
        assert_eq!(config.epochs, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        for config in [
            TrainerConfig::default().with_learning_rate(0.0),
            TrainerConfig::default().with_weight_decay(-1.0),
            TrainerConfig::default().with_batch_size(0),
            TrainerConfig::default().with_epochs(0),
        ] {
            assert!(matches!(
                config.validate(),
                Err(RecommendError::InvalidHyperparameter { .. })
            ));
        }
    }

    #[test]
    fn test_fit_reduces_loss() {
        let mut model = toy_model(ModelVariant::Biased);
        let trainer = Trainer::new(
            TrainerConfig::default()
                .with_learning_rate(0.05)
                .with_epochs(50)
                .with_seed(3),
        );
        let history = trainer.fit(&mut model, &toy_data()).expect("valid data");

        assert_eq!(history.epoch_losses.len(), 50);
        assert_eq!(history.final_loss, history.epoch_losses[49]);
        assert!(history.final_loss < history.epoch_losses[0]);
    }

    #[test]
    fn test_fit_every_variant() {
        let data: Vec<_> = toy_data()
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.category = i % 2;
                r.sentiment = Some(i % 4);
                r
            })
            .collect();
        for variant in ModelVariant::ALL {
            let mut model = toy_model(variant);
            let trainer = Trainer::new(TrainerConfig::default().with_epochs(2).with_seed(1));
            let history = trainer.fit(&mut model, &data).expect("valid data");
            assert!(history.final_loss.is_finite(), "{variant:?}");
        }
    }

    #[test]
    fn test_fit_is_reproducible() {
        let trainer = Trainer::new(TrainerConfig::default().with_batch_size(2).with_epochs(3).with_seed(9));
        let mut a = toy_model(ModelVariant::Category);
        let mut b = toy_model(ModelVariant::Category);
        let ha = trainer.fit(&mut a, &toy_data()).expect("valid data");
        let hb = trainer.fit(&mut b, &toy_data()).expect("valid data");
        assert_eq!(ha, hb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mini_batches_average_per_batch_loss() {
        // batch of one: epoch loss is the mean of per-sample squared errors
        let mut model = toy_model(ModelVariant::Plain);
        let data = vec![record(0, 0, 5.0)];
        let before = model.predict(&FeatureIndices::new(0, 0)).expect("valid");
        let trainer = Trainer::new(TrainerConfig::default().with_batch_size(1).with_epochs(1));
        let history = trainer.fit(&mut model, &data).expect("valid data");
        assert!((history.epoch_losses[0] - (before - 5.0).powi(2)).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range_index_leaves_model_untouched() {
        let mut model = toy_model(ModelVariant::Biased);
        let snapshot = model.clone();
        let mut data = toy_data();
        data.push(record(3, 0, 4.0));

        let err = Trainer::default().fit(&mut model, &data).unwrap_err();
        assert_eq!(err, RecommendError::index_out_of_range("user_factors", 3, 3));
        assert_eq!(model, snapshot);
    }

    #[test]
    fn test_sentiment_variant_requires_sentiment() {
        let mut model = toy_model(ModelVariant::Sentiment);
        let err = Trainer::default().fit(&mut model, &toy_data()).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidInput { .. }));
    }

    #[test]
    fn test_empty_training_set() {
        let mut model = toy_model(ModelVariant::Biased);
        let err = Trainer::default().fit(&mut model, &[]).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidInput { .. }));
    }

    #[test]
    fn test_weight_decay_shrinks_unused_rows() {
        // item 3 never appears, so only the penalty moves its factors
        let data: Vec<_> = toy_data().into_iter().filter(|r| r.item != 3).collect();
        let mut model = toy_model(ModelVariant::Biased);
        let before: f32 = model.item_factors().row(3).expect("row").iter().map(|x| x * x).sum();

        let trainer = Trainer::new(
            TrainerConfig::default()
                .with_weight_decay(1.0)
                .with_epochs(20)
                .with_seed(2),
        );
        trainer.fit(&mut model, &data).expect("valid data");

        let after: f32 = model.item_factors().row(3).expect("row").iter().map(|x| x * x).sum();
        assert!(after < before);
    }
}
