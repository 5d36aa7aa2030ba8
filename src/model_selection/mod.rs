//! Train/held-out splitting of interaction records.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Split configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of records held out for evaluation, in `(0, 1)`
    pub test_fraction: f32,
    /// Seed for a reproducible shuffle; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: None,
        }
    }
}

impl SplitConfig {
    /// Sets the held-out fraction.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f32) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Sets the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the held-out fraction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` unless `0 < test_fraction < 1`.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(RecommendError::invalid_hyperparameter(
                "test_fraction",
                self.test_fraction,
                "in (0, 1)",
            ));
        }
        Ok(())
    }
}

fn shuffle_indices(n_samples: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);
    indices
}

/// Randomly partitions `records` into disjoint `(train, test)` sets.
///
/// The test set holds `ceil(n * test_fraction)` records.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` for a fraction outside `(0, 1)` and
/// `InvalidInput` when either side of the split would be empty.
///
/// # Examples
///
/// ```
/// use recobook::model_selection::{train_test_split, SplitConfig};
///
/// let records: Vec<u32> = (0..10).collect();
/// let config = SplitConfig::default().with_seed(42);
/// let (train, test) = train_test_split(&records, &config).unwrap();
/// assert_eq!(train.len(), 8);
/// assert_eq!(test.len(), 2);
/// ```
pub fn train_test_split<T: Clone>(records: &[T], config: &SplitConfig) -> Result<(Vec<T>, Vec<T>)> {
    config.validate()?;

    let n_samples = records.len();
    if n_samples == 0 {
        return Err(RecommendError::invalid_input("cannot split an empty record set"));
    }

    let n_test = (n_samples as f32 * config.test_fraction).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(RecommendError::invalid_input(format!(
            "split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )));
    }

    let indices = shuffle_indices(n_samples, config.seed);
    let test: Vec<T> = indices[..n_test].iter().map(|&i| records[i].clone()).collect();
    let train: Vec<T> = indices[n_test..].iter().map(|&i| records[i].clone()).collect();

    tracing::debug!(n_train, n_test, "split interactions");

    Ok((train, test))
}
