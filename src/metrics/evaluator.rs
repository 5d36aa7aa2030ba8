//! Full evaluation battery and the append-only performance log.

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

use super::classification::precision_recall_f1_macro;
use super::ranking::{ndcg, permutation_mrr, top_percent_map};
use super::{check_pair, mae, rmse};

/// Evaluation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Share of each ranking marked relevant for MAP, in percent
    pub map_cutoff_percent: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            map_cutoff_percent: 20,
        }
    }
}

impl EvaluationConfig {
    /// Sets the MAP cutoff.
    #[must_use]
    pub fn with_map_cutoff_percent(mut self, percent: usize) -> Self {
        self.map_cutoff_percent = percent;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a cutoff above 100 percent.
    pub fn validate(&self) -> Result<()> {
        if self.map_cutoff_percent > 100 {
            return Err(RecommendError::invalid_hyperparameter(
                "map_cutoff_percent",
                self.map_cutoff_percent,
                "<= 100",
            ));
        }
        Ok(())
    }
}

/// Metrics of one model on one held-out split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Name of the evaluated model
    pub model_name: String,
    /// Mean absolute error
    pub mae: f32,
    /// Root mean squared error
    pub rmse: f32,
    /// Macro precision over rounded ratings
    pub precision: f32,
    /// Macro recall over rounded ratings
    pub recall: f32,
    /// Macro F1 over rounded ratings
    pub f1: f32,
    /// NDCG of the whole split as one query
    pub ndcg: f32,
    /// Permutation MRR
    pub mrr: f32,
    /// Top-percent MAP
    pub map: f32,
}

/// Computes every metric for one model's held-out predictions.
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input or a
/// negative true rating, and `InvalidHyperparameter` for an invalid config.
///
/// # Examples
///
/// ```
/// use recobook::metrics::{evaluate, EvaluationConfig};
///
/// let y_true = [5.0, 4.0, 3.0, 2.0, 1.0];
/// let record = evaluate("fc_with_bias_model", &y_true, &y_true, &EvaluationConfig::default()).unwrap();
/// assert_eq!(record.rmse, 0.0);
/// assert_eq!(record.map, 1.0);
/// ```
pub fn evaluate(
    model_name: &str,
    y_pred: &[f32],
    y_true: &[f32],
    config: &EvaluationConfig,
) -> Result<PerformanceRecord> {
    config.validate()?;
    check_pair(y_pred, y_true)?;

    let scores = precision_recall_f1_macro(y_pred, y_true)?;
    let record = PerformanceRecord {
        model_name: model_name.to_string(),
        mae: mae(y_pred, y_true)?,
        rmse: rmse(y_pred, y_true)?,
        precision: scores.precision,
        recall: scores.recall,
        f1: scores.f1,
        ndcg: ndcg(y_pred, y_true)?,
        mrr: permutation_mrr(y_pred, y_true)?,
        map: top_percent_map(y_pred, y_true, config.map_cutoff_percent)?,
    };

    tracing::debug!(
        model = model_name,
        n_samples = y_true.len(),
        mae = record.mae,
        rmse = record.rmse,
        f1 = record.f1,
        ndcg = record.ndcg,
        mrr = record.mrr,
        map = record.map,
        "evaluated model"
    );

    Ok(record)
}

/// Ordered, append-only collection of evaluation results.
///
/// Serializes as a plain JSON array of records. The same model name may
/// appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceLog {
    records: Vec<PerformanceRecord>,
}

impl PerformanceLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn append(&mut self, record: PerformanceRecord) {
        self.records.push(record);
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    /// Records of one model, in insertion order.
    pub fn by_model<'a>(&'a self, model_name: &'a str) -> impl Iterator<Item = &'a PerformanceRecord> {
        self.records.iter().filter(move |r| r.model_name == model_name)
    }

    /// Most recent record of one model.
    #[must_use]
    pub fn latest(&self, model_name: &str) -> Option<&PerformanceRecord> {
        self.records.iter().rev().find(|r| r.model_name == model_name)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Extend<PerformanceRecord> for PerformanceLog {
    fn extend<I: IntoIterator<Item = PerformanceRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}
