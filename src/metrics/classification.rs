//! Classification metrics over discrete rating classes.
//!
//! Predicted ratings are continuous; they are rounded half-to-even onto
//! the rating scale and compared with the true ratings as class labels.
//! The label set is the union of classes seen on either side.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::check_pair;

/// Averaging strategy for multi-class metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Average {
    /// Calculate metrics for each label, return unweighted mean.
    Macro,
    /// Calculate metrics globally by counting total TP, FP, FN.
    Micro,
    /// Weighted mean by support (number of true instances per label).
    Weighted,
}

/// Precision, recall and F1 under one averaging strategy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScores {
    /// TP / (TP + FP)
    pub precision: f32,
    /// TP / (TP + FN)
    pub recall: f32,
    /// Harmonic mean of precision and recall
    pub f1: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct ClassCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl ClassCounts {
    fn support(&self) -> usize {
        self.tp + self.fn_
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

fn harmonic_mean(precision: f32, recall: f32) -> f32 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Rounds a predicted rating to its class, half to even.
#[must_use]
pub fn round_rating(rating: f32) -> f32 {
    // -0.0 and 0.0 are the same class
    rating.round_ties_even() + 0.0
}

/// Sorted, deduplicated union of the classes in both sequences.
fn labels(y_pred: &[f32], y_true: &[f32]) -> Vec<f32> {
    let mut labels: Vec<f32> = y_pred.iter().chain(y_true).map(|&v| v + 0.0).collect();
    labels.sort_by(f32::total_cmp);
    labels.dedup();
    labels
}

/// Per-class counts in label order.
fn class_counts(y_pred: &[f32], y_true: &[f32]) -> Vec<ClassCounts> {
    let labels = labels(y_pred, y_true);
    let class_of = |v: f32| labels.iter().position(|&l| l == v);

    let mut counts = vec![ClassCounts::default(); labels.len()];
    for (&p, &t) in y_pred.iter().zip(y_true) {
        let (Some(pi), Some(ti)) = (class_of(p), class_of(t)) else {
            continue;
        };
        if pi == ti {
            counts[pi].tp += 1;
        } else {
            counts[pi].fp += 1;
            counts[ti].fn_ += 1;
        }
    }
    counts
}

/// Precision, recall and F1 of already-discrete predictions.
///
/// Classes with an empty denominator score 0. Under [`Average::Macro`]
/// the F1 is the mean of per-class F1 values, not the harmonic mean of
/// the averaged precision and recall.
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input.
///
/// # Examples
///
/// ```
/// use recobook::metrics::classification::{precision_recall_f1, Average};
///
/// let y_true = [5.0, 4.0, 4.0, 3.0];
/// let y_pred = [5.0, 4.0, 3.0, 3.0];
/// let scores = precision_recall_f1(&y_pred, &y_true, Average::Micro).unwrap();
/// assert!((scores.precision - 0.75).abs() < 1e-6);
/// ```
pub fn precision_recall_f1(
    y_pred: &[f32],
    y_true: &[f32],
    average: Average,
) -> Result<ClassificationScores> {
    check_pair(y_pred, y_true)?;
    let counts = class_counts(y_pred, y_true);

    let per_class = || {
        counts.iter().map(|c| {
            let precision = ratio(c.tp, c.tp + c.fp);
            let recall = ratio(c.tp, c.tp + c.fn_);
            (precision, recall, harmonic_mean(precision, recall), c.support())
        })
    };

    let scores = match average {
        Average::Macro => {
            let n = counts.len() as f32;
            let (p, r, f) = per_class().fold((0.0, 0.0, 0.0), |(p, r, f), (cp, cr, cf, _)| {
                (p + cp, r + cr, f + cf)
            });
            ClassificationScores {
                precision: p / n,
                recall: r / n,
                f1: f / n,
            }
        }
        Average::Micro => {
            let tp: usize = counts.iter().map(|c| c.tp).sum();
            let fp: usize = counts.iter().map(|c| c.fp).sum();
            let fn_: usize = counts.iter().map(|c| c.fn_).sum();
            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            ClassificationScores {
                precision,
                recall,
                f1: harmonic_mean(precision, recall),
            }
        }
        Average::Weighted => {
            let total = y_true.len() as f32;
            let (p, r, f) = per_class().fold((0.0, 0.0, 0.0), |(p, r, f), (cp, cr, cf, s)| {
                let w = s as f32 / total;
                (p + w * cp, r + w * cr, f + w * cf)
            });
            ClassificationScores {
                precision: p,
                recall: r,
                f1: f,
            }
        }
    };

    Ok(scores)
}

/// Macro precision, recall and F1 of continuous rating predictions.
///
/// Each prediction is rounded with [`round_rating`] before comparison.
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input.
pub fn precision_recall_f1_macro(y_pred: &[f32], y_true: &[f32]) -> Result<ClassificationScores> {
    let rounded: Vec<f32> = y_pred.iter().map(|&p| round_rating(p)).collect();
    precision_recall_f1(&rounded, y_true, Average::Macro)
}

#[cfg(test)]
#[path = "tests_classification_contract.rs"]
mod tests_classification_contract;
