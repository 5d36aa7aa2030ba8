//! Ranking metrics over a single held-out list.
//!
//! The whole held-out split is treated as one query: items are ordered by
//! predicted rating and compared with their order by true rating. Ties are
//! broken by original position so every metric is reproducible.
//!
//! # Metrics
//!
//! - NDCG: graded relevance with the true rating as gain
//! - Permutation MRR: reciprocal true rank averaged in predicted order
//! - Top-percent MAP: label-ranking average precision of the binarized
//!   top of both rankings

use crate::error::{RecommendError, Result};

use super::check_pair;

/// Indices of `scores` ordered from highest to lowest score.
///
/// Equal scores keep their original relative order.
///
/// # Examples
///
/// ```
/// use recobook::metrics::ranking::stable_descending_order;
///
/// assert_eq!(stable_descending_order(&[2.0, 5.0, 2.0, 7.0]), vec![3, 1, 0, 2]);
/// ```
#[must_use]
pub fn stable_descending_order(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Discounted Cumulative Gain of gains listed in ranked order.
///
/// DCG = Σ gain_i / log2(i + 2)
#[must_use]
pub fn dcg(gains_in_rank_order: &[f32]) -> f32 {
    gains_in_rank_order
        .iter()
        .enumerate()
        .map(|(i, &gain)| gain / (i as f32 + 2.0).log2())
        .sum()
}

/// Normalized Discounted Cumulative Gain of the predicted order.
///
/// Items are ranked by `y_pred` and gain their true rating; the result is
/// divided by the DCG of the ideal (true-rating) order. An ideal DCG of
/// zero yields 0.
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input, or a
/// negative true rating.
///
/// # Examples
///
/// ```
/// use recobook::metrics::ranking::ndcg;
///
/// let y_true = [5.0, 3.0, 1.0];
/// assert!((ndcg(&[0.9, 0.5, 0.1], &y_true).unwrap() - 1.0).abs() < 1e-6);
/// assert!(ndcg(&[0.1, 0.5, 0.9], &y_true).unwrap() < 1.0);
/// ```
pub fn ndcg(y_pred: &[f32], y_true: &[f32]) -> Result<f32> {
    check_pair(y_pred, y_true)?;
    if let Some(negative) = y_true.iter().find(|&&t| t < 0.0) {
        return Err(RecommendError::invalid_input(format!(
            "NDCG relevance must be non-negative, got {negative}"
        )));
    }

    let gains: Vec<f32> = stable_descending_order(y_pred)
        .into_iter()
        .map(|i| y_true[i])
        .collect();

    let mut ideal = y_true.to_vec();
    ideal.sort_by(|a, b| b.total_cmp(a));
    let idcg = dcg(&ideal);

    if idcg == 0.0 {
        Ok(0.0)
    } else {
        Ok(dcg(&gains) / idcg)
    }
}

/// Permutation-agreement reciprocal rank.
///
/// Walks the items in predicted order and averages `1 / (r + 1)`, where
/// `r` is the item's position in the true-rating order. Because every
/// true position appears exactly once, the value depends only on the list
/// length: it is the harmonic number `H(n) / n`, whatever the predictions.
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input.
///
/// # Examples
///
/// ```
/// use recobook::metrics::ranking::permutation_mrr;
///
/// let mrr = permutation_mrr(&[5.0, 3.0, 1.0], &[5.0, 3.0, 1.0]).unwrap();
/// assert!((mrr - (1.0 + 0.5 + 1.0 / 3.0) / 3.0).abs() < 1e-6);
/// ```
pub fn permutation_mrr(y_pred: &[f32], y_true: &[f32]) -> Result<f32> {
    check_pair(y_pred, y_true)?;
    let n = y_true.len();

    let mut true_rank = vec![0usize; n];
    for (position, item) in stable_descending_order(y_true).into_iter().enumerate() {
        true_rank[item] = position;
    }

    let total: f32 = stable_descending_order(y_pred)
        .into_iter()
        .map(|item| 1.0 / (true_rank[item] as f32 + 1.0))
        .sum();

    Ok(total / n as f32)
}

/// Label-ranking average precision of one sample.
///
/// For each relevant label `j`, precision is the fraction of labels scored
/// at least `scores[j]` that are relevant; the result averages these over
/// the relevant labels. Ties count as ranked above. A sample with no
/// relevant labels, or only relevant ones, scores 1.0.
///
/// # Errors
///
/// Returns `InvalidInput` if the inputs differ in length or are empty.
pub fn label_ranking_average_precision(relevant: &[bool], scores: &[f32]) -> Result<f32> {
    if relevant.len() != scores.len() || scores.is_empty() {
        return Err(RecommendError::invalid_input(format!(
            "relevance and scores must be non-empty with same length ({} vs {})",
            relevant.len(),
            scores.len()
        )));
    }

    let n_relevant = relevant.iter().filter(|&&r| r).count();
    if n_relevant == 0 || n_relevant == relevant.len() {
        return Ok(1.0);
    }

    let total: f32 = relevant
        .iter()
        .zip(scores)
        .filter(|&(&r, _)| r)
        .map(|(_, &s_j)| {
            let rank = scores.iter().filter(|&&s_k| s_k >= s_j).count();
            let relevant_above = relevant
                .iter()
                .zip(scores)
                .filter(|&(&r, &s_k)| r && s_k >= s_j)
                .count();
            relevant_above as f32 / rank as f32
        })
        .sum();

    Ok(total / n_relevant as f32)
}

/// Marks the first `cutoff` positions of a ranking as relevant.
fn top_positions(order: &[usize], cutoff: usize) -> Vec<bool> {
    let mut relevant = vec![false; order.len()];
    for &item in order.iter().take(cutoff) {
        relevant[item] = true;
    }
    relevant
}

/// Mean average precision of the binarized top of both rankings.
///
/// The top `n * cutoff_percent / 100` items (integer division) of the
/// true-rating order are the relevant labels; the top of the predicted
/// order, as 0/1 scores, is the ranking evaluated against them with
/// [`label_ranking_average_precision`].
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input, and
/// `InvalidHyperparameter` for a cutoff above 100 percent.
///
/// # Examples
///
/// ```
/// use recobook::metrics::ranking::top_percent_map;
///
/// let y_true = [5.0, 4.0, 3.0, 2.0, 1.0];
/// assert_eq!(top_percent_map(&y_true, &y_true, 20).unwrap(), 1.0);
/// ```
pub fn top_percent_map(y_pred: &[f32], y_true: &[f32], cutoff_percent: usize) -> Result<f32> {
    check_pair(y_pred, y_true)?;
    if cutoff_percent > 100 {
        return Err(RecommendError::invalid_hyperparameter(
            "cutoff_percent",
            cutoff_percent,
            "<= 100",
        ));
    }

    let cutoff = y_true.len() * cutoff_percent / 100;
    let ideal = top_positions(&stable_descending_order(y_true), cutoff);
    let predicted: Vec<f32> = top_positions(&stable_descending_order(y_pred), cutoff)
        .into_iter()
        .map(|r| if r { 1.0 } else { 0.0 })
        .collect();

    label_ranking_average_precision(&ideal, &predicted)
}
