//! Evaluation metrics for rating predictors.
//!
//! Includes regression metrics (MSE, RMSE, MAE), classification metrics
//! over rounded ratings (precision, recall, F1), ranking metrics (NDCG,
//! permutation MRR, top-percent MAP), and the [`evaluate`] battery that
//! collects them into a [`PerformanceRecord`].
//!
//! All metrics take `(y_pred, y_true)` and reject empty, mismatched or
//! non-finite input with `InvalidInput`.

pub mod classification;
pub mod evaluator;
pub mod ranking;

pub use evaluator::{evaluate, EvaluationConfig, PerformanceLog, PerformanceRecord};

use crate::error::{RecommendError, Result};

/// Checks that both sequences are non-empty, equally long and finite.
pub(crate) fn check_pair(y_pred: &[f32], y_true: &[f32]) -> Result<()> {
    if y_pred.len() != y_true.len() {
        return Err(RecommendError::invalid_input(format!(
            "predictions and targets must have same length ({} vs {})",
            y_pred.len(),
            y_true.len()
        )));
    }
    if y_true.is_empty() {
        return Err(RecommendError::invalid_input("cannot evaluate an empty split"));
    }
    if let Some(value) = y_pred.iter().chain(y_true).find(|v| !v.is_finite()) {
        return Err(RecommendError::invalid_input(format!(
            "ratings must be finite, got {value}"
        )));
    }
    Ok(())
}

/// Computes the Mean Squared Error (MSE).
///
/// MSE = (1/n) * `Σ(y_true` - `y_pred)²`
///
/// # Examples
///
/// ```
/// use recobook::metrics::mse;
///
/// let y_true = [3.0, 4.0, 2.0, 5.0];
/// let y_pred = [2.5, 4.0, 2.0, 4.0];
/// let error = mse(&y_pred, &y_true).unwrap();
/// assert!((error - 0.3125).abs() < 1e-6);
/// ```
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input.
pub fn mse(y_pred: &[f32], y_true: &[f32]) -> Result<f32> {
    check_pair(y_pred, y_true)?;

    let sum_sq_error: f32 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    Ok(sum_sq_error / y_true.len() as f32)
}

/// Computes the Root Mean Squared Error (RMSE).
///
/// RMSE = √MSE
///
/// # Examples
///
/// ```
/// use recobook::metrics::rmse;
///
/// let y_true = [3.0, 4.0];
/// let y_pred = [1.0, 4.0];
/// let error = rmse(&y_pred, &y_true).unwrap();
/// assert!((error - 2.0f32.sqrt()).abs() < 1e-6);
/// ```
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input.
pub fn rmse(y_pred: &[f32], y_true: &[f32]) -> Result<f32> {
    mse(y_pred, y_true).map(f32::sqrt)
}

/// Computes the Mean Absolute Error (MAE).
///
/// MAE = (1/n) * `Σ|y_true` - `y_pred`|
///
/// # Errors
///
/// Returns `InvalidInput` for empty, mismatched or non-finite input.
pub fn mae(y_pred: &[f32], y_true: &[f32]) -> Result<f32> {
    check_pair(y_pred, y_true)?;

    let sum_abs_error: f32 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum();

    Ok(sum_abs_error / y_true.len() as f32)
}

#[cfg(test)]
#[path = "tests_regression_contract.rs"]
mod tests_regression_contract;

#[cfg(test)]
#[path = "tests_ranking_contract.rs"]
mod tests_ranking_contract;
