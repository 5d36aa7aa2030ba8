// =========================================================================
// FALSIFY-MC: classification metrics contract over rounded ratings
//
// References:
//   - Sokolova & Lapalme (2009) "A systematic analysis of performance measures"
// =========================================================================

use super::*;
use crate::error::RecommendError;

/// FALSIFY-MC-001: Precision, recall, F1 ∈ [0, 1] under every average
#[test]
fn falsify_mc_001_scores_bounded() {
    let y_true = [1.0, 2.0, 3.0, 4.0, 5.0, 5.0];
    let y_pred = [1.0, 3.0, 3.0, 5.0, 4.0, 5.0];

    for average in [Average::Macro, Average::Micro, Average::Weighted] {
        let s = precision_recall_f1(&y_pred, &y_true, average).expect("valid input");
        for (name, v) in [("precision", s.precision), ("recall", s.recall), ("f1", s.f1)] {
            assert!(
                (0.0..=1.0).contains(&v),
                "FALSIFIED MC-001: {name}={v} not in [0, 1] for {average:?}"
            );
        }
    }
}

/// FALSIFY-MC-002: Perfect predictions score 1.0
#[test]
fn falsify_mc_002_perfect() {
    let y = [1.0, 2.0, 2.0, 5.0];
    let s = precision_recall_f1_macro(&y, &y).expect("valid input");
    assert!(
        (s.precision - 1.0).abs() < 1e-6 && (s.recall - 1.0).abs() < 1e-6 && (s.f1 - 1.0).abs() < 1e-6,
        "FALSIFIED MC-002: {s:?} for perfect predictions"
    );
}

/// FALSIFY-MC-003: Predicted-only classes join the label set and score 0
#[test]
fn falsify_mc_003_label_union() {
    // class 3 is only predicted, class 5 is only true
    let y_true = [4.0, 5.0];
    let y_pred = [4.0, 3.0];
    let s = precision_recall_f1(&y_pred, &y_true, Average::Macro).expect("valid input");

    // classes {3, 4, 5}: only class 4 scores, with P = R = F1 = 1
    assert!(
        (s.precision - 1.0 / 3.0).abs() < 1e-6,
        "FALSIFIED MC-003: macro precision={}, expected 1/3",
        s.precision
    );
    assert!((s.recall - 1.0 / 3.0).abs() < 1e-6);
    assert!((s.f1 - 1.0 / 3.0).abs() < 1e-6);
}

/// FALSIFY-MC-004: Macro F1 is the mean of per-class F1
#[test]
fn falsify_mc_004_macro_f1_mean_of_classes() {
    let y_true = [1.0, 1.0, 2.0, 2.0];
    let y_pred = [1.0, 2.0, 2.0, 2.0];
    let s = precision_recall_f1(&y_pred, &y_true, Average::Macro).expect("valid input");

    // class 1: P=1, R=1/2, F1=2/3; class 2: P=2/3, R=1, F1=4/5
    let expected = (2.0 / 3.0 + 4.0 / 5.0) / 2.0;
    assert!(
        (s.f1 - expected).abs() < 1e-6,
        "FALSIFIED MC-004: macro f1={}, expected {expected}",
        s.f1
    );
    assert!((s.precision - 5.0 / 6.0).abs() < 1e-6);
    assert!((s.recall - 0.75).abs() < 1e-6);
}

/// FALSIFY-MC-005: Micro precision equals accuracy for single-label input
#[test]
fn falsify_mc_005_micro_is_accuracy() {
    let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y_pred = [1.0, 2.0, 4.0, 4.0, 1.0];
    let s = precision_recall_f1(&y_pred, &y_true, Average::Micro).expect("valid input");
    assert!((s.precision - 0.6).abs() < 1e-6);
    assert!((s.recall - 0.6).abs() < 1e-6);
}

/// FALSIFY-MC-006: Weighted average uses true-class support
#[test]
fn falsify_mc_006_weighted_by_support() {
    let y_true = [1.0, 1.0, 1.0, 2.0];
    let y_pred = [1.0, 1.0, 1.0, 1.0];
    let s = precision_recall_f1(&y_pred, &y_true, Average::Weighted).expect("valid input");
    // class 1: R=1 (weight 3/4); class 2: R=0 (weight 1/4)
    assert!((s.recall - 0.75).abs() < 1e-6);
}

/// FALSIFY-MC-007: Rounding is half-to-even
#[test]
fn falsify_mc_007_round_half_even() {
    assert_eq!(round_rating(2.5), 2.0);
    assert_eq!(round_rating(3.5), 4.0);
    assert_eq!(round_rating(4.49), 4.0);
    assert_eq!(round_rating(-0.4), 0.0);
    assert!(round_rating(-0.4).is_sign_positive());
}

/// FALSIFY-MC-008: Continuous predictions are rounded before comparison
#[test]
fn falsify_mc_008_macro_rounds_predictions() {
    let y_true = [2.0, 4.0, 5.0];
    let y_pred = [2.4, 3.6, 4.5];
    // rounds to [2, 4, 4]
    let s = precision_recall_f1_macro(&y_pred, &y_true).expect("valid input");
    let direct = precision_recall_f1(&[2.0, 4.0, 4.0], &y_true, Average::Macro).expect("valid input");
    assert_eq!(s, direct);
}

/// FALSIFY-MC-009: Empty and mismatched input are rejected
#[test]
fn falsify_mc_009_invalid_input() {
    assert!(matches!(
        precision_recall_f1_macro(&[], &[]),
        Err(RecommendError::InvalidInput { .. })
    ));
    assert!(matches!(
        precision_recall_f1_macro(&[1.0], &[1.0, 2.0]),
        Err(RecommendError::InvalidInput { .. })
    ));
    assert!(matches!(
        precision_recall_f1_macro(&[f32::NAN], &[1.0]),
        Err(RecommendError::InvalidInput { .. })
    ));
}
