// =========================================================================
// FALSIFY-MR: regression metrics contract (MSE, RMSE, MAE)
//
// References:
//   - Willmott & Matsuura (2005) "Advantages of the mean absolute error
//     (MAE) over the root mean square error (RMSE)"
// =========================================================================

use super::*;

/// FALSIFY-MR-001: All errors are 0.0 for identical sequences
#[test]
fn falsify_mr_001_zero_for_identical() {
    let y = [1.0, 2.5, 3.0, 4.0, 5.0];

    for (name, value) in [
        ("mse", mse(&y, &y)),
        ("rmse", rmse(&y, &y)),
        ("mae", mae(&y, &y)),
    ] {
        let value = value.expect("valid input");
        assert_eq!(value, 0.0, "FALSIFIED MR-001: {name}={value} for identical input");
    }
}

/// FALSIFY-MR-002: RMSE ≥ MAE
#[test]
fn falsify_mr_002_rmse_dominates_mae() {
    let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y_pred = [1.5, 2.0, 2.0, 4.5, 1.0];

    let r = rmse(&y_pred, &y_true).expect("valid input");
    let m = mae(&y_pred, &y_true).expect("valid input");
    assert!(r >= m, "FALSIFIED MR-002: rmse={r} < mae={m}");
}

/// FALSIFY-MR-003: RMSE is the square root of MSE, taken once
#[test]
fn falsify_mr_003_rmse_is_sqrt_mse() {
    let y_true = [3.0, 4.0, 5.0];
    let y_pred = [1.0, 4.0, 5.0];

    // MSE = 4/3
    let m = mse(&y_pred, &y_true).expect("valid input");
    let r = rmse(&y_pred, &y_true).expect("valid input");
    assert!((m - 4.0 / 3.0).abs() < 1e-6);
    assert!(
        (r - (4.0f32 / 3.0).sqrt()).abs() < 1e-6,
        "FALSIFIED MR-003: rmse={r}, expected sqrt(4/3)"
    );
}

/// FALSIFY-MR-004: MAE of a constant offset is the offset
#[test]
fn falsify_mr_004_mae_constant_offset() {
    let y_true = [1.0, 2.0, 3.0];
    let y_pred = [1.5, 2.5, 3.5];
    let m = mae(&y_pred, &y_true).expect("valid input");
    assert!((m - 0.5).abs() < 1e-6, "FALSIFIED MR-004: mae={m}, expected 0.5");
}

/// FALSIFY-MR-005: Empty, mismatched and non-finite input fail explicitly
#[test]
fn falsify_mr_005_invalid_input() {
    use crate::error::RecommendError;

    let cases: [(&[f32], &[f32]); 4] = [
        (&[], &[]),
        (&[1.0], &[1.0, 2.0]),
        (&[f32::NAN], &[1.0]),
        (&[1.0], &[f32::INFINITY]),
    ];
    for (y_pred, y_true) in cases {
        for result in [mse(y_pred, y_true), rmse(y_pred, y_true), mae(y_pred, y_true)] {
            assert!(
                matches!(result, Err(RecommendError::InvalidInput { .. })),
                "FALSIFIED MR-005: {result:?} for {y_pred:?} vs {y_true:?}"
            );
        }
    }
}

mod mr_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-MR-002-prop: RMSE ≥ MAE for any predictions
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        #[test]
        fn falsify_mr_002_prop_rmse_dominates_mae(
            n in 1..=20usize,
            seed in 0..500u32,
        ) {
            let y_true: Vec<f32> = (0..n)
                .map(|i| ((i as f32 + seed as f32) * 0.37).sin() * 2.0 + 3.0)
                .collect();
            let y_pred: Vec<f32> = (0..n)
                .map(|i| ((i as f32 + seed as f32 + 1.0) * 0.53).cos() * 2.5 + 3.0)
                .collect();
            let r = rmse(&y_pred, &y_true).expect("valid input");
            let m = mae(&y_pred, &y_true).expect("valid input");
            prop_assert!(
                r >= m - 1e-5,
                "FALSIFIED MR-002-prop: rmse={} < mae={}",
                r, m
            );
        }
    }
}
