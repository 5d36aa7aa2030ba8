// =========================================================================
// FALSIFY-RK: ranking metrics contract (NDCG, permutation MRR, top-% MAP)
//
// References:
//   - Jarvelin & Kekalainen (2002) "Cumulated gain-based evaluation of IR"
//   - Tsoumakas et al. (2010) "Mining multi-label data" (label ranking AP)
// =========================================================================

use crate::error::RecommendError;
use crate::metrics::ranking::*;

/// FALSIFY-RK-001: Stable order breaks ties by original position
#[test]
fn falsify_rk_001_stable_ties() {
    let order = stable_descending_order(&[1.0, 3.0, 1.0, 3.0, 2.0]);
    assert_eq!(
        order,
        vec![1, 3, 4, 0, 2],
        "FALSIFIED RK-001: ties not kept in input order"
    );
}

/// FALSIFY-RK-002: NDCG = 1.0 when predicted order matches true order
#[test]
fn falsify_rk_002_ndcg_perfect() {
    let y_true = [5.0, 1.0, 4.0, 3.0, 2.0];
    let y_pred = [4.9, 0.3, 4.1, 3.3, 2.0];
    let score = ndcg(&y_pred, &y_true).expect("valid input");
    assert!(
        (score - 1.0).abs() < 1e-6,
        "FALSIFIED RK-002: NDCG={score} for matching order, expected 1.0"
    );
}

/// FALSIFY-RK-003: NDCG of a swapped pair uses the log2(i + 2) discount
#[test]
fn falsify_rk_003_ndcg_hand_computed() {
    let score = ndcg(&[0.1, 0.9], &[1.0, 0.0]).expect("valid input");
    let expected = 1.0 / 3.0f32.log2();
    assert!(
        (score - expected).abs() < 1e-6,
        "FALSIFIED RK-003: NDCG={score}, expected {expected}"
    );
}

/// FALSIFY-RK-004: NDCG is in [0, 1]
#[test]
fn falsify_rk_004_ndcg_bounded() {
    let y_true = [3.0, 2.0, 3.0, 0.0, 1.0, 2.0];
    let y_pred = [0.5, 4.0, 1.0, 5.0, 2.0, 0.0];
    let score = ndcg(&y_pred, &y_true).expect("valid input");
    assert!(
        (0.0..=1.0001).contains(&score),
        "FALSIFIED RK-004: NDCG={score}, expected in [0,1]"
    );
}

/// FALSIFY-RK-005: NDCG edge cases: zero ideal gain, negative gain, single item
#[test]
fn falsify_rk_005_ndcg_edges() {
    assert_eq!(ndcg(&[1.0, 2.0], &[0.0, 0.0]).expect("valid input"), 0.0);
    assert!(matches!(
        ndcg(&[1.0, 2.0], &[-1.0, 2.0]),
        Err(RecommendError::InvalidInput { .. })
    ));
    assert_eq!(ndcg(&[3.0], &[4.0]).expect("valid input"), 1.0);
}

/// FALSIFY-RK-006: Permutation MRR of a matching 3-item order
#[test]
fn falsify_rk_006_mrr_hand_computed() {
    let mrr = permutation_mrr(&[5.0, 3.0, 1.0], &[5.0, 3.0, 1.0]).expect("valid input");
    let expected = (1.0 + 1.0 / 2.0 + 1.0 / 3.0) / 3.0;
    assert!(
        (mrr - expected).abs() < 1e-6,
        "FALSIFIED RK-006: MRR={mrr}, expected {expected} (≈0.6111)"
    );
}

/// FALSIFY-RK-007: Permutation MRR is H(n)/n for any prediction order
#[test]
fn falsify_rk_007_mrr_independent_of_predictions() {
    let y_true = [4.0, 2.0, 5.0, 1.0];
    let harmonic: f32 = (1..=4).map(|r| 1.0 / r as f32).sum::<f32>() / 4.0;
    for y_pred in [[1.0, 2.0, 3.0, 4.0], [4.0, 3.0, 2.0, 1.0], [0.0, 0.0, 0.0, 0.0]] {
        let mrr = permutation_mrr(&y_pred, &y_true).expect("valid input");
        assert!(
            (mrr - harmonic).abs() < 1e-6,
            "FALSIFIED RK-007: MRR={mrr} for {y_pred:?}, expected {harmonic}"
        );
    }
}

/// FALSIFY-RK-008: Top-20% MAP of identical 5-item rankings is 1.0
#[test]
fn falsify_rk_008_map_identical() {
    let y = [5.0, 4.0, 3.0, 2.0, 1.0];
    let map = top_percent_map(&y, &y, 20).expect("valid input");
    assert!(
        (map - 1.0).abs() < 1e-6,
        "FALSIFIED RK-008: MAP={map}, expected 1.0"
    );
}

/// FALSIFY-RK-009: Top-20% MAP of reversed 10-item rankings
#[test]
fn falsify_rk_009_map_reversed() {
    let y_true: Vec<f32> = (0..10).map(|i| 10.0 - i as f32).collect();
    let y_pred: Vec<f32> = (0..10).map(|i| i as f32).collect();
    // both relevant items score 0 and tie with all ten labels
    let map = top_percent_map(&y_pred, &y_true, 20).expect("valid input");
    assert!(
        (map - 0.2).abs() < 1e-6,
        "FALSIFIED RK-009: MAP={map}, expected 0.2"
    );
}

/// FALSIFY-RK-010: A cutoff selecting nothing scores 1.0
#[test]
fn falsify_rk_010_map_empty_cutoff() {
    // 4 * 20 / 100 = 0 relevant items
    let map = top_percent_map(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0], 20).expect("valid input");
    assert_eq!(map, 1.0);
    assert!(matches!(
        top_percent_map(&[1.0], &[1.0], 101),
        Err(RecommendError::InvalidHyperparameter { .. })
    ));
}

/// FALSIFY-RK-011: Label ranking AP counts ties as ranked above
#[test]
fn falsify_rk_011_lrap_hand_computed() {
    let ap = label_ranking_average_precision(&[true, false, true], &[0.9, 0.8, 0.1]).expect("valid input");
    // label 0: 1/1, label 2: 2/3
    assert!((ap - 5.0 / 6.0).abs() < 1e-6, "FALSIFIED RK-011: LRAP={ap}");

    let tied = label_ranking_average_precision(&[true, false], &[0.5, 0.5]).expect("valid input");
    assert!((tied - 0.5).abs() < 1e-6, "FALSIFIED RK-011: tied LRAP={tied}");
}

mod rk_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-RK-004-prop: NDCG in [0, 1] for random relevance
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn falsify_rk_004_prop_ndcg_bounded(
            n in 1..=12usize,
            seed in 0..500u32,
        ) {
            let y_true: Vec<f32> = (0..n)
                .map(|i| (((i as f32 + seed as f32) * 0.37).sin().abs() * 5.0).floor())
                .collect();
            let y_pred: Vec<f32> = (0..n)
                .map(|i| ((i as f32 * 1.7 + seed as f32) * 0.29).cos() * 3.0)
                .collect();

            let score = ndcg(&y_pred, &y_true).expect("valid input");
            prop_assert!(
                (-0.001..=1.001).contains(&score),
                "FALSIFIED RK-004-prop: NDCG={} not in [0,1]",
                score
            );
        }
    }

    /// FALSIFY-RK-008-prop: MAP of a ranking against itself is 1.0
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn falsify_rk_008_prop_map_reflexive(
            n in 1..=30usize,
            seed in 0..500u32,
            cutoff in 0..=100usize,
        ) {
            let y: Vec<f32> = (0..n)
                .map(|i| ((i as f32 + seed as f32) * 0.37).sin() * 2.0 + 3.0)
                .collect();
            let map = top_percent_map(&y, &y, cutoff).expect("valid input");
            prop_assert!(
                (map - 1.0).abs() < 1e-6,
                "FALSIFIED RK-008-prop: MAP={} for identical rankings",
                map
            );
        }
    }
}
