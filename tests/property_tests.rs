//! Property-based tests using proptest.
//!
//! These tests verify invariants of the indexer, predictor, metrics and
//! recommender.

use recobook::metrics::ranking::{ndcg, permutation_mrr, stable_descending_order};
use recobook::model_selection::{train_test_split, SplitConfig};
use recobook::preprocessing::IndexMapping;
use recobook::prelude::*;
use proptest::prelude::*;

// Strategy for generating rating sequences on the 1-5 scale
fn ratings_strategy(len: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(1.0f32..=5.0, len)
}

// Strategy for generating identifier lists with duplicates
fn ids_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-e][0-9]", 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Indexer properties
    #[test]
    fn index_mapping_is_bijective(ids in ids_strategy()) {
        let mapping = IndexMapping::from_values(ids.clone());

        for id in &ids {
            let index = mapping.to_index(id.as_str()).expect("seen id");
            prop_assert!(index < mapping.len());
            prop_assert_eq!(mapping.from_index(index).expect("in range"), id);
        }
        for index in 0..mapping.len() {
            let id = mapping.from_index(index).expect("in range");
            prop_assert_eq!(mapping.to_index(id.as_str()).expect("seen id"), index);
        }
    }

    #[test]
    fn index_mapping_has_no_gaps(ids in ids_strategy()) {
        let mapping = IndexMapping::from_values(ids.clone());
        let mut distinct = ids.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(mapping.len(), distinct.len());
        prop_assert!(mapping.from_index(mapping.len()).is_err());
    }

    // Predictor properties
    #[test]
    fn predictions_stay_in_range(
        seed in 0u64..1000,
        y_min in -2.0f32..1.0,
        width in 0.5f32..6.0,
        user in 0usize..4,
        item in 0usize..5,
    ) {
        let y_max = y_min + width;
        for variant in ModelVariant::ALL {
            let config = FactorizationConfig::default()
                .with_n_factors(3)
                .with_variant(variant)
                .with_y_range(y_min, y_max)
                .with_seed(seed);
            let model = MatrixFactorization::new(TableSizes::new(4, 5).with_categories(3), config)
                .expect("valid config");
            let indices = FeatureIndices::new(user, item)
                .with_category((user + item) % 3)
                .with_sentiment(item % 4);
            let p = model.predict(&indices).expect("valid indices");
            prop_assert!(p >= y_min && p <= y_max, "{:?}: {} outside [{}, {}]", variant, p, y_min, y_max);
        }
    }

    // Metric properties
    #[test]
    fn rmse_dominates_mae(y_true in ratings_strategy(12), y_pred in ratings_strategy(12)) {
        let r = rmse(&y_pred, &y_true).expect("valid input");
        let m = mae(&y_pred, &y_true).expect("valid input");
        prop_assert!(r >= m - 1e-5, "rmse {} < mae {}", r, m);
    }

    #[test]
    fn errors_vanish_for_identical_input(y in ratings_strategy(8)) {
        prop_assert_eq!(rmse(&y, &y).expect("valid input"), 0.0);
        prop_assert_eq!(mae(&y, &y).expect("valid input"), 0.0);
    }

    #[test]
    fn ndcg_is_one_for_true_order(y_true in ratings_strategy(10)) {
        // any strictly increasing map of the truth preserves its order
        let y_pred: Vec<f32> = y_true.iter().map(|t| 2.0 * t + 1.0).collect();
        let score = ndcg(&y_pred, &y_true).expect("valid input");
        prop_assert!((score - 1.0).abs() < 1e-5, "ndcg {}", score);
    }

    #[test]
    fn permutation_mrr_is_harmonic_mean(y_true in ratings_strategy(9), y_pred in ratings_strategy(9)) {
        let expected: f32 = (1..=9).map(|r| 1.0 / r as f32).sum::<f32>() / 9.0;
        let mrr = permutation_mrr(&y_pred, &y_true).expect("valid input");
        prop_assert!((mrr - expected).abs() < 1e-5);
    }

    #[test]
    fn stable_order_is_a_permutation(scores in ratings_strategy(15)) {
        let mut order = stable_descending_order(&scores);
        prop_assert!(order.windows(2).all(|w| scores[w[0]] >= scores[w[1]]));
        order.sort_unstable();
        prop_assert_eq!(order, (0..15).collect::<Vec<_>>());
    }

    // Split properties
    #[test]
    fn split_partitions_records(n in 2usize..100, fraction in 0.05f32..0.95, seed in 0u64..100) {
        let records: Vec<usize> = (0..n).collect();
        let config = SplitConfig::default().with_test_fraction(fraction).with_seed(seed);
        match train_test_split(&records, &config) {
            Ok((train, test)) => {
                prop_assert_eq!(train.len() + test.len(), n);
                let mut all: Vec<usize> = train.into_iter().chain(test).collect();
                all.sort_unstable();
                prop_assert_eq!(all, records);
            }
            // rounding up can leave no training records
            Err(err) => {
                let rejected = matches!(err, RecommendError::InvalidInput { .. });
                prop_assert!(rejected, "unexpected error {:?}", err);
            }
        }
    }

    // Recommender properties
    #[test]
    fn top_k_is_sorted_and_bounded(seed in 0u64..500, k in 0usize..12, n_items in 1usize..10) {
        let model = MatrixFactorization::new(
            TableSizes::new(2, n_items),
            FactorizationConfig::default().with_seed(seed),
        )
        .expect("valid config");
        let items: Vec<usize> = (0..n_items).collect();

        let scored = Recommender::new(&model).top_k_scored(1, &items, k).expect("valid rows");
        prop_assert_eq!(scored.len(), k.min(n_items));
        prop_assert!(scored.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
