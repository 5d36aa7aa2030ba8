//! Recobook: embedding-based collaborative filtering for book reviews.
//!
//! Recobook predicts a user's rating of a book from learned latent factors,
//! optionally enriched with the book's category and the review's sentiment,
//! evaluates the predictions with regression, classification and ranking
//! metrics, and turns a trained model into per-user top-K recommendations.
//!
//! # Quick Start
//!
//! ```
//! use recobook::prelude::*;
//!
//! let reviews = vec![
//!     Interaction::new("u1", "b1", 5.0).with_category("Fiction"),
//!     Interaction::new("u1", "b2", 3.0).with_category("History"),
//!     Interaction::new("u2", "b2", 4.0).with_category("History"),
//!     Interaction::new("u2", "b3", 2.0),
//!     Interaction::new("u3", "b1", 4.0).with_category("Fiction"),
//!     Interaction::new("u3", "b3", 1.0),
//! ];
//!
//! // Index identifiers, then hold out part of the data
//! let indexer = InteractionIndexer::fit(&reviews);
//! let indexed = indexer.transform(&reviews).unwrap();
//! let (train, test) = train_test_split(&indexed, &SplitConfig::default().with_seed(42)).unwrap();
//!
//! // Train the category-aware variant
//! let config = FactorizationConfig::default()
//!     .with_variant(ModelVariant::Category)
//!     .with_seed(42);
//! let mut model = MatrixFactorization::from_indexer(&indexer, config).unwrap();
//! let trainer = Trainer::new(TrainerConfig::default().with_epochs(10).with_seed(42));
//! trainer.fit(&mut model, &train).unwrap();
//!
//! // Evaluate on the held-out split
//! let y_pred = model.predict_batch(&test).unwrap();
//! let y_true: Vec<f32> = test.iter().map(|r| r.rating).collect();
//! let record = evaluate("fc_with_category", &y_pred, &y_true, &EvaluationConfig::default()).unwrap();
//! assert_eq!(record.model_name, "fc_with_category");
//! ```
//!
//! # Modules
//!
//! - [`data`]: Interaction records, sentiment levels, activity filtering
//! - [`preprocessing`]: Identifier-to-index mappings
//! - [`model_selection`]: Train/held-out splitting
//! - [`optim`]: Optimization algorithms (Adam)
//! - [`recommend`]: Rating predictor, trainer and top-K recommender
//! - [`metrics`]: Evaluation metrics and the performance log

pub mod data;
pub mod error;
pub mod metrics;
pub mod model_selection;
pub mod optim;
pub mod prelude;
pub mod preprocessing;
pub mod recommend;

pub use error::{RecommendError, Result};
