//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use recobook::prelude::*;
//! ```

pub use crate::data::{filter_by_user_activity, Interaction, SentimentCategory};
pub use crate::error::{RecommendError, Result};
pub use crate::metrics::{evaluate, mae, mse, rmse, EvaluationConfig, PerformanceLog, PerformanceRecord};
pub use crate::model_selection::{train_test_split, SplitConfig};
pub use crate::optim::{Adam, Optimizer};
pub use crate::preprocessing::{IndexedInteraction, InteractionIndexer};
pub use crate::recommend::{
    FactorizationConfig, FeatureIndices, MatrixFactorization, ModelVariant, Recommender,
    TableSizes, Trainer, TrainerConfig,
};
