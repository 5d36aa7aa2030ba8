//! Collaborative-filtering rating prediction and recommendation.
//!
//! # Components
//!
//! - [`MatrixFactorization`]: latent-factor rating predictor in four
//!   [`ModelVariant`]s (plain, bias, category, sentiment)
//! - [`Trainer`]: mini-batch Adam training on squared error
//! - [`Recommender`]: top-K item ranking per user
//!
//! # Quick Start
//!
//! ```
//! use recobook::data::Interaction;
//! use recobook::preprocessing::InteractionIndexer;
//! use recobook::recommend::{
//!     FactorizationConfig, MatrixFactorization, Recommender, Trainer, TrainerConfig,
//! };
//!
//! let reviews = vec![
//!     Interaction::new("ann", "0451526341", 5.0),
//!     Interaction::new("ann", "0140449132", 3.0),
//!     Interaction::new("bob", "0140449132", 4.0),
//!     Interaction::new("bob", "0679783261", 2.0),
//! ];
//! let indexer = InteractionIndexer::fit(&reviews);
//! let train = indexer.transform(&reviews).expect("indexed by the same corpus");
//!
//! let mut model =
//!     MatrixFactorization::from_indexer(&indexer, FactorizationConfig::default().with_seed(0))
//!         .expect("valid config");
//! Trainer::new(TrainerConfig::default().with_epochs(5).with_seed(0))
//!     .fit(&mut model, &train)
//!     .expect("valid training data");
//!
//! let items: Vec<usize> = (0..indexer.items().len()).collect();
//! let top = Recommender::new(&model).top_k(0, &items, 2).expect("known user");
//! assert_eq!(top.len(), 2);
//! ```

mod embedding;
mod factorization;
mod recommender;
mod trainer;

pub use embedding::EmbeddingTable;
pub use factorization::{
    FactorizationConfig, FeatureIndices, MatrixFactorization, ModelVariant, TableSizes,
};
pub use recommender::{Recommender, UserRecommendations};
pub use trainer::{Trainer, TrainerConfig, TrainingHistory};
