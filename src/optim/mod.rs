//! Optimization algorithms for gradient-based learning.
//!
//! # Available Optimizers
//!
//! - [`Adam`] - Adaptive Moment Estimation with optional L2 weight decay
//!
//! Stochastic optimizers update parameters incrementally using mini-batch
//! gradients through [`Optimizer::step`]:
//!
//! ```
//! use recobook::optim::{Adam, Optimizer};
//!
//! let mut optimizer = Adam::new(0.01);
//! let mut params = vec![1.0, 2.0, 3.0];
//! let gradients = vec![0.1, 0.2, 0.3];
//!
//! optimizer.step(&mut params, &gradients).unwrap();
//! assert!(params[0] < 1.0);
//! ```

mod stochastic;

pub use stochastic::Adam;

use crate::error::Result;

/// Stochastic optimizer over a flat parameter buffer.
///
/// One instance owns the optimizer state (moments, step count) for one
/// parameter buffer; call `step` with the same buffer every time.
pub trait Optimizer {
    /// Updates `params` in place from the current mini-batch gradient.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `params` and `gradients` differ in length.
    fn step(&mut self, params: &mut [f32], gradients: &[f32]) -> Result<()>;

    /// Resets the optimizer state.
    fn reset(&mut self);
}
