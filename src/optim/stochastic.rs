//! Stochastic optimizers for mini-batch gradient descent.

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

use super::Optimizer;

/// Adam (Adaptive Moment Estimation) optimizer.
///
/// Update rules, with coupled L2 weight decay `λ`:
///
/// ```text
/// g_t = ∇f(θ) + λ * θ
/// m_t = β₁ * m_{t-1} + (1 - β₁) * g_t
/// v_t = β₂ * v_{t-1} + (1 - β₂) * g_t²
/// m̂_t = m_t / (1 - β₁^t)
/// v̂_t = v_t / (1 - β₂^t)
/// θ_t = θ_{t-1} - α * m̂_t / (√v̂_t + ε)
/// ```
///
/// # Example
///
/// ```
/// use recobook::optim::{Adam, Optimizer};
///
/// let mut optimizer = Adam::new(0.01).with_weight_decay(0.01);
///
/// let mut params = vec![1.0, 2.0];
/// let gradients = vec![0.1, 0.2];
///
/// optimizer.step(&mut params, &gradients).unwrap();
/// assert_eq!(optimizer.steps(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adam {
    /// Learning rate (step size)
    learning_rate: f32,
    /// Exponential decay rate for first moment estimates (default: 0.9)
    beta1: f32,
    /// Exponential decay rate for second moment estimates (default: 0.999)
    beta2: f32,
    /// Small constant for numerical stability (default: 1e-8)
    epsilon: f32,
    /// L2 penalty coefficient added to the gradient (default: 0.0)
    weight_decay: f32,
    /// First moment estimates (mean)
    m: Vec<f32>,
    /// Second moment estimates (uncentered variance)
    v: Vec<f32>,
    /// Number of steps taken (for bias correction)
    t: usize,
}

impl Adam {
    /// Creates an Adam optimizer with default betas and no weight decay.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay: 0.0,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    /// Sets β₁.
    #[must_use]
    pub fn with_beta1(mut self, beta1: f32) -> Self {
        self.beta1 = beta1;
        self
    }

    /// Sets β₂.
    #[must_use]
    pub fn with_beta2(mut self, beta2: f32) -> Self {
        self.beta2 = beta2;
        self
    }

    /// Sets ε.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the L2 weight decay coefficient.
    #[must_use]
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Returns β₁.
    #[must_use]
    pub fn beta1(&self) -> f32 {
        self.beta1
    }

    /// Returns β₂.
    #[must_use]
    pub fn beta2(&self) -> f32 {
        self.beta2
    }

    /// Returns ε.
    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Returns the weight decay coefficient.
    #[must_use]
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    /// Number of steps taken since creation or the last reset.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [f32], gradients: &[f32]) -> Result<()> {
        if params.len() != gradients.len() {
            return Err(RecommendError::invalid_input(format!(
                "parameters and gradients must have same length ({} vs {})",
                params.len(),
                gradients.len()
            )));
        }

        let n = params.len();
        if self.m.len() != n {
            self.m = vec![0.0; n];
            self.v = vec![0.0; n];
        }

        self.t += 1;
        let t = self.t as i32;
        let bias_correction1 = 1.0 - self.beta1.powi(t);
        let bias_correction2 = 1.0 - self.beta2.powi(t);

        for i in 0..n {
            let g = gradients[i] + self.weight_decay * params[i];

            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;

            let m_hat = self.m[i] / bias_correction1;
            let v_hat = self.v[i] / bias_correction2;

            params[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }
}

#[cfg(test)]
#[path = "stochastic_tests.rs"]
mod tests;
