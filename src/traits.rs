//! # Traits
//!
//! $$
//! \mathcal M:\ x_{1:n}\mapsto\hat\theta,\qquad \mathcal P:\ \theta\mapsto x_{1:n}
//! $$
//!
use rayon::prelude::*;

use crate::error::Result;

/// A model that can be estimated from data it owns.
pub trait ModelExt {
  type Output;

  /// Estimate the model, replacing any previous estimate on success.
  fn fit(&mut self) -> Result<Self::Output>;

  /// Log-likelihood of the last successful fit.
  fn log_lik(&self) -> Result<f64>;

  /// Estimated coefficients of the last successful fit.
  fn params(&self) -> Result<&[f64]>;
}

/// A stochastic process that can generate sample paths.
pub trait ProcessExt: Send + Sync {
  type Output: Send;

  fn sample(&self) -> Self::Output;

  fn sample_par(&self, m: usize) -> Vec<Self::Output> {
    (0..m).into_par_iter().map(|_| self.sample()).collect()
  }
}
