use impl_new_derive::ImplNew;
use ndarray::Array1;
use rayon::prelude::*;

use super::arma_filter;
use super::drop_burn_in;
use super::innovations;
use super::nonseasonal_lags;
use super::path_seed;
use super::rng;
use super::BURN_IN;
use crate::traits::ProcessExt;

/// Stationary ARMA(p, q) process
///
/// \[
///   X_t = \sum_{k=1}^p \phi_k X_{t-k} + \epsilon_t + \sum_{k=1}^q \theta_k \epsilon_{t-k}
/// \]
#[derive(ImplNew, Debug, Clone)]
pub struct ArmaProcess {
  /// AR coefficients (\(\phi_1,\dots,\phi_p\))
  pub phi: Vec<f64>,
  /// MA coefficients (\(\theta_1,\dots,\theta_q\))
  pub theta: Vec<f64>,
  /// Innovation std dev
  pub sigma: f64,
  /// Path length
  pub n: usize,
  /// Seed for reproducible paths
  pub seed: Option<u64>,
}

impl ArmaProcess {
  fn sample_seeded(&self, seed: Option<u64>) -> Array1<f64> {
    let mut rng = rng(seed);
    let noise = innovations(&mut rng, self.n + BURN_IN, self.sigma);
    let x = arma_filter(
      &nonseasonal_lags(&self.phi),
      &nonseasonal_lags(&self.theta),
      &noise,
    );
    drop_burn_in(x, self.n)
  }
}

impl ProcessExt for ArmaProcess {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    self.sample_seeded(self.seed)
  }

  fn sample_par(&self, m: usize) -> Vec<Self::Output> {
    (0..m)
      .into_par_iter()
      .map(|i| self.sample_seeded(path_seed(self.seed, i)))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::ArmaProcess;
  use crate::traits::ProcessExt;

  #[test]
  fn seeded_paths_are_reproducible() {
    let p = ArmaProcess::new(vec![0.5], vec![0.3], 1.0, 100, Some(1));
    assert_eq!(p.sample(), p.sample());
    assert_eq!(p.sample().len(), 100);
  }

  #[test]
  fn parallel_paths_differ() {
    let p = ArmaProcess::new(vec![0.5], vec![], 1.0, 50, Some(3));
    let paths = p.sample_par(3);
    assert_eq!(paths.len(), 3);
    assert_ne!(paths[0], paths[1]);
    assert_eq!(paths[0], p.sample());
  }

  #[test]
  fn sample_variance_matches_ar1() {
    let x = ArmaProcess::new(vec![0.5], vec![], 1.0, 20000, Some(4)).sample();
    let mean = x.mean().unwrap();
    let var = x.mapv(|v| (v - mean).powi(2)).mean().unwrap();
    // 1 / (1 - 0.25)
    assert!((var - 4.0 / 3.0).abs() < 0.1, "var = {var}");
  }
}
