use impl_new_derive::ImplNew;
use ndarray::Array1;
use rayon::prelude::*;

use super::arma_filter;
use super::drop_burn_in;
use super::innovations;
use super::integrate_at;
use super::nonseasonal_lags;
use super::path_seed;
use super::rng;
use super::BURN_IN;
use crate::traits::ProcessExt;

/// ARIMA(p, d, q) process
///
/// \[
///   \phi(B)\,(1 - B)^d X_t = \theta(B)\,\epsilon_t
/// \]
///
/// The ARMA core is generated first and integrated `d` times.
#[derive(ImplNew, Debug, Clone)]
pub struct ArimaProcess {
  pub phi: Vec<f64>,
  pub theta: Vec<f64>,
  /// Integration order
  pub d: usize,
  pub sigma: f64,
  pub n: usize,
  pub seed: Option<u64>,
}

impl ArimaProcess {
  fn sample_seeded(&self, seed: Option<u64>) -> Array1<f64> {
    let mut rng = rng(seed);
    let noise = innovations(&mut rng, self.n + BURN_IN, self.sigma);
    let core = arma_filter(
      &nonseasonal_lags(&self.phi),
      &nonseasonal_lags(&self.theta),
      &noise,
    );
    let mut x = drop_burn_in(core, self.n);
    for _ in 0..self.d {
      x = integrate_at(&x, 1);
    }
    x
  }
}

impl ProcessExt for ArimaProcess {
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
  use super::ArimaProcess;
  use crate::simulate::ArmaProcess;
  use crate::traits::ProcessExt;
  use crate::transform::difference_at;

  #[test]
  fn differencing_recovers_the_arma_core() {
    let core = ArmaProcess::new(vec![0.4], vec![], 1.0, 300, Some(8)).sample();
    let x = ArimaProcess::new(vec![0.4], vec![], 1, 1.0, 300, Some(8)).sample();
    let dx = difference_at(x.as_slice().unwrap(), 1, 1);
    for (a, b) in dx.iter().zip(core.iter().skip(1)) {
      assert!((a - b).abs() < 1e-9);
    }
  }
}
