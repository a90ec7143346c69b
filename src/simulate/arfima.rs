use impl_new_derive::ImplNew;
use ndarray::Array1;
use rayon::prelude::*;

use super::arma_filter;
use super::drop_burn_in;
use super::innovations;
use super::nonseasonal_lags;
use super::path_seed;
use super::rng;
use crate::traits::ProcessExt;
use crate::transform::fractional_weights;

/// Observations discarded so the truncated fractional filter settles.
const FRACTIONAL_BURN_IN: usize = 1000;

/// ARFIMA(p, d, q) process with `-1/2 < d < 1/2`
///
/// \[
///   \phi(B)\,(1 - B)^d X_t = \theta(B)\,\epsilon_t,\qquad
///   X_t = \sum_{k\ge0}\psi_k U_{t-k},\ \psi_k=\psi_{k-1}\frac{k-1+d}{k}
/// \]
#[derive(ImplNew, Debug, Clone)]
pub struct ArfimaProcess {
  pub phi: Vec<f64>,
  /// Fractional integration order
  pub d: f64,
  pub theta: Vec<f64>,
  pub sigma: f64,
  pub n: usize,
  pub seed: Option<u64>,
}

impl ArfimaProcess {
  fn sample_seeded(&self, seed: Option<u64>) -> Array1<f64> {
    let len = self.n + FRACTIONAL_BURN_IN;
    let mut rng = rng(seed);
    let noise = innovations(&mut rng, len, self.sigma);
    let u = arma_filter(
      &nonseasonal_lags(&self.phi),
      &nonseasonal_lags(&self.theta),
      &noise,
    );

    let psi = fractional_weights(-self.d, len);
    let x = Array1::from_iter((0..len).map(|t| {
      psi
        .iter()
        .take(t + 1)
        .enumerate()
        .map(|(k, w)| w * u[t - k])
        .sum::<f64>()
    }));
    drop_burn_in(x, self.n)
  }
}

impl ProcessExt for ArfimaProcess {
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
  use super::ArfimaProcess;
  use crate::correlation::acf;
  use crate::traits::ProcessExt;

  #[test]
  fn long_memory_decays_slowly() {
    let x = ArfimaProcess::new(vec![], 0.4, vec![], 1.0, 4000, Some(6)).sample();
    let rho = acf(x.as_slice().unwrap(), 20).unwrap();
    // rho(1) = d / (1 - d) for pure fractional noise
    assert!(rho[1] > 0.45, "{}", rho[1]);
    assert!(rho[20] > 0.1, "{}", rho[20]);
  }
}
