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

/// SARIMA(p, d, q)(P, D, Q)_s process with additive seasonal lags
///
/// \[
///   (1 - B)^d (1 - B^s)^D X_t = W_t,\quad
///   W_t = \sum_k \phi_k W_{t-k} + \sum_k \Phi_k W_{t-ks}
///       + \epsilon_t + \sum_k \theta_k \epsilon_{t-k} + \sum_k \Theta_k \epsilon_{t-ks}
/// \]
#[derive(ImplNew, Debug, Clone)]
pub struct SarimaProcess {
  pub phi: Vec<f64>,
  pub theta: Vec<f64>,
  /// Seasonal AR coefficients, lags `s, 2s, ..`
  pub seasonal_phi: Vec<f64>,
  /// Seasonal MA coefficients, lags `s, 2s, ..`
  pub seasonal_theta: Vec<f64>,
  pub d: usize,
  pub seasonal_d: usize,
  /// Season length
  pub period: usize,
  pub sigma: f64,
  pub n: usize,
  pub seed: Option<u64>,
}

fn seasonal_lags(coefs: &[f64], period: usize) -> Vec<(usize, f64)> {
  coefs
    .iter()
    .enumerate()
    .map(|(i, &c)| ((i + 1) * period, c))
    .collect()
}

impl SarimaProcess {
  fn sample_seeded(&self, seed: Option<u64>) -> Array1<f64> {
    let period = self.period.max(1);
    let mut ar = nonseasonal_lags(&self.phi);
    ar.extend(seasonal_lags(&self.seasonal_phi, period));
    let mut ma = nonseasonal_lags(&self.theta);
    ma.extend(seasonal_lags(&self.seasonal_theta, period));

    let burn_in = BURN_IN + 10 * period;
    let mut rng = rng(seed);
    let noise = innovations(&mut rng, self.n + burn_in, self.sigma);
    let mut x = drop_burn_in(arma_filter(&ar, &ma, &noise), self.n);
    for _ in 0..self.seasonal_d {
      x = integrate_at(&x, period);
    }
    for _ in 0..self.d {
      x = integrate_at(&x, 1);
    }
    x
  }
}

impl ProcessExt for SarimaProcess {
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
  use super::SarimaProcess;
  use crate::correlation::acf;
  use crate::traits::ProcessExt;

  #[test]
  fn seasonal_ar_shows_up_at_the_seasonal_lag() {
    let x = SarimaProcess::new(vec![], vec![], vec![0.8], vec![], 0, 0, 12, 1.0, 3000, Some(2)).sample();
    let rho = acf(x.as_slice().unwrap(), 12).unwrap();
    assert!(rho[12] > 0.6, "{rho:?}");
    assert!(rho[1].abs() < 0.1, "{rho:?}");
  }
}
