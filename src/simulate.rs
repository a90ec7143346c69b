//! # Simulate
//!
//! $$
//! \Phi(B^s)\phi(B)(1-B)^d(1-B^s)^D(1-B)^{\delta}X_t=\Theta(B^s)\theta(B)\varepsilon_t,
//! \qquad \varepsilon_t\sim\mathcal N(0,\sigma^2)
//! $$
//!
//! Seeded sample-path generators for the model family, used to build
//! reproducible test data and benchmarks.
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::StandardNormal;

pub mod arfima;
pub mod arima;
pub mod arma;
pub mod sarima;

pub use arfima::ArfimaProcess;
pub use arima::ArimaProcess;
pub use arma::ArmaProcess;
pub use sarima::SarimaProcess;

/// Observations discarded at the start of every path.
pub(crate) const BURN_IN: usize = 200;

pub(crate) fn rng(seed: Option<u64>) -> StdRng {
  match seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  }
}

/// Seed for the `i`-th path of a parallel batch.
pub(crate) fn path_seed(seed: Option<u64>, i: usize) -> Option<u64> {
  seed.map(|s| s.wrapping_add(i as u64))
}

pub(crate) fn innovations<R: Rng + ?Sized>(rng: &mut R, n: usize, sigma: f64) -> Array1<f64> {
  Array1::from_iter((0..n).map(|_| sigma * rng.sample::<f64, _>(StandardNormal)))
}

/// ARMA recursion over explicit lag lists:
/// `x_t = Σ φ_k x_{t-lag_k} + ε_t + Σ θ_k ε_{t-lag_k}`, with zero pre-sample values.
pub(crate) fn arma_filter(
  ar: &[(usize, f64)],
  ma: &[(usize, f64)],
  noise: &Array1<f64>,
) -> Array1<f64> {
  let n = noise.len();
  let mut x = Array1::<f64>::zeros(n);
  for t in 0..n {
    let mut val = noise[t];
    for &(k, phi) in ar {
      if t >= k {
        val += phi * x[t - k];
      }
    }
    for &(k, theta) in ma {
      if t >= k {
        val += theta * noise[t - k];
      }
    }
    x[t] = val;
  }
  x
}

pub(crate) fn nonseasonal_lags(coefs: &[f64]) -> Vec<(usize, f64)> {
  coefs.iter().enumerate().map(|(i, &c)| (i + 1, c)).collect()
}

/// Inverse of `(1 - B^period)`, with the first `period` values taken as-is.
pub(crate) fn integrate_at(y: &Array1<f64>, period: usize) -> Array1<f64> {
  let mut x = y.clone();
  for t in period..x.len() {
    x[t] = x[t - period] + y[t];
  }
  x
}

pub(crate) fn drop_burn_in(x: Array1<f64>, n: usize) -> Array1<f64> {
  let skip = x.len().saturating_sub(n);
  x.slice_move(ndarray::s![skip..])
}
