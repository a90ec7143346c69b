//! # Fractional
//!
//! $$
//! \ln I(\lambda_j)=c-d\,\ln\!\left(4\sin^2\tfrac{\lambda_j}{2}\right)+u_j,
//! \qquad
//! \mathbb E\!\left[R/S\right]_w\propto w^{H},\ d=H-\tfrac12
//! $$
//!
use linreg::linear_regression;

use super::spectral::periodogram;
use super::spectral::PeriodogramConfig;
use crate::error::Result;
use crate::error::TsError;

/// Estimator of the long-memory parameter `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FractionalEstimator {
  /// Geweke-Porter-Hudak log-periodogram regression.
  #[default]
  LogPeriodogram,
  /// Hurst rescaled-range analysis, `d = H - 1/2`.
  RescaledRange,
}

impl FractionalEstimator {
  pub fn estimate(self, x: &[f64]) -> Result<f64> {
    match self {
      FractionalEstimator::LogPeriodogram => gph_estimate(x, None),
      FractionalEstimator::RescaledRange => rescaled_range_estimate(x),
    }
  }
}

fn regression_slope(xs: &[f64], ys: &[f64]) -> Result<f64> {
  if xs.len() < 3 {
    return Err(TsError::InsufficientData {
      needed: 3,
      got: xs.len(),
    });
  }
  let (slope, _): (f64, f64) = linear_regression(xs, ys).map_err(|_| TsError::SingularMatrix)?;
  if slope.is_finite() {
    Ok(slope)
  } else {
    Err(TsError::SingularMatrix)
  }
}

/// Log-periodogram estimate of `d` over the first `bandwidth` Fourier
/// frequencies (default `⌊n^0.5⌋`).
pub fn gph_estimate(x: &[f64], bandwidth: Option<usize>) -> Result<f64> {
  if x.len() < 16 {
    return Err(TsError::InsufficientData {
      needed: 16,
      got: x.len(),
    });
  }
  let pg = periodogram(x, PeriodogramConfig::default())?;
  let m = bandwidth
    .unwrap_or_else(|| (x.len() as f64).sqrt().floor() as usize)
    .min(pg.spectrum.len() - 1);

  let mut regressors = Vec::with_capacity(m);
  let mut responses = Vec::with_capacity(m);
  for j in 1..=m {
    let power = pg.spectrum[j];
    if !(power > 0.0) {
      continue;
    }
    let lambda = 2.0 * std::f64::consts::PI * pg.frequencies[j];
    regressors.push((4.0 * (lambda / 2.0).sin().powi(2)).ln());
    responses.push(power.ln());
  }

  Ok(-regression_slope(&regressors, &responses)?)
}

fn rescaled_range(block: &[f64]) -> Option<f64> {
  let n = block.len() as f64;
  let mean = block.iter().sum::<f64>() / n;
  let mut cum = 0.0;
  let mut lo = 0.0_f64;
  let mut hi = 0.0_f64;
  let mut ss = 0.0;
  for v in block {
    let dev = v - mean;
    cum += dev;
    lo = lo.min(cum);
    hi = hi.max(cum);
    ss += dev * dev;
  }
  let sd = (ss / n).sqrt();
  if sd > 0.0 {
    Some((hi - lo) / sd)
  } else {
    None
  }
}

/// Rescaled-range estimate of `d` from the Hurst exponent.
pub fn rescaled_range_estimate(x: &[f64]) -> Result<f64> {
  let n = x.len();
  if n < 32 {
    return Err(TsError::InsufficientData { needed: 32, got: n });
  }

  let mut sizes = Vec::new();
  let mut w = 8usize;
  while w <= n / 2 {
    sizes.push(w);
    w = ((w as f64) * 1.5).ceil() as usize;
  }

  let mut log_w = Vec::with_capacity(sizes.len());
  let mut log_rs = Vec::with_capacity(sizes.len());
  for w in sizes {
    let values: Vec<f64> = x.chunks_exact(w).filter_map(rescaled_range).collect();
    if values.is_empty() {
      continue;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    if avg > 0.0 {
      log_w.push((w as f64).ln());
      log_rs.push(avg.ln());
    }
  }

  Ok(regression_slope(&log_w, &log_rs)? - 0.5)
}
