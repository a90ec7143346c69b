//! # Correlation
//!
//! $$
//! \rho_k=\frac{\sum_{t=k}^{n-1}(x_t-\bar x)(x_{t-k}-\bar x)}{\sum_{t=0}^{n-1}(x_t-\bar x)^2},
//! \qquad
//! \phi_{kk}=\frac{\rho_k-\sum_{j=1}^{k-1}\phi_{k-1,j}\rho_{k-j}}{1-\sum_{j=1}^{k-1}\phi_{k-1,j}\rho_j}
//! $$
//!
use ndarray::Array1;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::error::Result;
use crate::error::TsError;

fn check_lag(series: &[f64], max_lag: usize) -> Result<()> {
  if series.is_empty() {
    return Err(TsError::EmptySeries);
  }
  if max_lag >= series.len() {
    return Err(TsError::LagOutOfRange {
      lag: max_lag,
      len: series.len(),
    });
  }
  Ok(())
}

/// Whether the centred sum of squares `c0` is negligible relative to the
/// magnitude of the observations.
fn is_degenerate(series: &[f64], c0: f64) -> bool {
  let magnitude = series.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
  c0 <= series.len() as f64 * (1e-12 * magnitude).powi(2)
}

/// Whether `series` is (numerically) constant.
pub fn is_constant(series: &[f64]) -> bool {
  if series.is_empty() {
    return true;
  }
  let mean = series.iter().sum::<f64>() / series.len() as f64;
  let c0: f64 = series.iter().map(|x| (x - mean).powi(2)).sum();
  is_degenerate(series, c0)
}

/// Sample autocorrelations at lags `0..=max_lag` using the full-sample mean.
///
/// # Errors
/// `LagOutOfRange` when `max_lag >= series.len()`, `ConstantSeries` when the
/// series has no variance.
pub fn acf(series: &[f64], max_lag: usize) -> Result<Array1<f64>> {
  check_lag(series, max_lag)?;
  let n = series.len();
  let mean = series.iter().sum::<f64>() / n as f64;
  let centered: Vec<f64> = series.iter().map(|x| x - mean).collect();
  let c0: f64 = centered.iter().map(|x| x * x).sum();
  if is_degenerate(series, c0) {
    return Err(TsError::ConstantSeries);
  }

  let mut out = Array1::<f64>::zeros(max_lag + 1);
  out[0] = 1.0;
  for k in 1..=max_lag {
    let ck: f64 = centered
      .iter()
      .skip(k)
      .zip(centered.iter())
      .map(|(a, b)| a * b)
      .sum();
    out[k] = ck / c0;
  }
  Ok(out)
}

/// Partial autocorrelations at lags `0..=max_lag` via the Durbin-Levinson recursion.
pub fn pacf(series: &[f64], max_lag: usize) -> Result<Array1<f64>> {
  let rho = acf(series, max_lag)?;
  Ok(durbin_levinson(rho.as_slice().unwrap_or_default()))
}

/// Partial autocorrelations from an autocorrelation sequence starting at lag 0.
pub fn durbin_levinson(rho: &[f64]) -> Array1<f64> {
  let max_lag = rho.len().saturating_sub(1);
  let mut out = Array1::<f64>::zeros(rho.len());
  if rho.is_empty() {
    return out;
  }
  out[0] = 1.0;

  let mut phi_prev: Vec<f64> = Vec::with_capacity(max_lag);
  let mut v: f64 = 1.0;
  for k in 1..=max_lag {
    let num = rho[k]
      - phi_prev
        .iter()
        .enumerate()
        .map(|(j, p)| p * rho[k - 1 - j])
        .sum::<f64>();
    let phi_kk = if v.abs() > f64::EPSILON { num / v } else { 0.0 };

    let mut phi = Vec::with_capacity(k);
    for j in 0..k - 1 {
      phi.push(phi_prev[j] - phi_kk * phi_prev[k - 2 - j]);
    }
    phi.push(phi_kk);

    v *= 1.0 - phi_kk * phi_kk;
    out[k] = phi_kk;
    phi_prev = phi;
  }
  out
}

/// Two-sided `1 - alpha` band `±z/√n` under the white-noise null.
pub fn significance_bound(n: usize, alpha: f64) -> Result<f64> {
  if !(alpha > 0.0 && alpha < 1.0) {
    return Err(TsError::InvalidArgument("alpha must be in (0, 1)".into()));
  }
  if n == 0 {
    return Err(TsError::EmptySeries);
  }
  let normal = Normal::new(0.0, 1.0).map_err(|e| TsError::InvalidArgument(e.to_string()))?;
  Ok(normal.inverse_cdf(1.0 - alpha / 2.0) / (n as f64).sqrt())
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::acf;
  use super::pacf;
  use super::significance_bound;
  use crate::error::TsError;
  use crate::simulate::ArmaProcess;
  use crate::traits::ProcessExt;

  #[test]
  fn lag_zero_is_one() {
    let x = [0.3, -1.2, 2.5, 0.1, 0.9, -0.4];
    let r = acf(&x, 3).unwrap();
    assert_eq!(r.len(), 4);
    assert_abs_diff_eq!(r[0], 1.0);
    let p = pacf(&x, 3).unwrap();
    assert_abs_diff_eq!(p[0], 1.0);
    assert_abs_diff_eq!(p[1], r[1], epsilon = 1e-12);
  }

  #[test]
  fn max_lag_must_be_below_length() {
    let x = [1.0, 2.0, 3.0];
    assert_eq!(
      acf(&x, 3).unwrap_err(),
      TsError::LagOutOfRange { lag: 3, len: 3 }
    );
    assert!(pacf(&x, 5).is_err());
  }

  #[test]
  fn constant_series_is_degenerate() {
    assert_eq!(acf(&[2.0; 8], 2).unwrap_err(), TsError::ConstantSeries);
  }

  #[test]
  fn pacf_cuts_off_after_ar_order() {
    let x = ArmaProcess::new(vec![0.6, -0.3], vec![], 1.0, 5000, Some(7)).sample();
    let p = pacf(x.as_slice().unwrap(), 10).unwrap();
    assert!(p[1] > 0.35, "{p:?}");
    assert_abs_diff_eq!(p[2], -0.3, epsilon = 0.06);
    for k in 3..=10 {
      assert!(p[k].abs() < 0.06, "lag {k}: {}", p[k]);
    }
  }

  #[test]
  fn band_shrinks_with_sample_size() {
    let b100 = significance_bound(100, 0.05).unwrap();
    assert_abs_diff_eq!(b100, 0.196, epsilon = 1e-3);
    assert!(significance_bound(400, 0.05).unwrap() < b100);
    assert!(significance_bound(100, 1.5).is_err());
  }
}
