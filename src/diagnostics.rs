//! # Diagnostics
//!
//! $$
//! Q=n(n+2)\sum_{k=1}^{h}\frac{\hat\rho_k^2}{n-k}\ \sim\ \chi^2_{h-m},\qquad
//! \mathrm{RMSE}=\sqrt{\tfrac1n\textstyle\sum\varepsilon_t^2}
//! $$
//!
use statrs::distribution::ChiSquared;
use statrs::distribution::ContinuousCDF;

use crate::correlation::acf;
use crate::correlation::is_constant;
use crate::error::Result;
use crate::error::TsError;

/// Configuration of the Ljung-Box test.
#[derive(Debug, Clone, Copy)]
pub struct LjungBoxConfig {
  /// Autocorrelation lags included. If `None`, `min(10, n/5)`.
  pub lags: Option<usize>,
  /// Significance level used to compute `white_noise`.
  pub alpha: f64,
  /// Fitted ARMA coefficients subtracted from the degrees of freedom.
  pub fitted_params: usize,
}

impl Default for LjungBoxConfig {
  fn default() -> Self {
    Self {
      lags: None,
      alpha: 0.05,
      fitted_params: 0,
    }
  }
}

/// Result of the Ljung-Box test.
#[derive(Debug, Clone, Copy)]
pub struct LjungBoxResult {
  /// Q statistic.
  pub statistic: f64,
  pub p_value: f64,
  /// Chi-square quantile at `1 - alpha`.
  pub critical_value: f64,
  pub lags: usize,
  pub df: usize,
  /// Whether the white-noise null survives at `alpha`.
  pub white_noise: bool,
}

/// Ljung-Box portmanteau test for residual autocorrelation.
///
/// # Errors
/// Fewer than three residuals, `alpha` outside `(0, 1)`, or a lag count not
/// below the residual count.
pub fn ljung_box(residuals: &[f64], cfg: LjungBoxConfig) -> Result<LjungBoxResult> {
  let n = residuals.len();
  if n < 3 {
    return Err(TsError::InsufficientData { needed: 3, got: n });
  }
  if !(cfg.alpha > 0.0 && cfg.alpha < 1.0) {
    return Err(TsError::InvalidArgument("alpha must be in (0, 1)".into()));
  }
  let lags = cfg.lags.unwrap_or_else(|| 10.min(n / 5)).max(1);
  if lags >= n {
    return Err(TsError::LagOutOfRange { lag: lags, len: n });
  }
  let df = lags.saturating_sub(cfg.fitted_params).max(1);
  let chi2 = ChiSquared::new(df as f64)
    .map_err(|e| TsError::InvalidArgument(e.to_string()))?;
  let critical_value = chi2.inverse_cdf(1.0 - cfg.alpha);

  // Zero residuals carry no autocorrelation.
  let statistic = if is_constant(residuals) {
    0.0
  } else {
    let rho = acf(residuals, lags)?;
    let n_f = n as f64;
    n_f
      * (n_f + 2.0)
      * (1..=lags)
        .map(|k| rho[k] * rho[k] / (n - k) as f64)
        .sum::<f64>()
  };
  let p_value = 1.0 - chi2.cdf(statistic);

  Ok(LjungBoxResult {
    statistic,
    p_value,
    critical_value,
    lags,
    df,
    white_noise: statistic <= critical_value,
  })
}

/// Root mean square of `errors`.
pub fn rmse(errors: &[f64]) -> Result<f64> {
  if errors.is_empty() {
    return Err(TsError::EmptySeries);
  }
  Ok((errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64).sqrt())
}

/// Root mean square of `forecast - actual`.
pub fn rmsfe(forecast: &[f64], actual: &[f64]) -> Result<f64> {
  if forecast.len() != actual.len() {
    return Err(TsError::InvalidArgument(format!(
      "{} forecasts for {} actual values",
      forecast.len(),
      actual.len()
    )));
  }
  let errors: Vec<f64> = forecast.iter().zip(actual).map(|(f, a)| f - a).collect();
  rmse(&errors)
}

/// Share of steps where the predicted change from `previous` has the sign
/// of the actual change.
pub fn directional_accuracy(previous: &[f64], actual: &[f64], predicted: &[f64]) -> Result<f64> {
  if previous.len() != actual.len() || actual.len() != predicted.len() {
    return Err(TsError::InvalidArgument(
      "directional accuracy needs equally long inputs".into(),
    ));
  }
  if actual.is_empty() {
    return Err(TsError::InsufficientData { needed: 1, got: 0 });
  }
  let hits = previous
    .iter()
    .zip(actual)
    .zip(predicted)
    .filter(|((prev, a), p)| sign(*a - *prev) == sign(*p - *prev))
    .count();
  Ok(hits as f64 / actual.len() as f64)
}

fn sign(x: f64) -> i8 {
  if x > 0.0 {
    1
  } else if x < 0.0 {
    -1
  } else {
    0
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::directional_accuracy;
  use super::ljung_box;
  use super::rmse;
  use super::rmsfe;
  use super::LjungBoxConfig;
  use crate::simulate::ArmaProcess;
  use crate::traits::ProcessExt;

  #[test]
  fn white_noise_passes() {
    let e = ArmaProcess::new(vec![], vec![], 1.0, 500, Some(61)).sample();
    let res = ljung_box(e.as_slice().unwrap(), LjungBoxConfig::default()).unwrap();
    assert_eq!(res.lags, 10);
    assert!(res.white_noise, "{res:?}");
    assert!(res.p_value > 0.05);
  }

  #[test]
  fn autocorrelated_series_fails() {
    let x = ArmaProcess::new(vec![0.6], vec![], 1.0, 500, Some(62)).sample();
    let res = ljung_box(x.as_slice().unwrap(), LjungBoxConfig::default()).unwrap();
    assert!(!res.white_noise, "{res:?}");
    assert!(res.statistic > res.critical_value);
  }

  #[test]
  fn fitted_params_reduce_degrees_of_freedom() {
    let e = ArmaProcess::new(vec![], vec![], 1.0, 200, Some(63)).sample();
    let cfg = LjungBoxConfig {
      lags: Some(8),
      fitted_params: 3,
      ..LjungBoxConfig::default()
    };
    assert_eq!(ljung_box(e.as_slice().unwrap(), cfg).unwrap().df, 5);
  }

  #[test]
  fn constant_residuals_are_white_noise() {
    let res = ljung_box(&[0.0; 30], LjungBoxConfig::default()).unwrap();
    assert_eq!(res.statistic, 0.0);
    assert!(res.white_noise);
  }

  #[test]
  fn error_metrics() {
    assert_abs_diff_eq!(rmse(&[3.0, -4.0]).unwrap(), (12.5f64).sqrt());
    assert_abs_diff_eq!(rmsfe(&[1.0, 2.0], &[1.0, 4.0]).unwrap(), 2.0f64.sqrt());
    assert!(rmsfe(&[1.0], &[1.0, 2.0]).is_err());
    assert!(rmse(&[]).is_err());
  }

  #[test]
  fn direction_hits_are_counted() {
    let previous = [1.0, 2.0, 3.0, 2.0];
    let actual = [2.0, 3.0, 2.0, 2.5];
    let predicted = [1.5, 1.0, 2.5, 3.0];
    assert_abs_diff_eq!(
      directional_accuracy(&previous, &actual, &predicted).unwrap(),
      0.75
    );
  }
}
