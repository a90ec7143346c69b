use super::common::adf_critical_values;
use super::common::choose_lag_for_adf;
use super::common::fit_adf;
use super::common::schwert_max_lags;
use super::common::validate_alpha;
use super::common::validate_series;
use super::common::CriticalValues;
use super::common::DeterministicTerm;
use super::common::LagSelection;
use crate::error::Result;
use crate::error::TsError;

/// Configuration for the Augmented Dickey-Fuller unit-root test.
#[derive(Debug, Clone, Copy)]
pub struct ADFConfig {
  /// Deterministic terms included in the test regression.
  pub deterministic: DeterministicTerm,
  /// Lag-order selection strategy.
  pub lag_selection: LagSelection,
  /// Maximum lag considered by automatic lag selection.
  pub max_lags: Option<usize>,
  /// Significance level used to compute `reject_unit_root`.
  pub alpha: f64,
}

impl Default for ADFConfig {
  fn default() -> Self {
    Self {
      deterministic: DeterministicTerm::Constant,
      lag_selection: LagSelection::Aic,
      max_lags: None,
      alpha: 0.05,
    }
  }
}

/// Result of the Augmented Dickey-Fuller test.
#[derive(Debug, Clone, Copy)]
pub struct ADFResult {
  /// ADF t-statistic for the lagged level coefficient.
  pub statistic: f64,
  /// Selected lag order.
  pub used_lags: usize,
  /// Number of regression observations used by the fitted model.
  pub nobs: usize,
  /// Critical values at 1%, 5%, 10% levels.
  pub critical_values: CriticalValues,
  /// Whether the null (unit root) is rejected at `alpha`.
  pub reject_unit_root: bool,
}

/// Augmented Dickey-Fuller unit-root test.
///
/// # Errors
/// Non-finite or too-short series, invalid `alpha`, a fixed lag that the
/// sample cannot support, or a singular test regression.
pub fn adf_test(y: &[f64], cfg: ADFConfig) -> Result<ADFResult> {
  validate_series(y, 20)?;
  validate_alpha(cfg.alpha)?;

  let max_possible_lag = y.len().saturating_sub(5);
  let max_lags = cfg
    .max_lags
    .unwrap_or_else(|| schwert_max_lags(y.len()))
    .min(max_possible_lag);

  let used_lags = match cfg.lag_selection {
    LagSelection::Fixed(p) if p > max_possible_lag => {
      return Err(TsError::LagOutOfRange {
        lag: p,
        len: y.len(),
      })
    }
    LagSelection::Fixed(p) => p,
    _ => choose_lag_for_adf(y, cfg.deterministic, cfg.lag_selection, max_lags)?,
  };

  let fit = fit_adf(y, used_lags, cfg.deterministic)?;
  let critical_values = adf_critical_values(cfg.deterministic);
  let reject_unit_root = fit.statistic < critical_values.value_at(cfg.alpha);

  Ok(ADFResult {
    statistic: fit.statistic,
    used_lags: fit.lag,
    nobs: fit.nobs,
    critical_values,
    reject_unit_root,
  })
}

#[cfg(test)]
mod tests {
  use super::adf_test;
  use super::ADFConfig;
  use crate::simulate::ArimaProcess;
  use crate::simulate::ArmaProcess;
  use crate::stats::stationarity::common::DeterministicTerm;
  use crate::stats::stationarity::common::LagSelection;
  use crate::traits::ProcessExt;

  #[test]
  fn adf_rejects_stationary_ar1() {
    let x = ArmaProcess::new(vec![0.7], vec![], 1.0, 2400, Some(11)).sample();
    let cfg = ADFConfig {
      deterministic: DeterministicTerm::Constant,
      lag_selection: LagSelection::Fixed(4),
      ..ADFConfig::default()
    };
    let res = adf_test(x.as_slice().unwrap(), cfg).unwrap();
    assert!(
      res.reject_unit_root,
      "expected unit-root rejection, got {res:?}"
    );
  }

  #[test]
  fn adf_keeps_unit_root_for_random_walk() {
    let x = ArimaProcess::new(vec![], vec![], 1, 1.0, 2400, Some(12)).sample();
    let res = adf_test(x.as_slice().unwrap(), ADFConfig::default()).unwrap();
    assert!(
      !res.reject_unit_root,
      "expected no rejection for random walk, got {res:?}"
    );
  }

  #[test]
  fn adf_rejects_short_series() {
    assert!(adf_test(&[1.0; 10], ADFConfig::default()).is_err());
  }
}
