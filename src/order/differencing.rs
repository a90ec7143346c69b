use tracing::debug;

use crate::correlation::is_constant;
use crate::error::Result;
use crate::error::TsError;
use crate::stats::stationarity::adf::adf_test;
use crate::stats::stationarity::adf::ADFConfig;
use crate::stats::stationarity::common::short_bandwidth_lags;
use crate::stats::stationarity::kpss::kpss_test;
use crate::stats::stationarity::kpss::KPSSConfig;
use crate::stats::stationarity::kpss::KPSSTrend;
use crate::stats::stationarity::DeterministicTerm;
use crate::stats::stationarity::LagSelection;
use crate::transform::difference_at;

/// Differencing is kept when it shrinks the variance below this share.
pub const VARIANCE_RATIO_THRESHOLD: f64 = 0.5;

/// Shortest series handed to the unit-root and KPSS tests.
const MIN_TEST_LENGTH: usize = 20;

/// Criterion deciding whether a series needs another difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferencingTest {
  /// KPSS test with the short Newey-West bandwidth; rejection means
  /// difference again.
  Kpss { trend: KPSSTrend },
  /// Augmented Dickey-Fuller; failure to reject a unit root means difference again.
  Adf {
    deterministic: DeterministicTerm,
    lag_selection: LagSelection,
  },
  /// Difference while it cuts the sample variance by more than half.
  VarianceRatio,
}

impl Default for DifferencingTest {
  fn default() -> Self {
    Self::kpss()
  }
}

fn variance(x: &[f64]) -> f64 {
  let n = x.len() as f64;
  let mean = x.iter().sum::<f64>() / n;
  x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

fn variance_ratio_stationary(x: &[f64]) -> bool {
  let dx = difference_at(x, 1, 1);
  if dx.len() < 2 {
    return true;
  }
  variance(&dx) >= VARIANCE_RATIO_THRESHOLD * variance(x)
}

impl DifferencingTest {
  /// Level-stationarity KPSS.
  pub fn kpss() -> Self {
    Self::Kpss {
      trend: KPSSTrend::Level,
    }
  }

  /// ADF with a constant and AIC lag selection.
  pub fn adf() -> Self {
    Self::Adf {
      deterministic: DeterministicTerm::Constant,
      lag_selection: LagSelection::Aic,
    }
  }

  /// Whether `x` already looks stationary. Constant series always do.
  pub fn is_stationary(self, x: &[f64]) -> Result<bool> {
    if x.len() < 3 {
      return Err(TsError::InsufficientData {
        needed: 3,
        got: x.len(),
      });
    }
    if is_constant(x) {
      return Ok(true);
    }
    let test = if x.len() < MIN_TEST_LENGTH {
      DifferencingTest::VarianceRatio
    } else {
      self
    };
    Ok(match test {
      DifferencingTest::Kpss { trend } => {
        let cfg = KPSSConfig {
          trend,
          lags: Some(short_bandwidth_lags(x.len())),
          ..KPSSConfig::default()
        };
        !kpss_test(x, cfg)?.reject_stationarity
      }
      DifferencingTest::Adf {
        deterministic,
        lag_selection,
      } => {
        let cfg = ADFConfig {
          deterministic,
          lag_selection,
          ..ADFConfig::default()
        };
        adf_test(x, cfg)?.reject_unit_root
      }
      DifferencingTest::VarianceRatio => variance_ratio_stationary(x),
    })
  }
}

/// Smallest `d <= max_d` whose `d`-th difference passes `test`.
///
/// # Errors
/// `OrderEstimationFailure` when even `max_d` differences leave the series
/// non-stationary or too short to judge.
pub fn estimate_d(x: &[f64], max_d: usize, test: DifferencingTest) -> Result<usize> {
  let mut current = x.to_vec();
  for d in 0..=max_d {
    if current.len() < 3 {
      return Err(TsError::OrderEstimationFailure(format!(
        "series too short to test stationarity after {d} differences"
      )));
    }
    if test.is_stationary(&current)? {
      debug!(d, ?test, "differencing order selected");
      return Ok(d);
    }
    current = difference_at(&current, 1, 1);
  }
  Err(TsError::OrderEstimationFailure(format!(
    "series is still non-stationary after {max_d} differences"
  )))
}

/// Number of seasonal differences, at most `max_d`.
///
/// A seasonal difference is taken while it removes more than half of the
/// variance of both the series and its ordinary difference. The second
/// comparison keeps a plain stochastic trend from passing as seasonality.
///
/// # Errors
/// `OrderEstimationFailure` when one more seasonal difference would still
/// pass that criterion after `max_d` of them.
pub fn estimate_seasonal_d(x: &[f64], period: usize, max_d: usize) -> Result<usize> {
  if period < 2 {
    return Err(TsError::InvalidArgument(format!(
      "seasonal period must be at least 2, got {period}"
    )));
  }
  let mut current = x.to_vec();
  for d in 0..=max_d {
    if current.len() < 2 * period + 2 || is_constant(&current) {
      return Ok(d);
    }
    let seasonal = difference_at(&current, period, 1);
    let ordinary = difference_at(&current, 1, 1);
    let reference = variance(&current).min(variance(&ordinary));
    let ratio = variance(&seasonal) / reference.max(f64::MIN_POSITIVE);
    debug!(d, ratio, period, "seasonal variance ratio");
    if ratio >= VARIANCE_RATIO_THRESHOLD {
      return Ok(d);
    }
    current = seasonal;
  }
  Err(TsError::OrderEstimationFailure(format!(
    "series still has a seasonal unit root after {max_d} seasonal differences"
  )))
}

#[cfg(test)]
mod tests {
  use tracing_test::traced_test;

  use super::estimate_d;
  use super::estimate_seasonal_d;
  use super::DifferencingTest;
  use crate::error::TsError;
  use crate::stats::stationarity::DeterministicTerm;
  use crate::stats::stationarity::KPSSTrend;
  use crate::stats::stationarity::LagSelection;
  use crate::simulate::ArimaProcess;
  use crate::simulate::ArmaProcess;
  use crate::simulate::SarimaProcess;
  use crate::traits::ProcessExt;

  #[test]
  #[traced_test]
  fn random_walks_need_one_difference() {
    let trials = 50;
    let hits = (0..trials)
      .filter(|&seed| {
        let x = ArimaProcess::new(vec![], vec![], 1, 1.0, 300, Some(400 + seed)).sample();
        estimate_d(x.as_slice().unwrap(), 2, DifferencingTest::default()).unwrap() == 1
      })
      .count();
    assert!(hits >= 40, "d = 1 for {hits}/{trials} random walks");
    assert!(logs_contain("differencing order selected"));
  }

  #[test]
  fn stationary_series_need_none() {
    let tests = [
      DifferencingTest::kpss(),
      DifferencingTest::adf(),
      DifferencingTest::VarianceRatio,
    ];
    for test in tests {
      let hits = (0..20)
        .filter(|&seed| {
          let x = ArmaProcess::new(vec![0.3], vec![], 1.0, 500, Some(500 + seed)).sample();
          estimate_d(x.as_slice().unwrap(), 2, test).unwrap() == 0
        })
        .count();
      assert!(hits >= 16, "{test:?}: d = 0 for {hits}/20");
    }
  }

  #[test]
  fn trend_stationary_series_need_none_under_trend_nulls() {
    let tests = [
      DifferencingTest::Kpss {
        trend: KPSSTrend::Trend,
      },
      DifferencingTest::Adf {
        deterministic: DeterministicTerm::ConstantTrend,
        lag_selection: LagSelection::Bic,
      },
    ];
    for test in tests {
      let hits = (0..20)
        .filter(|&seed| {
          let noise = ArmaProcess::new(vec![0.3], vec![], 1.0, 500, Some(600 + seed)).sample();
          let x: Vec<f64> = noise.iter().enumerate().map(|(t, e)| 0.05 * t as f64 + e).collect();
          estimate_d(&x, 2, test).unwrap() == 0
        })
        .count();
      assert!(hits >= 16, "{test:?}: d = 0 for {hits}/20");
    }
  }

  #[test]
  fn zero_mean_autoregression_rejects_a_unit_root_without_deterministics() {
    let test = DifferencingTest::Adf {
      deterministic: DeterministicTerm::None,
      lag_selection: LagSelection::Fixed(2),
    };
    let x = ArmaProcess::new(vec![0.5], vec![], 1.0, 1000, Some(46)).sample();
    assert_eq!(estimate_d(x.as_slice().unwrap(), 2, test).unwrap(), 0);
  }

  #[test]
  fn linear_trend_is_differenced_once() {
    let x: Vec<f64> = (1..=10).map(f64::from).collect();
    assert_eq!(estimate_d(&x, 1, DifferencingTest::default()).unwrap(), 1);
  }

  #[test]
  fn exceeding_the_bound_fails() {
    let x = ArimaProcess::new(vec![], vec![], 2, 1.0, 500, Some(43)).sample();
    assert!(matches!(
      estimate_d(x.as_slice().unwrap(), 0, DifferencingTest::default()),
      Err(TsError::OrderEstimationFailure(_))
    ));
  }

  #[test]
  fn seasonal_random_walk_is_seasonally_differenced() {
    let x = SarimaProcess::new(vec![], vec![], vec![], vec![], 0, 1, 12, 1.0, 600, Some(44)).sample();
    assert_eq!(estimate_seasonal_d(x.as_slice().unwrap(), 12, 1).unwrap(), 1);
    let noise = ArmaProcess::new(vec![], vec![], 1.0, 600, Some(45)).sample();
    assert_eq!(estimate_seasonal_d(noise.as_slice().unwrap(), 12, 1).unwrap(), 0);
  }

  #[test]
  fn seasonal_bound_below_the_true_order_fails() {
    let x = SarimaProcess::new(vec![], vec![], vec![], vec![], 0, 2, 4, 1.0, 400, Some(47)).sample();
    let x = x.as_slice().unwrap();
    assert!(matches!(
      estimate_seasonal_d(x, 4, 1),
      Err(TsError::OrderEstimationFailure(_))
    ));
    assert_eq!(estimate_seasonal_d(x, 4, 2).unwrap(), 2);
  }
}
