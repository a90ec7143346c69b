use ndarray::Array2;
use ndarray::ArrayView2;
use tracing::debug;

use super::differencing::estimate_d;
use super::differencing::estimate_seasonal_d;
use super::ArimaOrder;
use super::MaxOrders;
use super::ModelOrder;
use super::OrderChoice;
use super::OrderSearchConfig;
use super::SeasonalOrder;
use crate::arma::fit_arma;
use crate::arma::EstimatorConfig;
use crate::arma::LagStructure;
use crate::correlation::acf;
use crate::correlation::is_constant;
use crate::correlation::pacf;
use crate::correlation::significance_bound;
use crate::error::Result;
use crate::error::TsError;
use crate::stats::spectral::spectrum_peaks;
use crate::stats::spectral::PeriodogramConfig;
use crate::transform::Transform;
use crate::transform::TransformPipeline;

/// Number of periodogram peaks considered as season lengths.
const PERIOD_CANDIDATES: usize = 5;

/// Season length of `x`.
///
/// Candidates are the strongest periodogram peaks in `[2, n/2]` and their
/// integer multiples; the candidate with the largest autocorrelation wins,
/// which prefers the fundamental over its harmonics.
///
/// # Errors
/// `OrderEstimationFailure` when the winner's autocorrelation stays inside
/// the significance bound at `alpha` split over all candidates.
pub fn estimate_period(x: &[f64], alpha: f64) -> Result<usize> {
  let n = x.len();
  let max_period = n / 2;
  if max_period < 2 {
    return Err(TsError::InsufficientData { needed: 4, got: n });
  }
  if is_constant(x) {
    return Err(TsError::OrderEstimationFailure(
      "constant series has no seasonal period".into(),
    ));
  }

  let peaks = spectrum_peaks(x, PeriodogramConfig::default(), 2.0, max_period as f64)?;
  let mut candidates: Vec<usize> = Vec::new();
  for peak in peaks.iter().take(PERIOD_CANDIDATES).filter(|p| p.power > 0.0) {
    let base = peak.period.round() as usize;
    let mut period = base;
    while period >= 2 && period <= max_period {
      if !candidates.contains(&period) {
        candidates.push(period);
      }
      period += base;
    }
  }
  if candidates.is_empty() {
    return Err(TsError::OrderEstimationFailure(
      "no seasonal period in [2, n/2]".into(),
    ));
  }

  let tested = candidates.len();
  let max_lag = candidates.iter().copied().max().unwrap_or(2);
  let rho = acf(x, max_lag)?;
  let best = candidates
    .into_iter()
    .max_by(|a, b| rho[*a].total_cmp(&rho[*b]).then(b.cmp(a)))
    .ok_or_else(|| TsError::OrderEstimationFailure("no seasonal period".into()))?;
  let bound = significance_bound(n, alpha / tested as f64)?;
  if rho[best] <= bound {
    return Err(TsError::OrderEstimationFailure(format!(
      "autocorrelation {:.3} at candidate period {best} is within the significance bound {bound:.3}",
      rho[best]
    )));
  }
  debug!(period = best, acf = rho[best], "seasonal period selected");
  Ok(best)
}

/// Last lag `k <= max_k` (stepping by `step`) where `|r_k|` exceeds `bound`.
fn last_significant(r: &[f64], max_k: usize, step: usize, bound: f64) -> usize {
  (1..=max_k)
    .rev()
    .find(|&k| k * step < r.len() && r[k * step].abs() > bound)
    .unwrap_or(0)
}

/// Candidate upper bounds derived from ACF/pACF cut-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CandidateBounds {
  pub p: usize,
  pub q: usize,
  pub seasonal_p: usize,
  pub seasonal_q: usize,
}

/// Order search over one configuration.
pub struct OrderEstimator<'a> {
  x: &'a [f64],
  exog: Option<ArrayView2<'a, f64>>,
  search: &'a OrderSearchConfig,
  estimator: &'a EstimatorConfig,
}

impl<'a> OrderEstimator<'a> {
  pub fn new(
    x: &'a [f64],
    exog: Option<ArrayView2<'a, f64>>,
    search: &'a OrderSearchConfig,
    estimator: &'a EstimatorConfig,
  ) -> Self {
    Self {
      x,
      exog,
      search,
      estimator,
    }
  }

  fn max_orders(&self, max_orders: Option<MaxOrders>) -> MaxOrders {
    max_orders
      .or(self.search.max_orders)
      .unwrap_or_else(|| MaxOrders::for_length(self.x.len()))
  }

  /// Resolve every `Estimate` in the request into a concrete order.
  ///
  /// `integrated` allows `d > 0`; `seasonal` and `fractional` enable those parts.
  pub fn estimate(
    &self,
    order: OrderChoice<ArimaOrder>,
    integrated: bool,
    seasonal: Option<(OrderChoice<usize>, OrderChoice<SeasonalOrder>)>,
    fractional: Option<OrderChoice<f64>>,
    max_orders: Option<MaxOrders>,
  ) -> Result<ModelOrder> {
    let bounds = self.max_orders(max_orders);
    let mut resolved = ModelOrder::default();
    let mut current = self.x.to_vec();

    // Seasonal differencing comes first.
    let mut seasonal_bounds = None;
    if let Some((period, seasonal_order)) = seasonal {
      let s = match seasonal_order {
        OrderChoice::Fixed(s) => s,
        OrderChoice::Estimate => {
          let period = match period {
            OrderChoice::Fixed(p) => p,
            OrderChoice::Estimate => estimate_period(&current, self.search.alpha)?,
          };
          let d = estimate_seasonal_d(&current, period, self.search.max_seasonal_orders.d)?;
          seasonal_bounds = Some(self.search.max_seasonal_orders);
          SeasonalOrder::new(0, d, 0, period)
        }
      };
      let mut seasonal_pipeline = TransformPipeline::new();
      for _ in 0..s.d {
        seasonal_pipeline.push(Transform::SeasonalDifference { period: s.period });
      }
      current = seasonal_pipeline.apply(&current)?;
      resolved.seasonal = Some(s);
    }

    let fixed_arma = order.fixed().copied();
    resolved.arma.d = match fixed_arma {
      Some(o) => o.d,
      None if integrated => estimate_d(&current, bounds.d, self.search.differencing_test)?,
      None => 0,
    };
    for _ in 0..resolved.arma.d {
      current = Transform::Difference.apply(&current)?;
    }

    if let Some(choice) = fractional {
      let d = match choice {
        OrderChoice::Fixed(d) => d,
        OrderChoice::Estimate => {
          let d = self.search.fractional_estimator.estimate(&current)?;
          if !(d > -0.5 && d < 0.5) {
            return Err(TsError::OrderEstimationFailure(format!(
              "fractional order estimate {d:.3} outside (-0.5, 0.5)"
            )));
          }
          debug!(d, "fractional order estimated");
          d
        }
      };
      resolved.fractional_d = Some(d);
    }

    let pipeline = resolved.pipeline();
    let w = pipeline.apply(self.x)?;
    let exog = self.transform_exog(&pipeline)?;

    if let Some(o) = fixed_arma {
      resolved.arma = o;
      if seasonal_bounds.is_none() {
        resolved.validate(self.x.len(), exog.as_ref().map_or(0, |x| x.ncols()))?;
        return Ok(resolved);
      }
    }

    let period = resolved.seasonal.map_or(0, |s| s.period);
    let candidates = if is_constant(&w) {
      CandidateBounds::default()
    } else {
      let nonseasonal = if fixed_arma.is_some() {
        MaxOrders::new(0, 0, 0)
      } else {
        bounds
      };
      self.candidate_bounds(&w, nonseasonal, seasonal_bounds, period)?
    };
    debug!(?candidates, "order search bounds");

    let (p_range, q_range) = match fixed_arma {
      Some(o) => (o.p..=o.p, o.q..=o.q),
      None => (0..=candidates.p, 0..=candidates.q),
    };

    let mut best: Option<(f64, usize, ModelOrder)> = None;
    for p in p_range {
      for q in q_range.clone() {
        for sp in 0..=candidates.seasonal_p {
          for sq in 0..=candidates.seasonal_q {
            let mut order = resolved;
            order.arma.p = p;
            order.arma.q = q;
            if let Some(s) = order.seasonal.as_mut() {
              if seasonal_bounds.is_some() {
                s.p = sp;
                s.q = sq;
              }
            }
            let lags = match order.lag_structure() {
              Ok(lags) => lags,
              Err(_) => continue,
            };
            match self.score(&w, &lags, exog.as_ref()) {
              Ok(bic) => {
                let k = order.n_coefficients();
                debug!(%order, bic, "order candidate");
                let better = match &best {
                  None => true,
                  Some((b, bk, _)) => bic < *b || (bic == *b && k < *bk),
                };
                if better {
                  best = Some((bic, k, order));
                }
              }
              Err(e) => debug!(%order, error = %e, "order candidate skipped"),
            }
          }
        }
      }
    }

    let (_, _, order) = best.ok_or_else(|| {
      TsError::OrderEstimationFailure("no candidate order could be fitted".into())
    })?;
    order.validate(self.x.len(), exog.as_ref().map_or(0, |x| x.ncols()))?;
    Ok(order)
  }

  fn transform_exog(&self, pipeline: &TransformPipeline) -> Result<Option<Array2<f64>>> {
    self
      .exog
      .map(|x| transform_columns(x, pipeline))
      .transpose()
  }

  fn candidate_bounds(
    &self,
    w: &[f64],
    bounds: MaxOrders,
    seasonal: Option<MaxOrders>,
    period: usize,
  ) -> Result<CandidateBounds> {
    let n = w.len();
    let seasonal_reach = seasonal.map_or(0, |s| s.p.max(s.q) * period);
    let max_lag = bounds.p.max(bounds.q).max(seasonal_reach).min(n.saturating_sub(1));
    if max_lag == 0 {
      return Ok(CandidateBounds::default());
    }
    let rho = acf(w, max_lag)?;
    let alpha = pacf(w, max_lag)?;
    let bound = significance_bound(n, self.search.alpha)?;
    let (rho, alpha) = (rho.to_vec(), alpha.to_vec());

    let mut c = CandidateBounds {
      p: last_significant(&alpha, bounds.p, 1, bound),
      q: last_significant(&rho, bounds.q, 1, bound),
      ..CandidateBounds::default()
    };
    if let Some(s) = seasonal {
      c.seasonal_p = last_significant(&alpha, s.p, period, bound);
      c.seasonal_q = last_significant(&rho, s.q, period, bound);
      // Keep non-seasonal lags below the season length.
      c.p = c.p.min(period.saturating_sub(1));
      c.q = c.q.min(period.saturating_sub(1));
    }
    Ok(c)
  }

  fn score(&self, w: &[f64], lags: &LagStructure, exog: Option<&Array2<f64>>) -> Result<f64> {
    let fit = fit_arma(w, lags, exog.map(|x| x.view()), self.estimator)?;
    Ok(fit.bic)
  }
}

/// Apply `pipeline` to every regressor column.
pub fn transform_columns(x: ArrayView2<f64>, pipeline: &TransformPipeline) -> Result<Array2<f64>> {
  let n = x.nrows().saturating_sub(pipeline.offset());
  let mut out = Array2::<f64>::zeros((n, x.ncols()));
  for (j, column) in x.columns().into_iter().enumerate() {
    let transformed = pipeline.apply(&column.to_vec())?;
    for (i, v) in transformed.into_iter().enumerate() {
      out[(i, j)] = v;
    }
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::estimate_period;
  use super::OrderEstimator;
  use crate::arma::EstimatorConfig;
  use crate::error::TsError;
  use crate::order::ArimaOrder;
  use crate::order::MaxOrders;
  use crate::order::OrderChoice;
  use crate::order::OrderSearchConfig;
  use crate::order::SeasonalOrder;
  use crate::simulate::ArmaProcess;
  use crate::simulate::SarimaProcess;
  use crate::traits::ProcessExt;

  #[test]
  fn recovers_ar_order() {
    let x = ArmaProcess::new(vec![0.6, -0.3], vec![], 1.0, 1000, Some(51)).sample();
    let search = OrderSearchConfig::default();
    let est = EstimatorConfig::default();
    let order = OrderEstimator::new(x.as_slice().unwrap(), None, &search, &est)
      .estimate(OrderChoice::Estimate, false, None, None, Some(MaxOrders::new(5, 0, 5)))
      .unwrap();
    assert_eq!(order.arma.p, 2);
    assert_eq!(order.arma.d, 0);
    assert!(order.arma.q <= 1, "{order}");
  }

  #[test]
  fn linear_trend_scenario() {
    let x: Vec<f64> = (1..=10).map(f64::from).collect();
    let search = OrderSearchConfig::default();
    let est = EstimatorConfig::default();
    let order = OrderEstimator::new(&x, None, &search, &est)
      .estimate(OrderChoice::Estimate, true, None, None, Some(MaxOrders::new(2, 1, 2)))
      .unwrap();
    assert!(order.arma.d >= 1);
    assert_eq!((order.arma.p, order.arma.q), (0, 0));
  }

  #[test]
  fn fixed_orders_are_returned_after_validation() {
    let x = ArmaProcess::new(vec![0.5], vec![], 1.0, 200, Some(52)).sample();
    let search = OrderSearchConfig::default();
    let est = EstimatorConfig::default();
    let estimator = OrderEstimator::new(x.as_slice().unwrap(), None, &search, &est);
    let order = estimator
      .estimate(OrderChoice::Fixed(ArimaOrder::new(3, 1, 2)), true, None, None, None)
      .unwrap();
    assert_eq!(order.arma, ArimaOrder::new(3, 1, 2));

    let short = [1.0, 2.0, 0.5, 1.5, 2.5];
    let estimator = OrderEstimator::new(&short, None, &search, &est);
    assert!(estimator
      .estimate(OrderChoice::Fixed(ArimaOrder::new(3, 1, 2)), true, None, None, None)
      .is_err());
  }

  #[test]
  fn seasonal_order_is_detected() {
    let x = SarimaProcess::new(vec![], vec![], vec![0.7], vec![], 0, 0, 12, 1.0, 2400, Some(53)).sample();
    let search = OrderSearchConfig::default();
    let est = EstimatorConfig::default();
    let order = OrderEstimator::new(x.as_slice().unwrap(), None, &search, &est)
      .estimate(
        OrderChoice::Estimate,
        false,
        Some((OrderChoice::Fixed(12), OrderChoice::Estimate)),
        None,
        Some(MaxOrders::new(2, 0, 2)),
      )
      .unwrap();
    let seasonal = order.seasonal.unwrap();
    assert_eq!(seasonal.period, 12);
    assert_eq!(seasonal.d, 0);
    assert_eq!(seasonal.p, 1);
    assert_eq!(order.arma.p, 0);
  }

  #[test]
  fn fixed_seasonal_order_is_kept() {
    let x = SarimaProcess::new(vec![0.3], vec![], vec![0.5], vec![], 0, 1, 4, 1.0, 400, Some(54)).sample();
    let search = OrderSearchConfig::default();
    let est = EstimatorConfig::default();
    let fixed = SeasonalOrder::new(1, 1, 0, 4);
    let order = OrderEstimator::new(x.as_slice().unwrap(), None, &search, &est)
      .estimate(
        OrderChoice::Fixed(ArimaOrder::new(1, 0, 0)),
        false,
        Some((OrderChoice::Estimate, OrderChoice::Fixed(fixed))),
        None,
        None,
      )
      .unwrap();
    assert_eq!(order.seasonal, Some(fixed));
  }

  #[test]
  fn period_of_a_seasonal_pattern() {
    let x: Vec<f64> = (0..240)
      .map(|t| {
        let a = 2.0 * std::f64::consts::PI * t as f64 / 12.0;
        3.0 * a.sin() + 1.5 * (2.0 * a).cos() + 0.05 * ((t * 7919) % 13) as f64
      })
      .collect();
    assert_eq!(estimate_period(&x, 0.05).unwrap(), 12);
  }

  #[test]
  fn white_noise_has_no_period() {
    let failures = (0..20)
      .filter(|&seed| {
        let x = ArmaProcess::new(vec![], vec![], 1.0, 600, Some(700 + seed)).sample();
        matches!(
          estimate_period(x.as_slice().unwrap(), 0.05),
          Err(TsError::OrderEstimationFailure(_))
        )
      })
      .count();
    assert!(failures >= 16, "period rejected for {failures}/20 noise series");
  }
}
