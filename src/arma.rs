//! # ARMA
//!
//! $$
//! w_t=c+\sum_{k\in\mathcal L_{AR}}\phi_k w_{t-k}+\sum_{k\in\mathcal L_{MA}}\theta_k\varepsilon_{t-k}+x_t^\top\beta+\varepsilon_t
//! $$
//!
//! Least-squares ARMA core shared by every model variant. Coefficients are
//! obtained by Hannan-Rissanen regression (a long autoregression supplies a
//! residual proxy, then lagged values and lagged residuals are regressed
//! jointly and the residuals re-estimated until the coefficients settle),
//! optionally polished by Nelder-Mead on the conditional sum of squares.
use std::f64::consts::PI;

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::solver::neldermead::NelderMead;
use nalgebra::DMatrix;
use ndarray::ArrayView2;
use num_complex::Complex64;
use tracing::debug;
use tracing::trace;

use crate::error::Result;
use crate::error::TsError;
use crate::ols::ols;

/// Coefficient estimation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimationMethod {
  #[default]
  HannanRissanen,
  /// Hannan-Rissanen start refined by minimizing the conditional sum of squares.
  ConditionalSumOfSquares,
}

/// Configuration of the ARMA estimator.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorConfig {
  pub method: EstimationMethod,
  /// Maximum residual re-estimation rounds.
  pub max_iterations: usize,
  /// Largest absolute coefficient change accepted as converged.
  pub tolerance: f64,
  /// Estimate an intercept alongside the coefficients.
  pub include_mean: bool,
  /// Order of the residual-proxy autoregression. If `None`, `max(⌊10 log10 n⌋, 2 max_lag)`.
  pub long_ar_order: Option<usize>,
  /// Iteration cap of the Nelder-Mead refinement.
  pub optimizer_max_iterations: u64,
}

impl Default for EstimatorConfig {
  fn default() -> Self {
    Self {
      method: EstimationMethod::HannanRissanen,
      max_iterations: 200,
      tolerance: 1e-6,
      include_mean: true,
      long_ar_order: None,
      optimizer_max_iterations: 5000,
    }
  }
}

/// Lags carrying AR and MA coefficients, in coefficient order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LagStructure {
  pub ar: Vec<usize>,
  pub ma: Vec<usize>,
}

impl LagStructure {
  pub fn new(p: usize, q: usize) -> Self {
    Self {
      ar: (1..=p).collect(),
      ma: (1..=q).collect(),
    }
  }

  /// Non-seasonal lags `1..p` followed by seasonal lags `s, 2s, .., P s`.
  pub fn seasonal(p: usize, q: usize, sp: usize, sq: usize, period: usize) -> Result<Self> {
    if sp + sq > 0 {
      if period < 2 {
        return Err(TsError::InvalidArgument(format!(
          "seasonal period must be at least 2, got {period}"
        )));
      }
      if (sp > 0 && p >= period) || (sq > 0 && q >= period) {
        return Err(TsError::InvalidArgument(format!(
          "non-seasonal order must stay below the seasonal period {period}"
        )));
      }
    }
    let mut lags = Self::new(p, q);
    lags.ar.extend((1..=sp).map(|k| k * period));
    lags.ma.extend((1..=sq).map(|k| k * period));
    Ok(lags)
  }

  pub fn max_lag(&self) -> usize {
    self.ar.iter().chain(self.ma.iter()).copied().max().unwrap_or(0)
  }

  pub fn len(&self) -> usize {
    self.ar.len() + self.ma.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ar.is_empty() && self.ma.is_empty()
  }
}

/// Estimated ARMA core.
#[derive(Debug, Clone)]
pub struct ArmaFit {
  pub lags: LagStructure,
  /// AR coefficients, then MA coefficients, then regressor coefficients.
  pub params: Vec<f64>,
  pub intercept: f64,
  /// One residual per observation of the fitted series.
  pub residuals: Vec<f64>,
  /// Value standing in for observations before the sample.
  pub presample: f64,
  pub sigma2: f64,
  pub log_lik: f64,
  pub aic: f64,
  pub bic: f64,
  /// Regression rounds (or optimizer iterations) used.
  pub iterations: usize,
}

impl ArmaFit {
  pub fn ar(&self) -> &[f64] {
    &self.params[..self.lags.ar.len()]
  }

  pub fn ma(&self) -> &[f64] {
    &self.params[self.lags.ar.len()..self.lags.len()]
  }

  pub fn exog(&self) -> &[f64] {
    &self.params[self.lags.len()..]
  }

  /// Estimated quantities excluding the innovation variance.
  pub fn n_estimated(&self, include_mean: bool) -> usize {
    self.params.len() + usize::from(include_mean)
  }

  /// AR polynomial `1 - Σ φ_k x^k` over the full lag structure.
  pub fn characteristic_poly(&self, x: f64) -> f64 {
    1.0
      - self
        .lags
        .ar
        .iter()
        .zip(self.ar())
        .map(|(&k, phi)| phi * x.powi(k as i32))
        .sum::<f64>()
  }

  /// Roots of `1 - Σ φ_k x^k`.
  pub fn ar_roots(&self) -> Vec<Complex64> {
    polynomial_roots(&self.lags.ar, self.ar(), -1.0)
  }

  /// Roots of `1 + Σ θ_k x^k`.
  pub fn ma_roots(&self) -> Vec<Complex64> {
    polynomial_roots(&self.lags.ma, self.ma(), 1.0)
  }

  pub fn is_stationary(&self) -> bool {
    self.ar_roots().iter().all(|r| r.norm() > 1.0)
  }

  pub fn is_invertible(&self) -> bool {
    self.ma_roots().iter().all(|r| r.norm() > 1.0)
  }

  /// Point forecasts continuing `history`.
  ///
  /// Innovations after the history and residuals past the end of `residuals`
  /// are taken as zero. `exog_future` holds one regressor row per step.
  pub fn forecast(
    &self,
    history: &[f64],
    residuals: &[f64],
    exog_future: Option<ArrayView2<f64>>,
    horizon: usize,
  ) -> Result<Vec<f64>> {
    let n_exog = self.exog().len();
    match exog_future {
      Some(x) if x.ncols() != n_exog || x.nrows() < horizon => {
        return Err(TsError::InvalidArgument(format!(
          "expected {horizon} future regressor rows with {n_exog} columns, got {}x{}",
          x.nrows(),
          x.ncols()
        )))
      }
      None if n_exog > 0 && horizon > 0 => {
        return Err(TsError::InvalidArgument(
          "future regressor values are required".into(),
        ))
      }
      _ => {}
    }

    let origin = history.len();
    let known_resid = origin.min(residuals.len());
    let mut extended = history.to_vec();
    extended.reserve(horizon);
    for j in 0..horizon {
      let t = origin + j;
      let mut value = self.intercept;
      for (&k, phi) in self.lags.ar.iter().zip(self.ar()) {
        value += phi * t.checked_sub(k).map_or(self.presample, |i| extended[i]);
      }
      for (&k, theta) in self.lags.ma.iter().zip(self.ma()) {
        if let Some(i) = t.checked_sub(k).filter(|&i| i < known_resid) {
          value += theta * residuals[i];
        }
      }
      if let Some(x) = exog_future {
        value += x.row(j).iter().zip(self.exog()).map(|(a, b)| a * b).sum::<f64>();
      }
      extended.push(value);
    }
    Ok(extended.split_off(origin))
  }
}

fn polynomial_roots(lags: &[usize], coefs: &[f64], sign: f64) -> Vec<Complex64> {
  let degree = lags.iter().copied().max().unwrap_or(0);
  if degree == 0 {
    return Vec::new();
  }
  // Companion matrix of z^m - a_1 z^{m-1} - .. - a_m; its eigenvalues are
  // the reciprocals of the polynomial roots.
  let mut a = vec![0.0; degree];
  for (&k, c) in lags.iter().zip(coefs) {
    a[k - 1] += -sign * c;
  }
  let mut companion = DMatrix::<f64>::zeros(degree, degree);
  for (j, v) in a.iter().enumerate() {
    companion[(0, j)] = *v;
  }
  for i in 1..degree {
    companion[(i, i - 1)] = 1.0;
  }
  companion
    .complex_eigenvalues()
    .iter()
    .filter(|z| z.norm() > 1e-12)
    .map(|z| Complex64::new(1.0, 0.0) / Complex64::new(z.re, z.im))
    .collect()
}

fn validate_input(w: &[f64], exog: Option<ArrayView2<f64>>) -> Result<()> {
  if w.is_empty() {
    return Err(TsError::EmptySeries);
  }
  if let Some(index) = w.iter().position(|v| !v.is_finite()) {
    return Err(TsError::NonFiniteValue { index });
  }
  if let Some(x) = exog {
    if x.nrows() != w.len() {
      return Err(TsError::InvalidArgument(format!(
        "regressors have {} rows for {} observations",
        x.nrows(),
        w.len()
      )));
    }
    if x.iter().any(|v| !v.is_finite()) {
      return Err(TsError::NonArithmeticType);
    }
  }
  Ok(())
}

/// Full-length residuals for the given coefficients. Pre-sample values are
/// `presample` and pre-sample innovations zero.
pub fn arma_residuals(
  w: &[f64],
  lags: &LagStructure,
  params: &[f64],
  intercept: f64,
  exog: Option<ArrayView2<f64>>,
  presample: f64,
) -> Vec<f64> {
  let (ar, rest) = params.split_at(lags.ar.len());
  let (ma, beta) = rest.split_at(lags.ma.len());
  let mut e = vec![0.0; w.len()];
  for t in 0..w.len() {
    let mut fitted = intercept;
    for (&k, phi) in lags.ar.iter().zip(ar) {
      fitted += phi * t.checked_sub(k).map_or(presample, |i| w[i]);
    }
    for (&k, theta) in lags.ma.iter().zip(ma) {
      if let Some(i) = t.checked_sub(k) {
        fitted += theta * e[i];
      }
    }
    if let Some(x) = exog {
      fitted += x.row(t).iter().zip(beta).map(|(a, b)| a * b).sum::<f64>();
    }
    e[t] = w[t] - fitted;
  }
  e
}

fn design_row(
  w: &[f64],
  e: &[f64],
  t: usize,
  lags: &LagStructure,
  exog: Option<ArrayView2<f64>>,
  include_mean: bool,
) -> Vec<f64> {
  let mut row = Vec::with_capacity(lags.len() + 1);
  if include_mean {
    row.push(1.0);
  }
  row.extend(lags.ar.iter().map(|&k| w[t - k]));
  row.extend(lags.ma.iter().map(|&k| e[t - k]));
  if let Some(x) = exog {
    row.extend(x.row(t).iter().copied());
  }
  row
}

/// Regress `w_t` on the lag structure over `t in start..n`.
fn regress(
  w: &[f64],
  e: &[f64],
  start: usize,
  lags: &LagStructure,
  exog: Option<ArrayView2<f64>>,
  include_mean: bool,
) -> Result<(f64, Vec<f64>)> {
  let rows: Vec<Vec<f64>> = (start..w.len())
    .map(|t| design_row(w, e, t, lags, exog, include_mean))
    .collect();
  let fit = ols(&w[start..], &rows)?;
  let mut beta = fit.beta;
  let intercept = if include_mean { beta.remove(0) } else { 0.0 };
  Ok((intercept, beta))
}

fn default_long_ar_order(n: usize, lags: &LagStructure) -> usize {
  let by_length = (10.0 * (n as f64).log10()).floor() as usize;
  by_length.max(2 * lags.max_lag()).min(n / 3)
}

fn max_abs_change(a: &[f64], b: &[f64]) -> f64 {
  a.iter()
    .zip(b)
    .map(|(x, y)| (x - y).abs())
    .fold(0.0, f64::max)
}

fn require_observations(n: usize, start: usize, k: usize) -> Result<()> {
  if n <= start + k {
    return Err(TsError::InsufficientData {
      needed: start + k + 1,
      got: n,
    });
  }
  Ok(())
}

fn hannan_rissanen(
  w: &[f64],
  lags: &LagStructure,
  exog: Option<ArrayView2<f64>>,
  cfg: &EstimatorConfig,
  presample: f64,
) -> Result<(f64, Vec<f64>, usize)> {
  let n = w.len();
  let n_exog = exog.map_or(0, |x| x.ncols());
  let k = lags.len() + n_exog + usize::from(cfg.include_mean);
  let max_lag = lags.max_lag();
  require_observations(n, max_lag, k)?;

  if lags.ma.is_empty() {
    let (intercept, params) = regress(w, &[], max_lag, lags, exog, cfg.include_mean)?;
    return Ok((intercept, params, 1));
  }

  let m = cfg
    .long_ar_order
    .unwrap_or_else(|| default_long_ar_order(n, lags))
    .max(1);
  let long_lags = LagStructure::new(m, 0);
  require_observations(n, m, m + n_exog + 1)?;
  let (c_long, long_params) = regress(w, &[], m, &long_lags, exog, cfg.include_mean)?;
  let mut proxy = arma_residuals(w, &long_lags, &long_params, c_long, exog, presample);
  for v in proxy.iter_mut().take(m) {
    *v = 0.0;
  }

  let start = m + lags.ma.iter().copied().max().unwrap_or(0);
  require_observations(n, start, k)?;
  let (mut intercept, mut params) = regress(w, &proxy, start, lags, exog, cfg.include_mean)?;

  for iteration in 1..=cfg.max_iterations {
    let e = arma_residuals(w, lags, &params, intercept, exog, presample);
    if e.iter().any(|v| !v.is_finite()) {
      return Err(TsError::FitNonConvergence { iterations: iteration });
    }
    let (next_intercept, next_params) = regress(w, &e, max_lag, lags, exog, cfg.include_mean)?;
    let change = max_abs_change(&params, &next_params).max((intercept - next_intercept).abs());
    trace!(iteration, change, "hannan-rissanen round");
    intercept = next_intercept;
    params = next_params;
    if !change.is_finite() {
      return Err(TsError::FitNonConvergence { iterations: iteration });
    }
    if change < cfg.tolerance {
      return Ok((intercept, params, iteration));
    }
  }

  Err(TsError::FitNonConvergence {
    iterations: cfg.max_iterations,
  })
}

struct ConditionalSumOfSquares<'a, 'x> {
  w: &'a [f64],
  lags: &'a LagStructure,
  exog: Option<ArrayView2<'x, f64>>,
  include_mean: bool,
  presample: f64,
}

impl ConditionalSumOfSquares<'_, '_> {
  fn split<'p>(&self, x: &'p [f64]) -> (f64, &'p [f64]) {
    if self.include_mean {
      (x[0], &x[1..])
    } else {
      (0.0, x)
    }
  }
}

impl CostFunction for ConditionalSumOfSquares<'_, '_> {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let (intercept, params) = self.split(x);
    let e = arma_residuals(self.w, self.lags, params, intercept, self.exog, self.presample);
    let mse = e.iter().map(|v| v * v).sum::<f64>() / e.len() as f64;
    Ok(if mse.is_finite() { mse } else { f64::MAX })
  }
}

fn refine_css(
  w: &[f64],
  lags: &LagStructure,
  exog: Option<ArrayView2<f64>>,
  cfg: &EstimatorConfig,
  presample: f64,
  intercept: f64,
  params: Vec<f64>,
) -> Result<(f64, Vec<f64>, usize)> {
  let mut x0 = Vec::with_capacity(params.len() + 1);
  if cfg.include_mean {
    x0.push(intercept);
  }
  x0.extend(params);
  if x0.is_empty() {
    return Ok((intercept, x0, 0));
  }

  let mut simplex = Vec::with_capacity(x0.len() + 1);
  simplex.push(x0.clone());
  for i in 0..x0.len() {
    let mut point = x0.clone();
    point[i] += 0.1 * x0[i].abs().max(0.5);
    simplex.push(point);
  }

  let problem = ConditionalSumOfSquares {
    w,
    lags,
    exog,
    include_mean: cfg.include_mean,
    presample,
  };
  let solver = NelderMead::new(simplex)
    .with_sd_tolerance(1e-12)
    .map_err(|e| TsError::InvalidArgument(e.to_string()))?;
  let res = Executor::new(problem, solver)
    .configure(|state| state.max_iters(cfg.optimizer_max_iterations))
    .run()
    .map_err(|_| TsError::FitNonConvergence {
      iterations: cfg.optimizer_max_iterations as usize,
    })?;

  let iterations = res.state().get_iter() as usize;
  if matches!(
    res.state().get_termination_reason(),
    Some(TerminationReason::MaxItersReached)
  ) {
    return Err(TsError::FitNonConvergence { iterations });
  }
  let best = res.state().get_best_param().cloned().unwrap_or(x0);
  let (intercept, params) = if cfg.include_mean {
    (best[0], best[1..].to_vec())
  } else {
    (0.0, best)
  };
  Ok((intercept, params, iterations))
}

/// Fit an ARMA model with the given lag structure to `w`.
///
/// # Errors
/// Empty or non-finite input, too few observations for the lag structure,
/// a singular design matrix, or residual re-estimation that fails to settle.
pub fn fit_arma(
  w: &[f64],
  lags: &LagStructure,
  exog: Option<ArrayView2<f64>>,
  cfg: &EstimatorConfig,
) -> Result<ArmaFit> {
  validate_input(w, exog)?;
  let n = w.len();
  let presample = w.iter().sum::<f64>() / n as f64;

  let (mut intercept, mut params, mut iterations) = hannan_rissanen(w, lags, exog, cfg, presample)?;
  if cfg.method == EstimationMethod::ConditionalSumOfSquares {
    let (c, p, it) = refine_css(w, lags, exog, cfg, presample, intercept, params)?;
    intercept = c;
    params = p;
    iterations += it;
  }

  let residuals = arma_residuals(w, lags, &params, intercept, exog, presample);
  if residuals.iter().any(|v| !v.is_finite()) {
    return Err(TsError::FitNonConvergence { iterations });
  }
  let n_f = n as f64;
  let sse = residuals.iter().map(|v| v * v).sum::<f64>();
  let sigma2 = sse / n_f;
  let log_lik = -0.5 * n_f * ((2.0 * PI * sigma2.max(f64::MIN_POSITIVE)).ln() + 1.0);
  let k = (params.len() + usize::from(cfg.include_mean) + 1) as f64;
  let aic = -2.0 * log_lik + 2.0 * k;
  let bic = -2.0 * log_lik + k * n_f.ln();

  debug!(
    ar = lags.ar.len(),
    ma = lags.ma.len(),
    iterations,
    sigma2,
    bic,
    "arma fit"
  );

  Ok(ArmaFit {
    lags: lags.clone(),
    params,
    intercept,
    residuals,
    presample,
    sigma2,
    log_lik,
    aic,
    bic,
    iterations,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array2;

  use super::fit_arma;
  use super::EstimationMethod;
  use super::EstimatorConfig;
  use super::LagStructure;
  use crate::error::TsError;
  use crate::simulate::ArmaProcess;
  use crate::simulate::SarimaProcess;
  use crate::traits::ProcessExt;

  #[test]
  fn recovers_ar2_coefficients() {
    let x = ArmaProcess::new(vec![0.6, -0.3], vec![], 1.0, 3000, Some(31)).sample();
    let fit = fit_arma(
      x.as_slice().unwrap(),
      &LagStructure::new(2, 0),
      None,
      &EstimatorConfig::default(),
    )
    .unwrap();
    assert_abs_diff_eq!(fit.ar()[0], 0.6, epsilon = 0.05);
    assert_abs_diff_eq!(fit.ar()[1], -0.3, epsilon = 0.05);
    assert_abs_diff_eq!(fit.sigma2, 1.0, epsilon = 0.1);
    assert_eq!(fit.residuals.len(), 3000);
    assert!(fit.is_stationary());
  }

  #[test]
  fn recovers_arma11_coefficients() {
    let x = ArmaProcess::new(vec![0.5], vec![0.4], 1.0, 4000, Some(32)).sample();
    let fit = fit_arma(
      x.as_slice().unwrap(),
      &LagStructure::new(1, 1),
      None,
      &EstimatorConfig::default(),
    )
    .unwrap();
    assert_abs_diff_eq!(fit.ar()[0], 0.5, epsilon = 0.08);
    assert_abs_diff_eq!(fit.ma()[0], 0.4, epsilon = 0.08);
    assert!(fit.iterations > 1);
    assert!(fit.is_invertible());
  }

  #[test]
  fn css_refinement_does_not_increase_the_sum_of_squares() {
    let x = ArmaProcess::new(vec![0.5], vec![0.4], 1.0, 1500, Some(33)).sample();
    let lags = LagStructure::new(1, 1);
    let hr = fit_arma(x.as_slice().unwrap(), &lags, None, &EstimatorConfig::default()).unwrap();
    let css = fit_arma(
      x.as_slice().unwrap(),
      &lags,
      None,
      &EstimatorConfig {
        method: EstimationMethod::ConditionalSumOfSquares,
        ..EstimatorConfig::default()
      },
    )
    .unwrap();
    assert!(css.sigma2 <= hr.sigma2 + 1e-9);
    assert_abs_diff_eq!(css.ar()[0], 0.5, epsilon = 0.1);
  }

  #[test]
  fn seasonal_lags_enter_the_regression() {
    let x = SarimaProcess::new(vec![0.4], vec![], vec![0.5], vec![], 0, 0, 12, 1.0, 3000, Some(34)).sample();
    let lags = LagStructure::seasonal(1, 0, 1, 0, 12).unwrap();
    assert_eq!(lags.ar, vec![1, 12]);
    let fit = fit_arma(x.as_slice().unwrap(), &lags, None, &EstimatorConfig::default()).unwrap();
    assert_abs_diff_eq!(fit.ar()[0], 0.4, epsilon = 0.06);
    assert_abs_diff_eq!(fit.ar()[1], 0.5, epsilon = 0.06);
  }

  #[test]
  fn overlapping_seasonal_lags_are_rejected() {
    assert!(LagStructure::seasonal(4, 0, 1, 0, 4).is_err());
    assert!(LagStructure::seasonal(1, 0, 1, 0, 1).is_err());
  }

  #[test]
  fn regressor_coefficients_are_recovered() {
    let noise = ArmaProcess::new(vec![], vec![], 0.5, 800, Some(35)).sample();
    let exog = Array2::from_shape_fn((800, 1), |(t, _)| (t as f64 * 0.37).sin());
    // y_t = 0.3 y_{t-1} + 2 x_t + e_t
    let mut y = vec![0.0; 800];
    for t in 0..800 {
      let prev = if t > 0 { y[t - 1] } else { 0.0 };
      y[t] = 0.3 * prev + 2.0 * exog[(t, 0)] + noise[t];
    }
    let fit = fit_arma(&y, &LagStructure::new(1, 0), Some(exog.view()), &EstimatorConfig::default()).unwrap();
    assert_eq!(fit.params.len(), 2);
    assert_abs_diff_eq!(fit.ar()[0], 0.3, epsilon = 0.05);
    assert_abs_diff_eq!(fit.exog()[0], 2.0, epsilon = 0.1);
  }

  #[test]
  fn too_few_observations_is_reported() {
    let res = fit_arma(
      &[1.0, 2.0, 1.5, 0.5],
      &LagStructure::new(3, 0),
      None,
      &EstimatorConfig::default(),
    );
    assert!(matches!(res, Err(TsError::InsufficientData { .. })));
  }

  #[test]
  fn exhausted_iteration_budget_is_non_convergence() {
    let x = ArmaProcess::new(vec![0.5], vec![0.4], 1.0, 800, Some(38)).sample();
    let cfg = EstimatorConfig {
      max_iterations: 1,
      ..EstimatorConfig::default()
    };
    let res = fit_arma(x.as_slice().unwrap(), &LagStructure::new(1, 1), None, &cfg);
    assert_eq!(res.unwrap_err(), TsError::FitNonConvergence { iterations: 1 });
  }

  #[test]
  fn lag_collinear_with_the_intercept_is_singular() {
    let w = vec![1.0; 40];
    let res = fit_arma(&w, &LagStructure::new(1, 0), None, &EstimatorConfig::default());
    assert_eq!(res.unwrap_err(), TsError::SingularMatrix);
    let mean_only = fit_arma(&w, &LagStructure::new(0, 0), None, &EstimatorConfig::default()).unwrap();
    assert_abs_diff_eq!(mean_only.intercept, 1.0, epsilon = 1e-12);
  }

  #[test]
  fn forecast_of_ar1_decays_to_the_mean() {
    let x = ArmaProcess::new(vec![0.7], vec![], 1.0, 2000, Some(36)).sample();
    let w = x.as_slice().unwrap();
    let fit = fit_arma(w, &LagStructure::new(1, 0), None, &EstimatorConfig::default()).unwrap();
    let f = fit.forecast(w, &fit.residuals, None, 50).unwrap();
    let phi = fit.ar()[0];
    let expected_first = fit.intercept + phi * w[w.len() - 1];
    assert_abs_diff_eq!(f[0], expected_first, epsilon = 1e-12);
    let mean = fit.intercept / (1.0 - phi);
    assert_abs_diff_eq!(f[49], mean, epsilon = 1e-3);
  }

  #[test]
  fn characteristic_polynomial_vanishes_at_its_roots() {
    let x = ArmaProcess::new(vec![0.5, 0.2], vec![], 1.0, 1000, Some(37)).sample();
    let fit = fit_arma(x.as_slice().unwrap(), &LagStructure::new(2, 0), None, &EstimatorConfig::default()).unwrap();
    for r in fit.ar_roots() {
      if r.im.abs() < 1e-12 {
        assert_abs_diff_eq!(fit.characteristic_poly(r.re), 0.0, epsilon = 1e-9);
      }
    }
    assert_abs_diff_eq!(fit.characteristic_poly(0.0), 1.0);
  }
}
