//! # Model
//!
//! $$
//! \underbrace{(1-B^s)^D(1-B)^d(1-B)^{\delta}}_{\text{pipeline}}X_t=W_t,\qquad
//! W_t\sim\text{ARMA}(p,q)\times(P,Q)_s
//! $$
//!
//! One model type for every variant: a transform pipeline chosen by the
//! configuration wraps the shared ARMA core, and forecasts are mapped back
//! through the inverse pipeline.
use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView2;
use ndarray::Axis;
use num_complex::Complex64;
use prettytable::row;
use prettytable::Table;
use tracing::debug;

use crate::arma::fit_arma;
use crate::arma::ArmaFit;
use crate::arma::EstimatorConfig;
use crate::diagnostics;
use crate::diagnostics::LjungBoxConfig;
use crate::diagnostics::LjungBoxResult;
use crate::error::Result;
use crate::error::Status;
use crate::error::TsError;
use crate::forecast::forecast_times;
use crate::forecast::ForecastResult;
use crate::order::estimator::transform_columns;
use crate::order::ArimaOrder;
use crate::order::MaxOrders;
use crate::order::ModelOrder;
use crate::order::OrderChoice;
use crate::order::OrderEstimator;
use crate::order::OrderSearchConfig;
use crate::order::SeasonalOrder;
use crate::series::Series;
use crate::traits::ModelExt;
use crate::transform::TransformPipeline;

/// Seasonal part of a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalConfig {
  /// Season length used when `order` is estimated.
  pub period: OrderChoice<usize>,
  pub order: OrderChoice<SeasonalOrder>,
}

/// Variant composition and estimation settings.
#[derive(Debug, Clone)]
pub struct ArimaConfig {
  pub order: OrderChoice<ArimaOrder>,
  /// Allow integer differencing when the order is estimated.
  pub integrated: bool,
  pub seasonal: Option<SeasonalConfig>,
  pub fractional: Option<OrderChoice<f64>>,
  /// Exogenous regressors, one row per observation.
  pub exog: Option<Array2<f64>>,
  pub estimator: EstimatorConfig,
  pub search: OrderSearchConfig,
  pub ljung_box: LjungBoxConfig,
}

impl Default for ArimaConfig {
  fn default() -> Self {
    Self::arima()
  }
}

impl ArimaConfig {
  /// Stationary ARMA: no differencing is estimated.
  pub fn arma() -> Self {
    Self {
      order: OrderChoice::Estimate,
      integrated: false,
      seasonal: None,
      fractional: None,
      exog: None,
      estimator: EstimatorConfig::default(),
      search: OrderSearchConfig::default(),
      ljung_box: LjungBoxConfig::default(),
    }
  }

  pub fn arima() -> Self {
    Self {
      integrated: true,
      ..Self::arma()
    }
  }

  /// Seasonal ARIMA with a known season length.
  pub fn sarima(period: usize) -> Self {
    Self {
      seasonal: Some(SeasonalConfig {
        period: OrderChoice::Fixed(period),
        order: OrderChoice::Estimate,
      }),
      ..Self::arima()
    }
  }

  /// Seasonal ARIMA whose season length is read off the periodogram.
  pub fn sarima_auto() -> Self {
    Self {
      seasonal: Some(SeasonalConfig {
        period: OrderChoice::Estimate,
        order: OrderChoice::Estimate,
      }),
      ..Self::arima()
    }
  }

  /// Fractionally integrated ARMA with an estimated memory parameter.
  pub fn arfima() -> Self {
    Self {
      fractional: Some(OrderChoice::Estimate),
      ..Self::arma()
    }
  }

  pub fn with_order(mut self, order: ArimaOrder) -> Self {
    self.order = OrderChoice::Fixed(order);
    self
  }

  pub fn with_seasonal_order(mut self, order: SeasonalOrder) -> Self {
    self.seasonal = Some(SeasonalConfig {
      period: OrderChoice::Fixed(order.period),
      order: OrderChoice::Fixed(order),
    });
    self
  }

  pub fn with_fractional_d(mut self, d: f64) -> Self {
    self.fractional = Some(OrderChoice::Fixed(d));
    self
  }

  pub fn with_exog(mut self, exog: Array2<f64>) -> Self {
    self.exog = Some(exog);
    self
  }

  pub fn with_estimator(mut self, estimator: EstimatorConfig) -> Self {
    self.estimator = estimator;
    self
  }

  pub fn with_search(mut self, search: OrderSearchConfig) -> Self {
    self.search = search;
    self
  }
}

/// Outcome of a successful fit.
#[derive(Debug, Clone)]
pub struct FitResult {
  /// AR, MA, then regressor coefficients.
  pub params: Vec<f64>,
  pub intercept: f64,
  pub status: Status,
  pub order: ModelOrder,
  pub n_exog: usize,
  /// One residual per observation of the transformed series.
  pub residuals: Array1<f64>,
  pub log_lik: f64,
  pub iterations: usize,
}

#[derive(Debug, Clone)]
struct FittedState {
  order: ModelOrder,
  pipeline: TransformPipeline,
  fit: ArmaFit,
  start: usize,
  end: usize,
}

impl FittedState {
  /// Index in the original series of the first residual.
  fn residual_origin(&self) -> usize {
    self.start + self.pipeline.offset()
  }
}

/// (S)ARIMA(FI)MA model over an owned series.
#[derive(Debug, Clone)]
pub struct Arima {
  series: Series,
  config: ArimaConfig,
  state: Option<FittedState>,
}

impl Arima {
  /// # Errors
  /// Regressor rows that do not match the series length or hold non-finite values.
  pub fn new(series: Series, config: ArimaConfig) -> Result<Self> {
    if series.is_empty() {
      return Err(TsError::EmptySeries);
    }
    if let Some(x) = &config.exog {
      if x.nrows() != series.len() {
        return Err(TsError::InvalidArgument(format!(
          "regressors have {} rows for {} observations",
          x.nrows(),
          series.len()
        )));
      }
      if x.iter().any(|v| !v.is_finite()) {
        return Err(TsError::NonArithmeticType);
      }
    }
    Ok(Self {
      series,
      config,
      state: None,
    })
  }

  pub fn series(&self) -> &Series {
    &self.series
  }

  pub fn config(&self) -> &ArimaConfig {
    &self.config
  }

  pub fn is_fitted(&self) -> bool {
    self.state.is_some()
  }

  fn state(&self) -> Result<&FittedState> {
    self.state.as_ref().ok_or(TsError::NotFitted)
  }

  fn n_exog(&self) -> usize {
    self.config.exog.as_ref().map_or(0, |x| x.ncols())
  }

  fn exog_rows(&self, start: usize, end: usize) -> Option<ArrayView2<f64>> {
    self.config.exog.as_ref().map(|x| x.slice(s![start..end, ..]))
  }

  /// Fix the order used by subsequent fits. The current fit is untouched.
  pub fn set_order(&mut self, order: ModelOrder) {
    self.config.order = OrderChoice::Fixed(order.arma);
    self.config.seasonal = order.seasonal.map(|s| SeasonalConfig {
      period: OrderChoice::Fixed(s.period),
      order: OrderChoice::Fixed(s),
    });
    self.config.fractional = order.fractional_d.map(OrderChoice::Fixed);
  }

  fn resolve_order(&self, start: usize, end: usize, max_orders: Option<MaxOrders>) -> Result<ModelOrder> {
    let x = &self.series.as_slice()[start..end];
    let seasonal = self.config.seasonal.map(|s| (s.period, s.order));
    OrderEstimator::new(
      x,
      self.exog_rows(start, end),
      &self.config.search,
      &self.config.estimator,
    )
    .estimate(
      self.config.order,
      self.config.integrated,
      seasonal,
      self.config.fractional,
      max_orders,
    )
  }

  /// Order for the whole series: `fixed` is validated and returned as is,
  /// otherwise every part the configuration leaves open is estimated within
  /// `max_orders`.
  pub fn estimate_order(
    &self,
    max_orders: Option<MaxOrders>,
    fixed: OrderChoice<ModelOrder>,
  ) -> Result<ModelOrder> {
    match fixed {
      OrderChoice::Fixed(order) => {
        order.validate(self.series.len(), self.n_exog())?;
        Ok(order)
      }
      OrderChoice::Estimate => self.resolve_order(0, self.series.len(), max_orders),
    }
  }

  /// Fix `order` and fit the whole series.
  pub fn fit_order(&mut self, order: ModelOrder) -> Result<FitResult> {
    self.set_order(order);
    self.fit()
  }

  /// Fit on observations `start..end`.
  ///
  /// # Errors
  /// An invalid range, order estimation failure, or any ARMA estimation
  /// error. The previous fit survives every failure.
  pub fn fit_range(&mut self, start: usize, end: usize) -> Result<FitResult> {
    let n = self.series.len();
    if end > n {
      return Err(TsError::IndexOutOfRange { index: end, len: n });
    }
    if start >= end {
      return Err(TsError::InvalidArgument(format!(
        "empty fit range {start}..{end}"
      )));
    }

    let order = self.resolve_order(start, end, None)?;
    let pipeline = order.pipeline();
    let w = pipeline.apply(&self.series.as_slice()[start..end])?;
    let exog = self
      .exog_rows(start, end)
      .map(|x| transform_columns(x, &pipeline))
      .transpose()?;
    let lags = order.lag_structure()?;
    let fit = fit_arma(&w, &lags, exog.as_ref().map(|x| x.view()), &self.config.estimator)?;
    debug!(%order, start, end, log_lik = fit.log_lik, "model fitted");

    let result = FitResult {
      params: fit.params.clone(),
      intercept: fit.intercept,
      status: Status::Success,
      order,
      n_exog: self.n_exog(),
      residuals: Array1::from(fit.residuals.clone()),
      log_lik: fit.log_lik,
      iterations: fit.iterations,
    };
    self.state = Some(FittedState {
      order,
      pipeline,
      fit,
      start,
      end,
    });
    Ok(result)
  }

  pub fn arma_params(&self) -> Result<&[f64]> {
    let fit = &self.state()?.fit;
    Ok(&fit.params[..fit.lags.len()])
  }

  pub fn exog_params(&self) -> Result<&[f64]> {
    Ok(self.state()?.fit.exog())
  }

  pub fn order(&self) -> Result<ModelOrder> {
    Ok(self.state()?.order)
  }

  /// Fitted observation range.
  pub fn fit_window(&self) -> Result<(usize, usize)> {
    let state = self.state()?;
    Ok((state.start, state.end))
  }

  pub fn residuals(&self) -> Result<&[f64]> {
    Ok(self.state()?.fit.residuals.as_slice())
  }

  pub fn sigma2(&self) -> Result<f64> {
    Ok(self.state()?.fit.sigma2)
  }

  pub fn intercept(&self) -> Result<f64> {
    Ok(self.state()?.fit.intercept)
  }

  pub fn aic(&self) -> Result<f64> {
    Ok(self.state()?.fit.aic)
  }

  pub fn bic(&self) -> Result<f64> {
    Ok(self.state()?.fit.bic)
  }

  /// One-step-ahead predictions `x_t - e_t` on the original scale, aligned
  /// with `residuals()`.
  pub fn fitted_values(&self) -> Result<Array1<f64>> {
    let state = self.state()?;
    let origin = state.residual_origin();
    let x = self.series.as_slice();
    Ok(Array1::from_iter(
      state
        .fit
        .residuals
        .iter()
        .enumerate()
        .map(|(i, e)| x[origin + i] - e),
    ))
  }

  /// AR polynomial `1 - Σ φ_k x^k`.
  pub fn characteristic_poly(&self, x: f64) -> Result<f64> {
    Ok(self.state()?.fit.characteristic_poly(x))
  }

  pub fn ar_roots(&self) -> Result<Vec<Complex64>> {
    Ok(self.state()?.fit.ar_roots())
  }

  pub fn ma_roots(&self) -> Result<Vec<Complex64>> {
    Ok(self.state()?.fit.ma_roots())
  }

  pub fn is_stationary(&self) -> Result<bool> {
    Ok(self.state()?.fit.is_stationary())
  }

  pub fn is_invertible(&self) -> Result<bool> {
    Ok(self.state()?.fit.is_invertible())
  }

  /// Coefficient table and fit statistics.
  pub fn summary(&self) -> Result<String> {
    let state = self.state()?;
    let fit = &state.fit;

    let mut table = Table::new();
    table.add_row(row!["term", "estimate"]);
    if self.config.estimator.include_mean {
      table.add_row(row!["intercept", format!("{:.6}", fit.intercept)]);
    }
    for (lag, v) in fit.lags.ar.iter().zip(fit.ar()) {
      table.add_row(row![format!("ar.L{lag}"), format!("{v:.6}")]);
    }
    for (lag, v) in fit.lags.ma.iter().zip(fit.ma()) {
      table.add_row(row![format!("ma.L{lag}"), format!("{v:.6}")]);
    }
    for (j, v) in fit.exog().iter().enumerate() {
      table.add_row(row![format!("exog.{j}"), format!("{v:.6}")]);
    }

    let mut stats = Table::new();
    stats.add_row(row!["observations", fit.residuals.len()]);
    stats.add_row(row!["sigma2", format!("{:.6}", fit.sigma2)]);
    stats.add_row(row!["log-likelihood", format!("{:.4}", fit.log_lik)]);
    stats.add_row(row!["AIC", format!("{:.4}", fit.aic)]);
    stats.add_row(row!["BIC", format!("{:.4}", fit.bic)]);

    Ok(format!("{}\n{table}{stats}", state.order))
  }

  /// `horizon` point forecasts for positions `start..start + horizon`.
  /// `start` defaults to the end of the fitted range.
  pub fn forecast(&self, horizon: usize, start: Option<usize>) -> Result<ForecastResult> {
    let origin = match start {
      Some(origin) => origin,
      None => self.state()?.end,
    };
    self.forecast_from(origin, horizon, None)
  }

  /// Forecasts past the end of the series with regressor values `future`
  /// (one row per step).
  pub fn forecast_with_exog(&self, horizon: usize, future: ArrayView2<f64>) -> Result<ForecastResult> {
    self.forecast_from(self.series.len(), horizon, Some(future))
  }

  fn future_exog(
    &self,
    state: &FittedState,
    origin: usize,
    horizon: usize,
    future: Option<ArrayView2<f64>>,
  ) -> Result<Option<Array2<f64>>> {
    let Some(exog) = &self.config.exog else {
      return Ok(None);
    };
    let n = self.series.len();
    let needed = (origin + horizon).saturating_sub(n);
    let extra = match future {
      Some(f) if f.nrows() >= needed && f.ncols() == exog.ncols() => f.slice(s![..needed, ..]).to_owned(),
      Some(f) => {
        return Err(TsError::InvalidArgument(format!(
          "expected {needed} future regressor rows with {} columns, got {}x{}",
          exog.ncols(),
          f.nrows(),
          f.ncols()
        )))
      }
      None if needed > 0 => {
        return Err(TsError::InvalidArgument(
          "forecasting past the series end needs future regressor values".into(),
        ))
      }
      None => Array2::zeros((0, exog.ncols())),
    };
    let known = exog.slice(s![state.start..(origin + horizon).min(n), ..]);
    let all = ndarray::concatenate(Axis(0), &[known, extra.view()])
      .map_err(|e| TsError::InvalidArgument(e.to_string()))?;
    let transformed = transform_columns(all.view(), &state.pipeline)?;
    let rows = transformed.nrows();
    Ok(Some(transformed.slice(s![rows - horizon.., ..]).to_owned()))
  }

  fn forecast_from(
    &self,
    origin: usize,
    horizon: usize,
    future: Option<ArrayView2<f64>>,
  ) -> Result<ForecastResult> {
    let state = self.state()?;
    let n = self.series.len();
    if origin > n {
      return Err(TsError::IndexOutOfRange { index: origin, len: n });
    }
    let min_origin = state.residual_origin() + 1;
    if origin < min_origin {
      return Err(TsError::InsufficientData {
        needed: min_origin,
        got: origin,
      });
    }

    let history = &self.series.as_slice()[state.start..origin];
    let levels = state.pipeline.levels(history)?;
    let transformed = levels.last().map(Vec::as_slice).unwrap_or_default();
    let exog = self.future_exog(state, origin, horizon, future)?;
    let raw = state.fit.forecast(
      transformed,
      &state.fit.residuals,
      exog.as_ref().map(|x| x.view()),
      horizon,
    )?;
    let values = state.pipeline.invert(&levels, &raw)?;

    let times = match self.series.times() {
      Some(times) => Some(forecast_times(times, origin, horizon)?),
      None => None,
    };
    Ok(ForecastResult {
      values: Array1::from(values),
      start: origin,
      times,
      order: state.order,
      status: Status::Success,
    })
  }

  fn residual_range(&self, start: Option<usize>, end: Option<usize>) -> Result<(usize, usize)> {
    let len = self.state()?.fit.residuals.len();
    let start = start.unwrap_or(0);
    let end = end.unwrap_or(len);
    if end > len {
      return Err(TsError::IndexOutOfRange { index: end, len });
    }
    if start >= end {
      return Err(TsError::InvalidArgument(format!(
        "empty residual range {start}..{end}"
      )));
    }
    Ok((start, end))
  }

  /// Root mean square of residuals `start..end` (residual indices).
  pub fn rmse(&self, start: Option<usize>, end: Option<usize>) -> Result<f64> {
    let (start, end) = self.residual_range(start, end)?;
    diagnostics::rmse(&self.state()?.fit.residuals[start..end])
  }

  /// Root mean square error of `horizon` forecasts from `start` against the
  /// observed values. `start` defaults to the earlier of the fit end and
  /// `len - horizon`.
  pub fn rmsfe(&self, horizon: usize, start: Option<usize>) -> Result<f64> {
    let state = self.state()?;
    let n = self.series.len();
    let origin = start.unwrap_or_else(|| state.end.min(n.saturating_sub(horizon)));
    if origin + horizon > n {
      return Err(TsError::InsufficientData {
        needed: origin + horizon,
        got: n,
      });
    }
    let forecast = self.forecast(horizon, Some(origin))?;
    let actual = &self.series.as_slice()[origin..origin + horizon];
    diagnostics::rmsfe(forecast.values.as_slice().unwrap_or_default(), actual)
  }

  /// Share of one-step predictions over residuals `start..end` that move in
  /// the direction the series actually moved.
  pub fn directional_accuracy(&self, start: Option<usize>, end: Option<usize>) -> Result<f64> {
    let (start, end) = self.residual_range(start, end)?;
    let state = self.state()?;
    let origin = state.residual_origin();
    let x = self.series.as_slice();

    let mut previous = Vec::with_capacity(end - start);
    let mut actual = Vec::with_capacity(end - start);
    let mut predicted = Vec::with_capacity(end - start);
    for i in start..end {
      let t = origin + i;
      if t == 0 {
        continue;
      }
      previous.push(x[t - 1]);
      actual.push(x[t]);
      predicted.push(x[t] - state.fit.residuals[i]);
    }
    diagnostics::directional_accuracy(&previous, &actual, &predicted)
  }

  /// Ljung-Box test on the residuals with ARMA coefficients removed from the
  /// degrees of freedom.
  pub fn ljung_box(&self, cfg: LjungBoxConfig) -> Result<LjungBoxResult> {
    let state = self.state()?;
    diagnostics::ljung_box(
      &state.fit.residuals,
      LjungBoxConfig {
        fitted_params: state.order.n_coefficients(),
        ..cfg
      },
    )
  }

  pub fn box_ljung_stat(&self) -> Result<f64> {
    Ok(self.ljung_box(self.config.ljung_box)?.statistic)
  }

  /// `true` when the residuals pass as white noise at `significance`.
  pub fn box_ljung_test(&self, significance: f64) -> Result<bool> {
    let cfg = LjungBoxConfig {
      alpha: significance,
      ..self.config.ljung_box
    };
    Ok(self.ljung_box(cfg)?.white_noise)
  }
}

impl ModelExt for Arima {
  type Output = FitResult;

  fn fit(&mut self) -> Result<FitResult> {
    self.fit_range(0, self.series.len())
  }

  fn log_lik(&self) -> Result<f64> {
    Ok(self.state()?.fit.log_lik)
  }

  fn params(&self) -> Result<&[f64]> {
    Ok(self.state()?.fit.params.as_slice())
  }
}
