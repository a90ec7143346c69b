//! # Order
//!
//! $$
//! \hat p=\max\{k\le p_{\max}:|\hat\alpha_k|>z_{1-\alpha/2}/\sqrt n\},\qquad
//! \hat q=\max\{k\le q_{\max}:|\hat\rho_k|>z_{1-\alpha/2}/\sqrt n\}
//! $$
//!
//! Model orders and their automatic selection.
use std::fmt;

use crate::arma::LagStructure;
use crate::error::Result;
use crate::error::TsError;
use crate::stats::fractional::FractionalEstimator;
use crate::transform::Transform;
use crate::transform::TransformPipeline;
use crate::transform::FRACTIONAL_TRUNCATION;

pub mod differencing;
pub mod estimator;

pub use differencing::DifferencingTest;
pub use estimator::OrderEstimator;

/// Caller-supplied value or automatic estimation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OrderChoice<T> {
  Fixed(T),
  #[default]
  Estimate,
}

impl<T> OrderChoice<T> {
  pub fn fixed(&self) -> Option<&T> {
    match self {
      OrderChoice::Fixed(v) => Some(v),
      OrderChoice::Estimate => None,
    }
  }
}

/// Non-seasonal `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArimaOrder {
  pub p: usize,
  pub d: usize,
  pub q: usize,
}

impl ArimaOrder {
  pub fn new(p: usize, d: usize, q: usize) -> Self {
    Self { p, d, q }
  }
}

/// Seasonal `(P, D, Q)_s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalOrder {
  pub p: usize,
  pub d: usize,
  pub q: usize,
  pub period: usize,
}

impl SeasonalOrder {
  pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
    Self { p, d, q, period }
  }
}

/// Fully resolved model order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelOrder {
  pub arma: ArimaOrder,
  pub seasonal: Option<SeasonalOrder>,
  /// Fractional differencing applied after the integer differences.
  pub fractional_d: Option<f64>,
}

impl ModelOrder {
  pub fn arima(p: usize, d: usize, q: usize) -> Self {
    Self {
      arma: ArimaOrder::new(p, d, q),
      ..Self::default()
    }
  }

  pub fn with_seasonal(mut self, seasonal: SeasonalOrder) -> Self {
    self.seasonal = Some(seasonal);
    self
  }

  pub fn with_fractional(mut self, d: f64) -> Self {
    self.fractional_d = Some(d);
    self
  }

  /// Number of AR and MA coefficients.
  pub fn n_coefficients(&self) -> usize {
    let s = self.seasonal.map_or(0, |s| s.p + s.q);
    self.arma.p + self.arma.q + s
  }

  pub fn lag_structure(&self) -> Result<LagStructure> {
    match self.seasonal {
      Some(s) => LagStructure::seasonal(self.arma.p, self.arma.q, s.p, s.q, s.period),
      None => Ok(LagStructure::new(self.arma.p, self.arma.q)),
    }
  }

  /// Seasonal differences, then integer differences, then the fractional stage.
  pub fn pipeline(&self) -> TransformPipeline {
    let mut pipeline = TransformPipeline::new();
    if let Some(s) = self.seasonal {
      for _ in 0..s.d {
        pipeline.push(Transform::SeasonalDifference { period: s.period });
      }
    }
    for _ in 0..self.arma.d {
      pipeline.push(Transform::Difference);
    }
    if let Some(d) = self.fractional_d {
      pipeline.push(Transform::FractionalDifference {
        d,
        truncation: FRACTIONAL_TRUNCATION,
      });
    }
    pipeline
  }

  /// Check the order is well posed for `n` observations with `n_exog` regressors.
  pub fn validate(&self, n: usize, n_exog: usize) -> Result<()> {
    if let Some(d) = self.fractional_d {
      if !(d > -0.5 && d < 0.5) {
        return Err(TsError::InvalidArgument(format!(
          "fractional order {d} outside (-0.5, 0.5)"
        )));
      }
    }
    let lags = self.lag_structure()?;
    let offset = self.pipeline().offset();
    let remaining = n.saturating_sub(offset);
    let needed = lags.max_lag() + self.n_coefficients() + n_exog + 2;
    if remaining < needed {
      return Err(TsError::InsufficientData {
        needed: needed + offset,
        got: n,
      });
    }
    Ok(())
  }
}

impl fmt::Display for ModelOrder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let ArimaOrder { p, d, q } = self.arma;
    match self.fractional_d {
      Some(fd) => write!(f, "ARFIMA({p},{},{q})", d as f64 + fd)?,
      None => write!(f, "ARIMA({p},{d},{q})")?,
    }
    if let Some(s) = self.seasonal {
      write!(f, "({},{},{})[{}]", s.p, s.d, s.q, s.period)?;
    }
    Ok(())
  }
}

/// Upper bounds for order search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxOrders {
  pub p: usize,
  pub d: usize,
  pub q: usize,
}

impl MaxOrders {
  pub fn new(p: usize, d: usize, q: usize) -> Self {
    Self { p, d, q }
  }

  /// Heuristic cap for `n` observations.
  pub fn for_length(n: usize) -> Self {
    let pq = (n / 10).clamp(1, 5);
    Self { p: pq, d: 2, q: pq }
  }
}

/// Configuration of automatic order selection.
#[derive(Debug, Clone, Copy)]
pub struct OrderSearchConfig {
  /// Significance level of the ACF/pACF cut-offs.
  pub alpha: f64,
  /// Non-seasonal bounds. If `None`, [`MaxOrders::for_length`].
  pub max_orders: Option<MaxOrders>,
  /// Seasonal `(P, D, Q)` bounds.
  pub max_seasonal_orders: MaxOrders,
  pub differencing_test: DifferencingTest,
  pub fractional_estimator: FractionalEstimator,
}

impl Default for OrderSearchConfig {
  fn default() -> Self {
    Self {
      alpha: 0.05,
      max_orders: None,
      max_seasonal_orders: MaxOrders::new(1, 1, 1),
      differencing_test: DifferencingTest::default(),
      fractional_estimator: FractionalEstimator::default(),
    }
  }
}
