//! # Transform
//!
//! $$
//! W_t=(1-B)^{d}(1-B^s)^{D}(1-B)^{\delta}X_t,\qquad
//! (1-B)^{\delta}=\sum_{k\ge0}\pi_kB^k,\ \pi_k=\pi_{k-1}\frac{k-1-\delta}{k}
//! $$
//!
//! Pre/post transform stages composed around the ARMA core. Each stage maps
//! a history to a (possibly shorter) stationary series and maps forecasts
//! of that series back to the scale of its input.
use crate::error::Result;
use crate::error::TsError;

/// Default number of fractional-difference weights kept.
pub const FRACTIONAL_TRUNCATION: usize = 1000;

/// `n`-fold difference of `y` at lag `period`.
pub fn difference_at(y: &[f64], period: usize, n: usize) -> Vec<f64> {
  let mut current = y.to_vec();
  for _ in 0..n {
    if current.len() <= period {
      return Vec::new();
    }
    current = current
      .iter()
      .skip(period)
      .zip(current.iter())
      .map(|(curr, prev)| curr - prev)
      .collect();
  }
  current
}

/// Weights `π_0..π_{len-1}` of the expansion of `(1-B)^d`.
pub fn fractional_weights(d: f64, len: usize) -> Vec<f64> {
  let mut w = Vec::with_capacity(len);
  if len == 0 {
    return w;
  }
  w.push(1.0);
  for k in 1..len {
    let prev = w[k - 1];
    w.push(prev * (k as f64 - 1.0 - d) / k as f64);
  }
  w
}

/// Expanding-window fractional difference, truncated after `truncation` weights.
pub fn fractional_difference(y: &[f64], d: f64, truncation: usize) -> Vec<f64> {
  let weights = fractional_weights(d, truncation.min(y.len()).max(1));
  (0..y.len())
    .map(|t| {
      weights
        .iter()
        .take(t + 1)
        .enumerate()
        .map(|(k, w)| w * y[t - k])
        .sum()
    })
    .collect()
}

/// A single invertible transform stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
  /// `(1 - B)`
  Difference,
  /// `(1 - B^s)`
  SeasonalDifference { period: usize },
  /// `(1 - B)^d` for real `d`.
  FractionalDifference { d: f64, truncation: usize },
}

impl Transform {
  /// Leading observations consumed by the stage.
  pub fn offset(&self) -> usize {
    match self {
      Transform::Difference => 1,
      Transform::SeasonalDifference { period } => *period,
      Transform::FractionalDifference { .. } => 0,
    }
  }

  pub fn apply(&self, x: &[f64]) -> Result<Vec<f64>> {
    if x.len() <= self.offset() {
      return Err(TsError::InsufficientData {
        needed: self.offset() + 1,
        got: x.len(),
      });
    }
    Ok(match self {
      Transform::Difference => difference_at(x, 1, 1),
      Transform::SeasonalDifference { period } => difference_at(x, *period, 1),
      Transform::FractionalDifference { d, truncation } => {
        fractional_difference(x, *d, *truncation)
      }
    })
  }

  /// Map forecasts of the transformed series back onto the input scale,
  /// given the input history the forecasts continue.
  pub fn invert_forecast(&self, history: &[f64], forecasts: &[f64]) -> Result<Vec<f64>> {
    if history.len() < self.offset().max(1) {
      return Err(TsError::InsufficientData {
        needed: self.offset().max(1),
        got: history.len(),
      });
    }
    let mut extended = history.to_vec();
    extended.reserve(forecasts.len());
    match self {
      Transform::Difference | Transform::SeasonalDifference { .. } => {
        let lag = self.offset();
        for w in forecasts {
          let prev = extended[extended.len() - lag];
          extended.push(prev + w);
        }
      }
      Transform::FractionalDifference { d, truncation } => {
        let weights = fractional_weights(*d, (*truncation).max(1));
        for w in forecasts {
          let t = extended.len();
          let carried: f64 = weights
            .iter()
            .enumerate()
            .skip(1)
            .take_while(|(k, _)| *k <= t)
            .map(|(k, pi)| pi * extended[t - k])
            .sum();
          extended.push(w - carried);
        }
      }
    }
    Ok(extended.split_off(history.len()))
  }
}

/// Ordered composition of transform stages; stage 0 is applied first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformPipeline {
  stages: Vec<Transform>,
}

impl TransformPipeline {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, stage: Transform) {
    self.stages.push(stage);
  }

  pub fn with(mut self, stage: Transform) -> Self {
    self.push(stage);
    self
  }

  pub fn stages(&self) -> &[Transform] {
    &self.stages
  }

  pub fn is_identity(&self) -> bool {
    self.stages.is_empty()
  }

  /// Leading observations consumed by the whole pipeline.
  pub fn offset(&self) -> usize {
    self.stages.iter().map(Transform::offset).sum()
  }

  /// Input of every stage followed by the final output.
  pub fn levels(&self, x: &[f64]) -> Result<Vec<Vec<f64>>> {
    let mut levels = Vec::with_capacity(self.stages.len() + 1);
    levels.push(x.to_vec());
    for stage in &self.stages {
      let next = stage.apply(levels.last().map(Vec::as_slice).unwrap_or_default())?;
      levels.push(next);
    }
    Ok(levels)
  }

  pub fn apply(&self, x: &[f64]) -> Result<Vec<f64>> {
    let mut current = x.to_vec();
    for stage in &self.stages {
      current = stage.apply(&current)?;
    }
    Ok(current)
  }

  /// Re-integrate forecasts of the final level using the histories in `levels`.
  pub fn invert(&self, levels: &[Vec<f64>], forecasts: &[f64]) -> Result<Vec<f64>> {
    if levels.len() != self.stages.len() + 1 {
      return Err(TsError::InvalidArgument(format!(
        "expected {} levels, got {}",
        self.stages.len() + 1,
        levels.len()
      )));
    }
    let mut current = forecasts.to_vec();
    for (stage, history) in self.stages.iter().zip(levels.iter()).rev() {
      current = stage.invert_forecast(history, &current)?;
    }
    Ok(current)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::fractional_difference;
  use super::fractional_weights;
  use super::Transform;
  use super::TransformPipeline;

  #[test]
  fn integer_weights_match_binomial_expansion() {
    let w = fractional_weights(2.0, 5);
    assert_eq!(w, vec![1.0, -2.0, 1.0, 0.0, 0.0]);
  }

  #[test]
  fn fractional_difference_of_one_is_first_difference() {
    let x = [1.0, 3.0, 6.0, 10.0];
    let w = fractional_difference(&x, 1.0, 100);
    assert_abs_diff_eq!(w[1], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(w[3], 4.0, epsilon = 1e-12);
  }

  #[test]
  fn pipeline_offset_counts_dropped_observations() {
    let p = TransformPipeline::new()
      .with(Transform::SeasonalDifference { period: 4 })
      .with(Transform::Difference)
      .with(Transform::FractionalDifference {
        d: 0.3,
        truncation: 50,
      });
    assert_eq!(p.offset(), 5);
    let x: Vec<f64> = (0..20).map(|t| (t as f64).sin()).collect();
    assert_eq!(p.apply(&x).unwrap().len(), 15);
  }

  #[test]
  fn inversion_reconstructs_held_out_values() {
    let x: Vec<f64> = (0..40)
      .map(|t| 0.3 * t as f64 + (t as f64 * 1.3).sin() + if t % 4 == 0 { 2.0 } else { 0.0 })
      .collect();
    let p = TransformPipeline::new()
      .with(Transform::SeasonalDifference { period: 4 })
      .with(Transform::Difference)
      .with(Transform::FractionalDifference {
        d: 0.25,
        truncation: 1000,
      });

    let (history, future) = x.split_at(30);
    let full = p.apply(&x).unwrap();
    let transformed_future = &full[full.len() - future.len()..];
    let levels = p.levels(history).unwrap();
    let back = p.invert(&levels, transformed_future).unwrap();
    for (a, b) in back.iter().zip(future) {
      assert_abs_diff_eq!(a, b, epsilon = 1e-9);
    }
  }

  #[test]
  fn short_input_is_an_error() {
    let stage = Transform::SeasonalDifference { period: 12 };
    assert!(stage.apply(&[1.0; 12]).is_err());
    assert!(stage.invert_forecast(&[1.0; 3], &[0.0]).is_err());
  }
}
