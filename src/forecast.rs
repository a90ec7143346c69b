//! # Forecast
//!
//! $$
//! \hat w_{T+h}=c+\sum_k\phi_k\tilde w_{T+h-k}+\sum_k\theta_k\tilde\varepsilon_{T+h-k},\qquad
//! \tilde\varepsilon_{s}=0\ \text{for}\ s\ge T
//! $$
//!
use chrono::NaiveDateTime;
use ndarray::Array1;

use crate::error::Result;
use crate::error::Status;
use crate::error::TsError;
use crate::order::ModelOrder;

/// Point forecasts on the scale of the original series.
#[derive(Debug, Clone)]
pub struct ForecastResult {
  pub values: Array1<f64>,
  /// Index of the first forecast in the original series.
  pub start: usize,
  /// Timestamps of the forecast targets when the series carries them.
  pub times: Option<Vec<NaiveDateTime>>,
  pub order: ModelOrder,
  pub status: Status,
}

impl ForecastResult {
  pub fn horizon(&self) -> usize {
    self.values.len()
  }
}

/// Timestamps of positions `start..start + horizon`, extending past the end
/// of `times` with its last spacing.
pub fn forecast_times(
  times: &[NaiveDateTime],
  start: usize,
  horizon: usize,
) -> Result<Vec<NaiveDateTime>> {
  let n = times.len();
  if n < 2 {
    return Err(TsError::InsufficientData { needed: 2, got: n });
  }
  let step = times[n - 1] - times[n - 2];
  (start..start + horizon)
    .map(|i| {
      if i < n {
        Ok(times[i])
      } else {
        let ahead = i32::try_from(i + 1 - n).map_err(|_| TsError::NonConvertibleDateTime)?;
        step
          .checked_mul(ahead)
          .and_then(|offset| times[n - 1].checked_add_signed(offset))
          .ok_or(TsError::NonConvertibleDateTime)
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use chrono::TimeDelta;

  use super::forecast_times;
  use crate::series::date_range;

  #[test]
  fn times_extend_with_the_last_step() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
      .unwrap()
      .and_hms_opt(0, 0, 0)
      .unwrap();
    let times = date_range(start, TimeDelta::days(1), 5).unwrap();
    let out = forecast_times(&times, 3, 4).unwrap();
    assert_eq!(out[0], times[3]);
    assert_eq!(out[1], times[4]);
    assert_eq!(out[3], start + TimeDelta::days(6));
  }
}
