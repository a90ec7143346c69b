//! # Series
//!
//! $$
//! (1-B)^d X_t,\qquad (1-B^s)^D X_t
//! $$
//!
//! Ordered observations with optional, strictly increasing timestamps.
use std::ops::Add;
use std::ops::Mul;

use chrono::NaiveDateTime;
use chrono::TimeDelta;
use ndarray::s;
use ndarray::Array1;

use crate::error::Result;
use crate::error::TsError;

/// Generate `len` timestamps starting at `start`, spaced by `step`.
pub fn date_range(start: NaiveDateTime, step: TimeDelta, len: usize) -> Result<Vec<NaiveDateTime>> {
  if step <= TimeDelta::zero() {
    return Err(TsError::InvalidArgument("timestamp step must be positive".into()));
  }
  let mut times = Vec::with_capacity(len);
  let mut current = start;
  for _ in 0..len {
    times.push(current);
    current = current
      .checked_add_signed(step)
      .ok_or(TsError::NonConvertibleDateTime)?;
  }
  Ok(times)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
  values: Array1<f64>,
  times: Option<Vec<NaiveDateTime>>,
}

fn check_values(values: Array1<f64>) -> Result<Array1<f64>> {
  if let Some(index) = values.iter().position(|v| !v.is_finite()) {
    return Err(TsError::NonFiniteValue { index });
  }
  Ok(values.as_standard_layout().into_owned())
}

fn check_times(times: &[NaiveDateTime], len: usize) -> Result<()> {
  if times.len() != len {
    return Err(TsError::TimestampMismatch {
      values: len,
      times: times.len(),
    });
  }
  if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
    return Err(TsError::UnorderedTimestamps { index: i + 1 });
  }
  Ok(())
}

impl Series {
  pub fn new(values: impl Into<Array1<f64>>) -> Result<Self> {
    let values = check_values(values.into())?;
    Ok(Self {
      values,
      times: None,
    })
  }

  pub fn with_times(values: impl Into<Array1<f64>>, times: Vec<NaiveDateTime>) -> Result<Self> {
    let values = check_values(values.into())?;
    check_times(&times, values.len())?;
    Ok(Self {
      values,
      times: Some(times),
    })
  }

  /// Label the observations from `start` onwards, one `step` apart.
  pub fn with_start(values: impl Into<Array1<f64>>, start: NaiveDateTime, step: TimeDelta) -> Result<Self> {
    let values = values.into();
    let times = date_range(start, step, values.len())?;
    Self::with_times(values, times)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn values(&self) -> &Array1<f64> {
    &self.values
  }

  pub fn as_slice(&self) -> &[f64] {
    // Storage is kept in standard layout by every constructor.
    self.values.as_slice().unwrap_or(&[])
  }

  pub fn times(&self) -> Option<&[NaiveDateTime]> {
    self.times.as_deref()
  }

  pub fn has_time_labels(&self) -> bool {
    self.times.is_some()
  }

  pub fn set_times(&mut self, times: Vec<NaiveDateTime>) -> Result<()> {
    check_times(&times, self.len())?;
    self.times = Some(times);
    Ok(())
  }

  /// Observations `start..end`.
  pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
    if end > self.len() {
      return Err(TsError::IndexOutOfRange {
        index: end,
        len: self.len(),
      });
    }
    if start >= end {
      return Err(TsError::InvalidArgument(format!(
        "empty range {start}..{end}"
      )));
    }
    Ok(Self {
      values: self.values.slice(s![start..end]).to_owned(),
      times: self.times.as_ref().map(|t| t[start..end].to_vec()),
    })
  }

  /// Shift by `k` steps: positive `k` pairs each timestamp with the value
  /// `k` steps earlier, negative `k` with the value `|k|` steps later.
  /// Observations without a counterpart are dropped.
  pub fn lag(&self, k: isize) -> Result<Self> {
    let shift = k.unsigned_abs();
    if shift >= self.len() {
      return Err(TsError::LagOutOfRange {
        lag: shift,
        len: self.len(),
      });
    }
    let n = self.len();
    let (vals, times) = if k >= 0 {
      (
        self.values.slice(s![..n - shift]).to_owned(),
        self.times.as_ref().map(|t| t[shift..].to_vec()),
      )
    } else {
      (
        self.values.slice(s![shift..]).to_owned(),
        self.times.as_ref().map(|t| t[..n - shift].to_vec()),
      )
    };
    Ok(Self {
      values: vals,
      times,
    })
  }

  /// `n`-th order consecutive difference; the first `n` timestamps are dropped.
  pub fn diff(&self, n: usize) -> Result<Self> {
    self.seasonal_diff(n, 1)
  }

  /// `n`-fold difference at lag `period`.
  pub fn seasonal_diff(&self, n: usize, period: usize) -> Result<Self> {
    if period == 0 {
      return Err(TsError::InvalidArgument("period must be positive".into()));
    }
    let drop = n * period;
    if drop >= self.len() {
      return Err(TsError::InsufficientData {
        needed: drop + 1,
        got: self.len(),
      });
    }
    let values = Array1::from(crate::transform::difference_at(self.as_slice(), period, n));
    Ok(Self {
      values,
      times: self.times.as_ref().map(|t| t[drop..].to_vec()),
    })
  }

  /// Undo `order` consecutive differences.
  ///
  /// `initial` holds the first value at each differencing level, outermost
  /// first: for a series produced by `x.diff(d)` pass
  /// `[x[0], Δx[0], …, Δ^{d-1}x[0]]`. `x.diff(d)?.integrate(d, &init)`
  /// reproduces `x`.
  pub fn integrate(&self, order: usize, initial: &[f64]) -> Result<Self> {
    if initial.len() != order {
      return Err(TsError::InvalidArgument(format!(
        "integration of order {order} needs {order} initial values, got {}",
        initial.len()
      )));
    }
    let mut current = self.values.to_vec();
    for level in (0..order).rev() {
      let mut next = Vec::with_capacity(current.len() + 1);
      let mut acc = initial[level];
      next.push(acc);
      for d in &current {
        acc += d;
        next.push(acc);
      }
      current = next;
    }
    Ok(Self {
      values: Array1::from(current),
      times: None,
    })
  }

  /// First value at each differencing level, as expected by [`Series::integrate`].
  pub fn initial_values(&self, order: usize) -> Result<Vec<f64>> {
    if order >= self.len() {
      return Err(TsError::InsufficientData {
        needed: order + 1,
        got: self.len(),
      });
    }
    let mut current = self.as_slice().to_vec();
    let mut initial = Vec::with_capacity(order);
    for _ in 0..order {
      initial.push(current[0]);
      current = crate::transform::difference_at(&current, 1, 1);
    }
    Ok(initial)
  }

  /// Insert `other` before position `index` (default: at the end).
  ///
  /// Time labels are kept only when both series carry them, and the
  /// combined labels must stay strictly increasing.
  pub fn append(&mut self, other: &Series, index: Option<usize>) -> Result<()> {
    let at = index.unwrap_or(self.len());
    if at > self.len() {
      return Err(TsError::IndexOutOfRange {
        index: at,
        len: self.len(),
      });
    }
    let mut values = Vec::with_capacity(self.len() + other.len());
    values.extend_from_slice(&self.as_slice()[..at]);
    values.extend_from_slice(other.as_slice());
    values.extend_from_slice(&self.as_slice()[at..]);

    let times = match (&self.times, &other.times) {
      (Some(a), Some(b)) => {
        let mut merged = Vec::with_capacity(a.len() + b.len());
        merged.extend_from_slice(&a[..at]);
        merged.extend_from_slice(b);
        merged.extend_from_slice(&a[at..]);
        check_times(&merged, values.len())?;
        Some(merged)
      }
      _ => None,
    };

    self.values = Array1::from(values);
    self.times = times;
    Ok(())
  }
}

impl TryFrom<Vec<f64>> for Series {
  type Error = TsError;

  fn try_from(values: Vec<f64>) -> Result<Self> {
    Series::new(values)
  }
}

impl Add<f64> for &Series {
  type Output = Series;

  fn add(self, rhs: f64) -> Series {
    Series {
      values: &self.values + rhs,
      times: self.times.clone(),
    }
  }
}

impl Mul<f64> for &Series {
  type Output = Series;

  fn mul(self, rhs: f64) -> Series {
    Series {
      values: &self.values * rhs,
      times: self.times.clone(),
    }
  }
}

impl Add<&Series> for &Series {
  type Output = Result<Series>;

  fn add(self, rhs: &Series) -> Result<Series> {
    if self.len() != rhs.len() {
      return Err(TsError::InvalidArgument(format!(
        "cannot add series of lengths {} and {}",
        self.len(),
        rhs.len()
      )));
    }
    Ok(Series {
      values: &self.values + &rhs.values,
      times: self.times.clone().or_else(|| rhs.times.clone()),
    })
  }
}
