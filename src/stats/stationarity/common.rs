use crate::error::Result;
use crate::error::TsError;
use crate::ols::ols;
use crate::ols::OlsResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeterministicTerm {
  None,
  Constant,
  ConstantTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagSelection {
  Fixed(usize),
  Aic,
  Bic,
}

#[derive(Debug, Clone, Copy)]
pub struct CriticalValues {
  pub one_percent: f64,
  pub five_percent: f64,
  pub ten_percent: f64,
}

impl CriticalValues {
  pub fn value_at(self, alpha: f64) -> f64 {
    if alpha <= 0.01 {
      self.one_percent
    } else if alpha <= 0.05 {
      self.five_percent
    } else {
      self.ten_percent
    }
  }
}

#[derive(Debug, Clone)]
pub struct AdfFit {
  pub lag: usize,
  pub statistic: f64,
  pub nobs: usize,
}

pub fn validate_series(y: &[f64], min_n: usize) -> Result<()> {
  if y.len() < min_n {
    return Err(TsError::InsufficientData {
      needed: min_n,
      got: y.len(),
    });
  }
  if let Some(index) = y.iter().position(|v| !v.is_finite()) {
    return Err(TsError::NonFiniteValue { index });
  }
  Ok(())
}

pub fn validate_alpha(alpha: f64) -> Result<()> {
  if alpha > 0.0 && alpha < 1.0 {
    Ok(())
  } else {
    Err(TsError::InvalidArgument("alpha must be in (0, 1)".into()))
  }
}

pub fn schwert_max_lags(n: usize) -> usize {
  if n <= 1 {
    return 0;
  }
  (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

/// Short Newey-West bandwidth `⌊4 (n/100)^{1/4}⌋`.
pub fn short_bandwidth_lags(n: usize) -> usize {
  if n <= 1 {
    return 0;
  }
  (4.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

pub fn adf_critical_values(det: DeterministicTerm) -> CriticalValues {
  match det {
    // Asymptotic MacKinnon values.
    DeterministicTerm::None => CriticalValues {
      one_percent: -2.58,
      five_percent: -1.95,
      ten_percent: -1.62,
    },
    DeterministicTerm::Constant => CriticalValues {
      one_percent: -3.43,
      five_percent: -2.86,
      ten_percent: -2.57,
    },
    DeterministicTerm::ConstantTrend => CriticalValues {
      one_percent: -3.96,
      five_percent: -3.41,
      ten_percent: -3.13,
    },
  }
}

fn build_adf_design(
  y: &[f64],
  lags: usize,
  det: DeterministicTerm,
) -> Result<(Vec<f64>, Vec<Vec<f64>>, usize)> {
  validate_series(y, 3 + lags)?;
  let dy = crate::transform::difference_at(y, 1, 1);
  let n_dy = dy.len();

  let mut lhs = Vec::with_capacity(n_dy - lags);
  let mut rhs = Vec::with_capacity(n_dy - lags);

  for t in lags..n_dy {
    lhs.push(dy[t]);

    let mut row = Vec::with_capacity(3 + lags);
    match det {
      DeterministicTerm::None => {}
      DeterministicTerm::Constant => row.push(1.0),
      DeterministicTerm::ConstantTrend => {
        row.push(1.0);
        row.push((t + 1) as f64);
      }
    }

    // dy-index t corresponds to original time t+1, so y[t] is the lagged level.
    row.push(y[t]);

    for i in 1..=lags {
      row.push(dy[t - i]);
    }

    rhs.push(row);
  }

  let gamma_index = match det {
    DeterministicTerm::None => 0,
    DeterministicTerm::Constant => 1,
    DeterministicTerm::ConstantTrend => 2,
  };

  Ok((lhs, rhs, gamma_index))
}

pub fn fit_adf(y: &[f64], lags: usize, det: DeterministicTerm) -> Result<AdfFit> {
  let (lhs, rhs, gamma_index) = build_adf_design(y, lags, det)?;
  let ols_fit = ols(&lhs, &rhs)?;

  let gamma = ols_fit.beta[gamma_index];
  let se = ols_fit.std_err[gamma_index];
  // A perfect fit leaves no residual noise: the lagged level is either
  // exactly mean-reverting or exactly persistent.
  let statistic = if se > 0.0 {
    gamma / se
  } else if gamma < 0.0 {
    f64::NEG_INFINITY
  } else {
    f64::INFINITY
  };

  Ok(AdfFit {
    lag: lags,
    statistic,
    nobs: ols_fit.nobs,
  })
}

pub fn aic_from_sse(sse: f64, nobs: usize, k: usize) -> f64 {
  let n = nobs as f64;
  n * (sse / n).ln() + 2.0 * k as f64
}

pub fn bic_from_sse(sse: f64, nobs: usize, k: usize) -> f64 {
  let n = nobs as f64;
  n * (sse / n).ln() + (k as f64) * n.ln()
}

pub fn choose_lag_for_adf(
  y: &[f64],
  det: DeterministicTerm,
  lag_selection: LagSelection,
  max_lags: usize,
) -> Result<usize> {
  if let LagSelection::Fixed(p) = lag_selection {
    return Ok(p);
  }

  let mut best_lag = 0usize;
  let mut best_score = f64::INFINITY;

  for lag in 0..=max_lags {
    let (lhs, rhs, _gamma_idx) = build_adf_design(y, lag, det)?;
    let fit = match ols(&lhs, &rhs) {
      Ok(fit) => fit,
      Err(TsError::SingularMatrix) => continue,
      Err(e) => return Err(e),
    };

    let ic = match lag_selection {
      LagSelection::Aic => aic_from_sse(fit.sse, fit.nobs, fit.k),
      LagSelection::Bic => bic_from_sse(fit.sse, fit.nobs, fit.k),
      LagSelection::Fixed(_) => 0.0,
    };

    if ic < best_score {
      best_score = ic;
      best_lag = lag;
    }
  }

  Ok(best_lag)
}

pub fn newey_west_long_run_variance(u: &[f64], lags: usize) -> f64 {
  let n = u.len();
  if n == 0 {
    return 0.0;
  }
  let n_f = n as f64;

  let gamma0 = u.iter().map(|v| v * v).sum::<f64>() / n_f;
  let mut lr_var = gamma0;

  for j in 1..=lags {
    if j >= n {
      break;
    }
    let weight = 1.0 - (j as f64) / (lags as f64 + 1.0);
    let mut cov = 0.0;
    for t in j..n {
      cov += u[t] * u[t - j];
    }
    cov /= n_f;
    lr_var += 2.0 * weight * cov;
  }

  if lr_var <= 0.0 || !lr_var.is_finite() {
    gamma0.max(1e-12)
  } else {
    lr_var
  }
}

pub fn regress_on_deterministics(y: &[f64], include_trend: bool) -> Result<OlsResult> {
  validate_series(y, if include_trend { 3 } else { 2 })?;
  let x: Vec<Vec<f64>> = (0..y.len())
    .map(|t| {
      if include_trend {
        vec![1.0, (t + 1) as f64]
      } else {
        vec![1.0]
      }
    })
    .collect();
  ols(y, &x)
}
