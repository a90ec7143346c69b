//! # Ols
//!
//! $$
//! \hat\beta=\arg\min_\beta\lVert y-X\beta\rVert_2^2
//! $$
//!
use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::error::Result;
use crate::error::TsError;

#[derive(Debug, Clone)]
pub struct OlsResult {
  pub beta: Vec<f64>,
  pub std_err: Vec<f64>,
  pub residuals: Vec<f64>,
  pub sse: f64,
  pub sigma2: f64,
  pub nobs: usize,
  pub k: usize,
}

fn design_matrix(y: &[f64], x: &[Vec<f64>]) -> Result<(DMatrix<f64>, DVector<f64>)> {
  if y.is_empty() {
    return Err(TsError::EmptySeries);
  }
  if y.len() != x.len() {
    return Err(TsError::InvalidArgument(format!(
      "response has {} rows but design matrix has {}",
      y.len(),
      x.len()
    )));
  }
  let n = y.len();
  let k = x[0].len();
  if k == 0 {
    return Err(TsError::InvalidArgument(
      "design matrix needs at least one regressor".into(),
    ));
  }
  if x.iter().any(|row| row.len() != k) {
    return Err(TsError::NonContainerType);
  }
  if n <= k {
    return Err(TsError::InsufficientData {
      needed: k + 1,
      got: n,
    });
  }
  if let Some(index) = y.iter().position(|v| !v.is_finite()) {
    return Err(TsError::NonFiniteValue { index });
  }

  let mut flat_x = Vec::with_capacity(n * k);
  for row in x {
    flat_x.extend_from_slice(row);
  }
  if let Some(index) = flat_x.iter().position(|v| !v.is_finite()) {
    return Err(TsError::NonFiniteValue { index: index / k });
  }

  Ok((
    DMatrix::from_row_slice(n, k, &flat_x),
    DVector::from_row_slice(y),
  ))
}

/// Least-squares fit of `y` on the rows of `x`.
///
/// Rank deficiency is detected on the singular values and reported as
/// [`TsError::SingularMatrix`]; stale or zeroed coefficients are never
/// returned.
pub fn ols(y: &[f64], x: &[Vec<f64>]) -> Result<OlsResult> {
  let (x_mat, y_vec) = design_matrix(y, x)?;
  let (n, k) = x_mat.shape();

  let svd = x_mat.clone().svd(true, true);
  let max_sv = svd.singular_values.max();
  if max_sv <= 0.0 || !max_sv.is_finite() {
    return Err(TsError::SingularMatrix);
  }
  let eps = max_sv * n.max(k) as f64 * f64::EPSILON;
  if svd.rank(eps) < k {
    return Err(TsError::SingularMatrix);
  }

  let beta = svd.solve(&y_vec, eps).map_err(|_| TsError::SingularMatrix)?;
  let fitted = &x_mat * &beta;
  let residuals_vec = y_vec - fitted;

  let residuals: Vec<f64> = residuals_vec.iter().copied().collect();
  let sse = residuals.iter().map(|u| u * u).sum::<f64>();
  let dof = (n - k) as f64;
  let sigma2 = (sse / dof).max(0.0);

  let xtx = x_mat.transpose() * &x_mat;
  let Some(xtx_inv) = xtx.try_inverse() else {
    return Err(TsError::SingularMatrix);
  };
  let cov = xtx_inv * sigma2;
  let std_err = (0..k).map(|i| cov[(i, i)].max(0.0).sqrt()).collect();

  Ok(OlsResult {
    beta: beta.iter().copied().collect(),
    std_err,
    residuals,
    sse,
    sigma2,
    nobs: n,
    k,
  })
}

/// `solve(y, X) -> beta`, the coefficient-only view of [`ols`].
pub fn solve(y: &[f64], x: &[Vec<f64>]) -> Result<Vec<f64>> {
  ols(y, x).map(|fit| fit.beta)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::ols;
  use super::solve;
  use crate::error::TsError;

  #[test]
  fn recovers_exact_linear_relation() {
    let x: Vec<Vec<f64>> = (0..20).map(|t| vec![1.0, t as f64]).collect();
    let y: Vec<f64> = (0..20).map(|t| 3.0 - 0.5 * t as f64).collect();
    let fit = ols(&y, &x).unwrap();
    assert_abs_diff_eq!(fit.beta[0], 3.0, epsilon = 1e-10);
    assert_abs_diff_eq!(fit.beta[1], -0.5, epsilon = 1e-10);
    assert!(fit.sse < 1e-18);
  }

  #[test]
  fn collinear_columns_are_reported() {
    let x: Vec<Vec<f64>> = (0..10).map(|t| vec![t as f64, 2.0 * t as f64]).collect();
    let y: Vec<f64> = (0..10).map(|t| t as f64).collect();
    assert_eq!(solve(&y, &x), Err(TsError::SingularMatrix));
  }

  #[test]
  fn rejects_underdetermined_system() {
    let x = vec![vec![1.0, 2.0], vec![1.0, 3.0]];
    let y = vec![1.0, 2.0];
    assert!(matches!(
      ols(&y, &x),
      Err(TsError::InsufficientData { needed: 3, got: 2 })
    ));
  }

  #[test]
  fn rejects_ragged_rows() {
    let x = vec![vec![1.0, 2.0], vec![1.0], vec![1.0, 4.0]];
    let y = vec![1.0, 2.0, 3.0];
    assert_eq!(ols(&y, &x).unwrap_err(), TsError::NonContainerType);
  }
}
