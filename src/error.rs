//! # Error
//!
//! $$
//! \text{status}:\ \mathcal{E}\to\{0,1,2,\ldots\}
//! $$
//!
use thiserror::Error;

/// Result alias used by every fallible operation of the crate.
pub type Result<T> = std::result::Result<T, TsError>;

/// Errors raised by series construction, order estimation, fitting,
/// forecasting and diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TsError {
  #[error("input is not a one-dimensional container")]
  NonContainerType,

  #[error("input elements are not arithmetic")]
  NonArithmeticType,

  #[error("timestamps cannot be converted to date-times")]
  NonConvertibleDateTime,

  #[error("timestamp count {times} does not match observation count {values}")]
  TimestampMismatch { values: usize, times: usize },

  #[error("timestamps must be strictly increasing (violated at index {index})")]
  UnorderedTimestamps { index: usize },

  #[error("series is empty")]
  EmptySeries,

  #[error("series contains a non-finite value at index {index}")]
  NonFiniteValue { index: usize },

  #[error("insufficient data: need at least {needed}, got {got}")]
  InsufficientData { needed: usize, got: usize },

  #[error("lag {lag} out of range for series of length {len}")]
  LagOutOfRange { lag: usize, len: usize },

  #[error("index {index} out of range for length {len}")]
  IndexOutOfRange { index: usize, len: usize },

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("series has zero variance")]
  ConstantSeries,

  #[error("design matrix is rank deficient")]
  SingularMatrix,

  #[error("order estimation failed: {0}")]
  OrderEstimationFailure(String),

  #[error("fit did not converge after {iterations} iterations")]
  FitNonConvergence { iterations: usize },

  #[error("model must be fitted first")]
  NotFitted,
}

/// Status codes reported alongside model outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
  Success = 0,
  NonContainerTypeError = 1,
  NonArithmeticTypeError = 2,
  NonConvertibleDateTimeError = 3,
  OrderEstimationFailure = 4,
  FitNonConvergence = 5,
  InsufficientDataError = 6,
  SingularMatrixError = 7,
  PreconditionError = 8,
}

impl Status {
  pub fn is_success(self) -> bool {
    self == Status::Success
  }
}

impl TsError {
  /// Status code of the error.
  pub fn status(&self) -> Status {
    match self {
      TsError::NonContainerType => Status::NonContainerTypeError,
      TsError::NonArithmeticType | TsError::NonFiniteValue { .. } => {
        Status::NonArithmeticTypeError
      }
      TsError::NonConvertibleDateTime
      | TsError::TimestampMismatch { .. }
      | TsError::UnorderedTimestamps { .. } => Status::NonConvertibleDateTimeError,
      TsError::OrderEstimationFailure(_) => Status::OrderEstimationFailure,
      TsError::FitNonConvergence { .. } => Status::FitNonConvergence,
      TsError::InsufficientData { .. } | TsError::EmptySeries => Status::InsufficientDataError,
      TsError::SingularMatrix | TsError::ConstantSeries => Status::SingularMatrixError,
      TsError::LagOutOfRange { .. }
      | TsError::IndexOutOfRange { .. }
      | TsError::InvalidArgument(_)
      | TsError::NotFitted => Status::PreconditionError,
    }
  }

  /// Whether retrying with a different order or bounds can succeed.
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self.status(),
      Status::OrderEstimationFailure
        | Status::FitNonConvergence
        | Status::InsufficientDataError
        | Status::SingularMatrixError
    )
  }
}

#[cfg(test)]
mod tests {
  use super::Status;
  use super::TsError;

  #[test]
  fn messages_carry_context() {
    let err = TsError::InsufficientData { needed: 10, got: 4 };
    assert_eq!(err.to_string(), "insufficient data: need at least 10, got 4");

    let err = TsError::LagOutOfRange { lag: 12, len: 12 };
    assert_eq!(err.to_string(), "lag 12 out of range for series of length 12");
  }

  #[test]
  fn status_codes_match_taxonomy() {
    assert_eq!(TsError::NonContainerType.status() as u8, 1);
    assert_eq!(TsError::NonArithmeticType.status() as u8, 2);
    assert_eq!(TsError::NonConvertibleDateTime.status() as u8, 3);
    assert_eq!(TsError::NotFitted.status(), Status::PreconditionError);
    assert_eq!(
      TsError::FitNonConvergence { iterations: 3 }.status(),
      Status::FitNonConvergence
    );
    assert!(TsError::SingularMatrix.is_recoverable());
    assert!(!TsError::NotFitted.is_recoverable());
    assert!(Status::Success.is_success());
  }
}
