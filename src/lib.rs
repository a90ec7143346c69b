//! # arima-rs
//!
//! $$
//! \Phi(B^s)\phi(B)(1-B)^{d}(1-B^s)^{D}X_t=c+\beta^\top z_t+\Theta(B^s)\theta(B)\varepsilon_t,
//! \qquad d\in\mathbb N\cup(-\tfrac12,\tfrac12)
//! $$
//!
//! Order selection, estimation, forecasting and residual diagnostics for the
//! ARMA family: ARMA, ARIMA, seasonal ARIMA and fractionally integrated ARMA.
//!
//! ```ignore
//! use arima_rs::prelude::*;
//!
//! let x = ArmaProcess::new(vec![0.6], vec![], 1.0, 500, Some(1)).sample();
//! let mut model = Arima::new(Series::new(x)?, ArimaConfig::arima())?;
//! model.fit()?;
//! let forecast = model.forecast(12, None)?;
//! let white = model.box_ljung_test(0.05)?;
//! ```
pub mod arma;
pub mod correlation;
pub mod diagnostics;
pub mod error;
pub mod forecast;
pub mod model;
pub mod ols;
pub mod order;
pub mod series;
pub mod simulate;
pub mod stats;
pub mod traits;
pub mod transform;

pub use error::Result;
pub use error::Status;
pub use error::TsError;

pub mod prelude {
  pub use crate::arma::EstimationMethod;
  pub use crate::arma::EstimatorConfig;
  pub use crate::correlation::acf;
  pub use crate::correlation::pacf;
  pub use crate::diagnostics::LjungBoxConfig;
  pub use crate::error::Result;
  pub use crate::error::Status;
  pub use crate::error::TsError;
  pub use crate::forecast::ForecastResult;
  pub use crate::model::Arima;
  pub use crate::model::ArimaConfig;
  pub use crate::model::FitResult;
  pub use crate::order::ArimaOrder;
  pub use crate::order::MaxOrders;
  pub use crate::order::ModelOrder;
  pub use crate::order::OrderChoice;
  pub use crate::order::OrderSearchConfig;
  pub use crate::order::SeasonalOrder;
  pub use crate::series::Series;
  pub use crate::simulate::ArfimaProcess;
  pub use crate::simulate::ArimaProcess;
  pub use crate::simulate::ArmaProcess;
  pub use crate::simulate::SarimaProcess;
  pub use crate::traits::ModelExt;
  pub use crate::traits::ProcessExt;
}
