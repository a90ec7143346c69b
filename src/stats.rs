//! # Stats
//!
//! $$
//! I(\lambda_j)=\frac{1}{2\pi n}\Big|\sum_{t=1}^{n}x_te^{-i\lambda_jt}\Big|^2
//! $$
//!
//! Unit-root and stationarity tests, spectral estimates and memory estimators
//! used during order selection.
pub mod fractional;
pub mod spectral;
pub mod stationarity;
