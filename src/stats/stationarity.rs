//! Stationarity and unit-root tests.

pub(crate) mod common;

pub mod adf;
pub mod kpss;

pub use common::DeterministicTerm;
pub use common::LagSelection;
pub use kpss::KPSSTrend;
