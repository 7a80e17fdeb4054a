//! Least-squares collocation of quasigeoid signals
//!
//! Pipeline:
//! 1. [`EmpiricalCov::fit`] fits a [`CovFunction`] to control-point signals
//! 2. [`prognosis_nodes`] selects the grid nodes covered by the control points
//! 3. [`prognosis`] predicts the signal and its error at those nodes,
//!    optionally removing a [`TrendModel`] first
//!
//! Distances are angular (degrees) on the auxiliary sphere of the
//! reference ellipsoid, see [`SphericalDistance`].

mod cov_matrix;
mod covariance;
mod diagnostics;
mod distance;
mod empirical;
mod error_matrix;
mod lsc;
mod prognosis;
mod trend;

pub use cov_matrix::{auto_cov_matrix, cross_cov_matrix};
pub use covariance::{CovFunction, CovType};
pub use diagnostics::{rms_of_signals, SignalRms};
pub use distance::SphericalDistance;
pub use empirical::{
    empirical_covariance, CovSample, EmpiricalCov, EmpiricalCovParams, DEFAULT_SEARCH_STEP,
};
pub use error_matrix::{ErrorMatrix, TrendAdjustment};
pub use lsc::{collocate, prognosis, CollocationParams, CollocationResult};
pub use prognosis::prognosis_nodes;
pub use trend::{
    PolynomialTrend, RegressionTrend, TrendModel, TrigonometricTrend, MAX_TREND_DEGREE,
};
