//! # Quasigeoid Algorithms
//!
//! Statistical estimation engine for quasigeoid refinement.
//!
//! ## Modules
//!
//! - **collocation**: spherical distance, covariance functions, empirical
//!   covariance fitting, trend models, least-squares collocation and
//!   selection of prediction nodes
//! - **gravity**: gravity field coefficients, Legendre functions and
//!   quasigeoid synthesis of the model surface

pub mod collocation;
pub mod gravity;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::collocation::{
        collocate, empirical_covariance, prognosis, prognosis_nodes, rms_of_signals,
        CollocationParams, CollocationResult, CovFunction, CovType, EmpiricalCov,
        EmpiricalCovParams, PolynomialTrend, RegressionTrend, SignalRms, SphericalDistance,
        TrendModel, TrigonometricTrend,
    };
    pub use crate::gravity::{GeoidSynthesis, GravityFieldModel, GravityModel};
    pub use quasigeoid_core::prelude::*;
}
