//! Least-squares collocation with an optional deterministic trend
//!
//! Given control signals `L` with noise variances `D` and a covariance
//! function:
//! ```text
//! Cinv = (Ctt + D)⁻¹
//! plain:     ŝ = Cst·Cinv·L
//! trend:     X = (Aᵀ·Cinv·A)⁻¹·Aᵀ·Cinv·L
//!            ŝ = B·X + Cst·Cinv·(L − A·X)
//! ```
//! The per-target error comes from [`ErrorMatrix`].
//!
//! Reference:
//! Moritz, H. (1980). Advanced Physical Geodesy, §14 (collocation with
//! parameters).

use nalgebra::{Cholesky, DMatrix, DVector};
use quasigeoid_core::{ControlPoint, Ellipsoid, Error, Geodetic, Observation, PrognosisNode, Result};
use tracing::debug;

use super::cov_matrix::{auto_cov_matrix, cross_cov_matrix};
use super::covariance::CovFunction;
use super::distance::SphericalDistance;
use super::error_matrix::{ErrorMatrix, TrendAdjustment};
use super::trend::TrendModel;

/// Parameters for collocation
#[derive(Debug, Clone, Default)]
pub struct CollocationParams {
    /// Deterministic trend estimated jointly with the signal; `None` for
    /// plain collocation
    pub trend: Option<TrendModel>,
}

/// Result of collocation
#[derive(Debug, Clone)]
pub struct CollocationResult {
    /// One prediction per target, in target order
    pub predictions: Vec<Observation>,
    /// Estimated trend coefficients, when a trend was requested
    pub trend_coefficients: Option<DVector<f64>>,
}

/// Predict the signal at `targets` from located observations.
///
/// `signals[k]` is the observed signal at `controls[k]`; its error enters
/// the noise matrix as a variance.
///
/// # Errors
/// - [`Error::InsufficientPoints`] with no control points, or fewer
///   control points than trend coefficients
/// - [`Error::SingularMatrix`] when `Ctt + D` is not positive definite or
///   the trend normal matrix is singular
pub fn collocate<T, P>(
    controls: &[T],
    signals: &[Observation],
    targets: &[P],
    cov: &CovFunction,
    ellipsoid: &Ellipsoid,
    params: &CollocationParams,
) -> Result<CollocationResult>
where
    T: Geodetic + Sync,
    P: Geodetic + Sync,
{
    let n = controls.len();
    let m = targets.len();
    if n == 0 {
        return Err(Error::InsufficientPoints { needed: 1, got: 0 });
    }
    if signals.len() != n {
        return Err(Error::InvalidParameter {
            name: "signals",
            value: signals.len().to_string(),
            reason: format!("expected one signal per control point ({n})"),
        });
    }
    if let Some(trend) = &params.trend {
        if n < trend.n_params() {
            return Err(Error::InsufficientPoints {
                needed: trend.n_params(),
                got: n,
            });
        }
    }

    debug!(controls = n, targets = m, trend = ?params.trend, "collocation");

    let sd = SphericalDistance::new(ellipsoid);
    let l = DVector::from_iterator(n, signals.iter().map(|s| s.value()));
    let noise = DVector::from_iterator(n, signals.iter().map(|s| s.error() * s.error()));

    let c = auto_cov_matrix(controls, cov, &sd) + DMatrix::from_diagonal(&noise);
    let cinv = Cholesky::new(c)
        .ok_or(Error::SingularMatrix("control covariance + noise matrix"))?
        .inverse();

    let cst = cross_cov_matrix(targets, controls, cov, &sd);
    let q = &cst * &cinv;

    let (values, errors, coefficients) = match &params.trend {
        None => {
            let s = &q * &l;
            let errors = ErrorMatrix::new(&q, &cst).standard_errors(cov.variance());
            (s, errors, None)
        }
        Some(trend) => {
            let a = trend.impact_matrix(controls);
            let at = a.transpose();
            let exx = (&at * &cinv * &a)
                .try_inverse()
                .ok_or(Error::SingularMatrix("trend normal matrix"))?;
            let x = &exx * &at * &cinv * &l;
            debug!(coefficients = ?x.as_slice(), "estimated trend");

            let b = trend.impact_matrix(targets);
            let s = &q * (&l - &a * &x);
            let values = &b * &x + s;

            let errors = ErrorMatrix::new(&q, &cst)
                .with_trend(TrendAdjustment {
                    a: &a,
                    b: &b,
                    exx: &exx,
                })
                .standard_errors(cov.variance());
            (values, errors, Some(x))
        }
    };

    let predictions = values
        .iter()
        .zip(errors)
        .map(|(&v, e)| Observation::new(v, e))
        .collect();

    Ok(CollocationResult {
        predictions,
        trend_coefficients: coefficients,
    })
}

/// Predict the signal at each node from the control points' signals.
///
/// Returns copies of `nodes`, in the same order, carrying their
/// predictions; the inputs are not modified.
pub fn prognosis(
    controls: &[ControlPoint],
    nodes: &[PrognosisNode],
    cov: &CovFunction,
    ellipsoid: &Ellipsoid,
    params: &CollocationParams,
) -> Result<Vec<PrognosisNode>> {
    let signals = controls
        .iter()
        .map(ControlPoint::signal)
        .collect::<Result<Vec<_>>>()?;

    let result = collocate(controls, &signals, nodes, cov, ellipsoid, params)?;

    Ok(nodes
        .iter()
        .zip(result.predictions)
        .map(|(node, predicted)| node.with_prediction(predicted))
        .collect())
}
