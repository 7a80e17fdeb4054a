//! Covariance matrices between point sets

use nalgebra::DMatrix;
use quasigeoid_core::maybe_rayon::*;
use quasigeoid_core::Geodetic;

use super::covariance::CovFunction;
use super::distance::SphericalDistance;

/// Symmetric covariance matrix of a point set with itself.
///
/// The diagonal is the variance exactly, whatever the distance of a point
/// to itself evaluates to.
pub fn auto_cov_matrix<T: Geodetic + Sync>(
    points: &[T],
    cov: &CovFunction,
    sd: &SphericalDistance,
) -> DMatrix<f64> {
    let n = points.len();
    let variance = cov.variance();

    let data: Vec<f64> = (0..n)
        .into_par_iter()
        .flat_map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        variance
                    } else {
                        // same argument order for (i, j) and (j, i)
                        let (a, b) = if i < j { (i, j) } else { (j, i) };
                        cov.covariance(sd.distance(&points[a], &points[b]))
                    }
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    DMatrix::from_row_slice(n, n, &data)
}

/// Rectangular covariance matrix, rows = `targets`, columns = `controls`
pub fn cross_cov_matrix<P, T>(
    targets: &[P],
    controls: &[T],
    cov: &CovFunction,
    sd: &SphericalDistance,
) -> DMatrix<f64>
where
    P: Geodetic + Sync,
    T: Geodetic + Sync,
{
    let rows = targets.len();
    let cols = controls.len();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|i| {
            controls
                .iter()
                .map(|c| cov.covariance(sd.distance(&targets[i], c)))
                .collect::<Vec<f64>>()
        })
        .collect();

    DMatrix::from_row_slice(rows, cols, &data)
}
