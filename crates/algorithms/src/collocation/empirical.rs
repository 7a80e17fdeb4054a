//! Empirical covariance and covariance-function fitting
//!
//! Fits a [`CovFunction`] to control-point signals:
//!
//! 1. For each point take the minimum and the mean spherical distance to
//!    all other points. Their averages over the set are `minD` (bin width)
//!    and `maxD` (fitting horizon).
//! 2. The sample variance of the signals fixes `C₀`.
//! 3. Every pair `p ≤ i` contributes `(d, (sₚ − s̄)(sᵢ − s̄))` to the
//!    covariance cloud (self pairs contribute the squared deviation at d = 0).
//! 4. The cloud is averaged in bins `(k·minD, (k+1)·minD]` while the right
//!    edge stays below `maxD`, giving the empirical covariance curve.
//! 5. The correlation distance is found by a linear scan over
//!    `[ε, maxD)` with step ε (default 1E-3) minimizing the RMS misfit
//!    between the analytic family and the curve.
//!
//! Reference:
//! Moritz, H. (1980). Advanced Physical Geodesy, §20.
//! Tscherning, C.C. & Rapp, R.H. (1974). Closed covariance expressions.

use std::collections::BTreeMap;

use quasigeoid_core::maybe_rayon::*;
use quasigeoid_core::{ControlPoint, Ellipsoid, Error, Geodetic, Result};
use tracing::{debug, info};

use super::covariance::{CovFunction, CovType};
use super::distance::SphericalDistance;

/// Search step for the correlation distance (degrees)
pub const DEFAULT_SEARCH_STEP: f64 = 1e-3;

/// Parameters for covariance-function fitting
#[derive(Debug, Clone)]
pub struct EmpiricalCovParams {
    /// Step of the correlation-distance scan, also its lower bound (default 1E-3°)
    pub search_step: f64,
}

impl Default for EmpiricalCovParams {
    fn default() -> Self {
        Self {
            search_step: DEFAULT_SEARCH_STEP,
        }
    }
}

/// One point of the empirical covariance curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovSample {
    /// Mean distance of the pairs in the bin (degrees)
    pub distance: f64,
    /// Mean covariance of the pairs in the bin
    pub covariance: f64,
}

/// Fitted covariance function together with the data it was fitted to.
#[derive(Debug, Clone)]
pub struct EmpiricalCov {
    cov_function: CovFunction,
    curve: Vec<CovSample>,
    min_distance: f64,
    max_distance: f64,
    misfit: f64,
}

impl EmpiricalCov {
    /// Fit a covariance function of the given family to the signals of
    /// a control-point set.
    pub fn fit(
        points: &[ControlPoint],
        kind: CovType,
        ellipsoid: &Ellipsoid,
        params: &EmpiricalCovParams,
    ) -> Result<Self> {
        let signals = points
            .iter()
            .map(|p| p.signal().map(|s| s.value()))
            .collect::<Result<Vec<f64>>>()?;
        empirical_covariance(points, &signals, kind, ellipsoid, params)
    }

    /// The fitted covariance function
    pub fn cov_function(&self) -> &CovFunction {
        &self.cov_function
    }

    /// Empirical covariance curve, ordered by distance
    pub fn curve(&self) -> &[CovSample] {
        &self.curve
    }

    /// Average nearest-neighbour distance (bin width), degrees
    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    /// Average mean distance (fitting horizon), degrees
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// RMS misfit of the fitted function against the curve
    pub fn misfit(&self) -> f64 {
        self.misfit
    }
}

/// Fit a covariance function to arbitrary located values.
///
/// `values[k]` is the signal at `points[k]`.
///
/// # Errors
/// - [`Error::InsufficientPoints`] for fewer than 2 points
/// - [`Error::DegenerateDistances`] when points coincide, no bin is
///   populated or the search interval is empty
pub fn empirical_covariance<T: Geodetic + Sync>(
    points: &[T],
    values: &[f64],
    kind: CovType,
    ellipsoid: &Ellipsoid,
    params: &EmpiricalCovParams,
) -> Result<EmpiricalCov> {
    let n = points.len();
    if n < 2 {
        return Err(Error::InsufficientPoints { needed: 2, got: n });
    }
    if values.len() != n {
        return Err(Error::InvalidParameter {
            name: "values",
            value: values.len().to_string(),
            reason: format!("expected one value per point ({n})"),
        });
    }
    if !(params.search_step > 0.0) {
        return Err(Error::InvalidParameter {
            name: "search_step",
            value: params.search_step.to_string(),
            reason: "must be positive".into(),
        });
    }

    let sd = SphericalDistance::new(ellipsoid);
    let (min_d, max_d) = distance_statistics(points, &sd);
    debug!(min_d, max_d, "distance statistics");

    if !(min_d > 0.0) {
        return Err(Error::DegenerateDistances(format!(
            "average nearest-neighbour distance is {min_d}"
        )));
    }

    let variance = sample_variance(values);
    let cloud = covariance_cloud(points, values, &sd);
    let curve = bin_cloud(&cloud, min_d, max_d);
    if curve.is_empty() {
        return Err(Error::DegenerateDistances(format!(
            "no populated bins below {max_d}° with width {min_d}°"
        )));
    }

    let (alpha, misfit) = search_correl_distance(&curve, kind, variance, max_d, params.search_step)
        .ok_or_else(|| {
            Error::DegenerateDistances(format!(
                "empty correlation distance search interval [{}, {max_d})",
                params.search_step
            ))
        })?;

    let cov_function = CovFunction::new(kind, variance, alpha)?;
    info!(
        kind = %kind,
        variance,
        correl_distance = alpha,
        misfit,
        bins = curve.len(),
        "fitted covariance function"
    );

    Ok(EmpiricalCov {
        cov_function,
        curve,
        min_distance: min_d,
        max_distance: max_d,
        misfit,
    })
}

/// Mean over all points of (nearest distance, mean distance) to the others
fn distance_statistics<T: Geodetic + Sync>(points: &[T], sd: &SphericalDistance) -> (f64, f64) {
    let n = points.len();
    let per_point: Vec<(f64, f64)> = (0..n)
        .into_par_iter()
        .map(|p| {
            let mut min = f64::INFINITY;
            let mut sum = 0.0;
            for i in (0..n).filter(|&i| i != p) {
                let d = sd.distance(&points[p], &points[i]);
                min = min.min(d);
                sum += d;
            }
            (min, sum / (n - 1) as f64)
        })
        .collect();

    let (min_sum, ave_sum) = per_point
        .iter()
        .fold((0.0, 0.0), |(a, b), &(min, ave)| (a + min, b + ave));
    (min_sum / n as f64, ave_sum / n as f64)
}

/// Unbiased sample variance
fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0)
}

/// All pairs `p ≤ i` as (distance, product of deviations from the mean)
fn covariance_cloud<T: Geodetic + Sync>(
    points: &[T],
    values: &[f64],
    sd: &SphericalDistance,
) -> Vec<CovSample> {
    let n = points.len();
    let mean = values.iter().sum::<f64>() / n as f64;

    (0..n)
        .into_par_iter()
        .flat_map(|p| {
            let dp = values[p] - mean;
            (p..n)
                .map(|i| {
                    if i == p {
                        CovSample {
                            distance: 0.0,
                            covariance: dp * dp,
                        }
                    } else {
                        CovSample {
                            distance: sd.distance(&points[p], &points[i]),
                            covariance: dp * (values[i] - mean),
                        }
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Average the cloud in bins `(left, right]` of width `width` while
/// `right < horizon`; empty bins are skipped.
///
/// Each sample lands in bin `⌈d / width⌉ − 1` in a single pass, so the
/// cost does not depend on the number of bins.
fn bin_cloud(cloud: &[CovSample], width: f64, horizon: f64) -> Vec<CovSample> {
    let mut bins: BTreeMap<u64, (usize, f64, f64)> = BTreeMap::new();

    for s in cloud.iter().filter(|s| s.distance > 0.0 && s.distance.is_finite()) {
        let k = ((s.distance / width).ceil() - 1.0).max(0.0);
        if (k + 1.0) * width >= horizon {
            continue;
        }
        let bin = bins.entry(k as u64).or_insert((0, 0.0, 0.0));
        bin.0 += 1;
        bin.1 += s.distance;
        bin.2 += s.covariance;
    }

    bins.into_values()
        .map(|(count, dist_sum, cov_sum)| CovSample {
            distance: dist_sum / count as f64,
            covariance: cov_sum / count as f64,
        })
        .collect()
}

/// RMS difference between the analytic family and the empirical curve
pub(crate) fn misfit(curve: &[CovSample], kind: CovType, variance: f64, correl_distance: f64) -> f64 {
    let sq = curve
        .iter()
        .map(|s| {
            let r = s.covariance - kind.covariance(s.distance, correl_distance, variance);
            r * r
        })
        .sum::<f64>();
    (sq / curve.len() as f64).sqrt()
}

/// Scan `α = step, 2·step, …` while `α < horizon`; the first strictly
/// lowest misfit wins. Candidates are evaluated in parallel and reduced
/// in ascending order, so the result matches a sequential scan.
fn search_correl_distance(
    curve: &[CovSample],
    kind: CovType,
    variance: f64,
    horizon: f64,
    step: f64,
) -> Option<(f64, f64)> {
    let count = (horizon / step).ceil() as usize;

    let candidates: Vec<(f64, f64)> = (1..=count)
        .into_par_iter()
        .map(|k| k as f64 * step)
        .filter(|&alpha| alpha < horizon)
        .map(|alpha| (alpha, misfit(curve, kind, variance, alpha)))
        .collect();

    let mut best: Option<(f64, f64)> = None;
    for (alpha, res) in candidates {
        match best {
            Some((_, best_res)) if !(res < best_res) => {}
            _ if res.is_nan() => {}
            _ => best = Some((alpha, res)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quasigeoid_core::{GeodeticPoint, RefSystem};

    fn grs80() -> Ellipsoid {
        RefSystem::Grs80.ellipsoid()
    }

    /// 5×5 lattice with a smooth signal
    fn lattice() -> (Vec<GeodeticPoint>, Vec<f64>) {
        let mut points = Vec::new();
        let mut values = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let lat = 52.0 + 0.25 * i as f64;
                let lon = 26.0 + 0.4 * j as f64;
                points.push(GeodeticPoint::new(lat, lon));
                values.push(0.3 * (lat * 3.0).sin() + 0.2 * (lon * 2.0).cos());
            }
        }
        (points, values)
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![GeodeticPoint::new(52.0, 27.0)];
        let err = empirical_covariance(
            &points,
            &[0.5],
            CovType::Hirvonen,
            &grs80(),
            &EmpiricalCovParams::default(),
        );
        assert!(matches!(err, Err(Error::InsufficientPoints { needed: 2, got: 1 })));
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        let points = vec![GeodeticPoint::new(52.0, 27.0); 3];
        let err = empirical_covariance(
            &points,
            &[0.1, 0.2, 0.3],
            CovType::Hirvonen,
            &grs80(),
            &EmpiricalCovParams::default(),
        );
        assert!(matches!(err, Err(Error::DegenerateDistances(_))));
    }

    #[test]
    fn test_variance_is_sample_variance() {
        let (points, values) = lattice();
        let fit = empirical_covariance(
            &points,
            &values,
            CovType::Hirvonen,
            &grs80(),
            &EmpiricalCovParams::default(),
        )
        .unwrap();

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert_relative_eq!(fit.cov_function().variance(), var, epsilon = 1e-15);
    }

    #[test]
    fn test_fitted_distance_is_arg_min() {
        let (points, values) = lattice();
        let params = EmpiricalCovParams::default();
        for kind in CovType::ALL {
            let fit = empirical_covariance(&points, &values, kind, &grs80(), &params).unwrap();
            let f = fit.cov_function();
            assert!(f.correl_distance() > 0.0);
            assert!(f.correl_distance() < fit.max_distance());

            let best = misfit(fit.curve(), kind, f.variance(), f.correl_distance());
            assert_relative_eq!(best, fit.misfit(), epsilon = 1e-15);

            let mut k = 1;
            while (k as f64) * params.search_step < fit.max_distance() {
                let other = misfit(fit.curve(), kind, f.variance(), k as f64 * params.search_step);
                assert!(best <= other, "{kind}: misfit at candidate {k} is lower");
                k += 1;
            }
        }
    }

    #[test]
    fn test_curve_bins_are_ordered_and_bounded() {
        let (points, values) = lattice();
        let fit = empirical_covariance(
            &points,
            &values,
            CovType::Gaussian,
            &grs80(),
            &EmpiricalCovParams::default(),
        )
        .unwrap();

        let curve = fit.curve();
        assert!(!curve.is_empty());
        for pair in curve.windows(2) {
            assert!(pair[0].distance < pair[1].distance);
        }
        assert!(curve.iter().all(|s| s.distance > 0.0 && s.distance < fit.max_distance()));
        assert!(fit.min_distance() < fit.max_distance());
    }

    #[test]
    fn test_bin_cloud_half_open() {
        let cloud = vec![
            CovSample { distance: 0.0, covariance: 9.0 },
            CovSample { distance: 1.0, covariance: 2.0 },
            CovSample { distance: 0.5, covariance: 4.0 },
            CovSample { distance: 2.5, covariance: 1.0 },
            CovSample { distance: 4.0, covariance: 7.0 },
        ];
        let curve = bin_cloud(&cloud, 1.0, 3.5);
        // bins (0,1], (1,2] is empty and skipped, (2,3]
        assert_eq!(curve.len(), 2);
        assert_relative_eq!(curve[0].distance, 0.75);
        assert_relative_eq!(curve[0].covariance, 3.0);
        assert_relative_eq!(curve[1].distance, 2.5);
        assert_relative_eq!(curve[1].covariance, 1.0);
    }

    #[test]
    fn test_bin_cloud_matches_edge_scan() {
        let cloud: Vec<CovSample> = (0..200)
            .map(|k| CovSample {
                distance: ((k * 37) % 101) as f64 * 0.013,
                covariance: ((k * 11) % 7) as f64 - 3.0,
            })
            .collect();
        let (width, horizon) = (0.0725, 1.1);

        let mut expected = Vec::new();
        let mut k = 0.0;
        while (k + 1.0) * width < horizon {
            let (left, right) = (k * width, (k + 1.0) * width);
            let members: Vec<&CovSample> = cloud
                .iter()
                .filter(|s| s.distance > left && s.distance <= right)
                .collect();
            if !members.is_empty() {
                let n = members.len() as f64;
                expected.push((
                    members.iter().map(|s| s.distance).sum::<f64>() / n,
                    members.iter().map(|s| s.covariance).sum::<f64>() / n,
                ));
            }
            k += 1.0;
        }

        let curve = bin_cloud(&cloud, width, horizon);
        assert_eq!(curve.len(), expected.len());
        for (s, (d, c)) in curve.iter().zip(&expected) {
            assert_relative_eq!(s.distance, *d, epsilon = 1e-12);
            assert_relative_eq!(s.covariance, *c, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_near_coincident_pairs_bin_quickly() {
        // ten pairs 1e-9° apart: a bin width of 1e-9° against a 0.8° horizon
        let mut points = Vec::new();
        let mut values = Vec::new();
        for i in 0..10 {
            let lat = 52.0 + 0.1 * i as f64;
            let lon = 27.0 + 0.05 * i as f64;
            points.push(GeodeticPoint::new(lat, lon));
            points.push(GeodeticPoint::new(lat + 1e-9, lon));
            values.push(0.1 * i as f64);
            values.push(0.1 * i as f64 + 0.01);
        }

        let start = std::time::Instant::now();
        let fit = empirical_covariance(
            &points,
            &values,
            CovType::Hirvonen,
            &grs80(),
            &EmpiricalCovParams::default(),
        )
        .unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(5));
        assert!(fit.min_distance() < 1e-6);
        assert!(!fit.curve().is_empty());
    }

    #[test]
    fn test_search_first_minimum_wins() {
        // a flat zero curve fits every candidate equally well
        let curve = vec![CovSample { distance: 0.3, covariance: 0.0 }];
        let (alpha, res) = search_correl_distance(&curve, CovType::Hirvonen, 0.0, 1.0, 1e-3).unwrap();
        assert_relative_eq!(alpha, 1e-3);
        assert_eq!(res, 0.0);

        assert!(search_correl_distance(&curve, CovType::Hirvonen, 0.0, 1e-3, 1e-3).is_none());
    }
}
