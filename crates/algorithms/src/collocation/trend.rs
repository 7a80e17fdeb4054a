//! Trend (impact) matrices
//!
//! A trend model turns an ordered point list into a regressor matrix `A`
//! with one row per point; collocation estimates the coefficients `X` of
//! the deterministic part `A·X` before predicting the stochastic signal.
//!
//! Families:
//! - **Constant**: a single column of ones
//! - **Polynomial** `(nφ, nλ)`: `(φ−φ₀)ⁿ(λ−λ₀)ᵐ` in degrees for
//!   `0≤n≤nφ, 0≤m≤nλ`, column `n·(nλ+1) + m`
//! - **Regression series** `(x, y, total)`: `1`, `φ¹…φˣ`, `λ¹…λʸ`, then
//!   cross terms `φⁱλʲ` with `i+j ≤ total`, in radians
//! - **Trigonometric** of order 3, 4 or 5 (see [`TrigonometricTrend`])

use std::fmt;

use nalgebra::DMatrix;
use quasigeoid_core::maybe_rayon::*;
use quasigeoid_core::{Error, Geodetic, Result};

/// Highest degree accepted by the polynomial and regression families
pub const MAX_TREND_DEGREE: u32 = 5;

/// Polynomial surface in latitude and longitude degrees about `(lat0, lon0)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialTrend {
    deg_lat: u32,
    deg_lon: u32,
    lat0: f64,
    lon0: f64,
}

impl PolynomialTrend {
    pub fn new(deg_lat: u32, deg_lon: u32, lat0: f64, lon0: f64) -> Result<Self> {
        let valid = 1..=MAX_TREND_DEGREE;
        if !valid.contains(&deg_lat) || !valid.contains(&deg_lon) {
            return Err(Error::InvalidTrendDegree(format!(
                "polynomial degrees ({deg_lat}, {deg_lon}) must lie in 1..={MAX_TREND_DEGREE}"
            )));
        }
        Ok(Self {
            deg_lat,
            deg_lon,
            lat0,
            lon0,
        })
    }

    /// Polynomial centered on the mean coordinates of `points`
    pub fn centered<G: Geodetic>(deg_lat: u32, deg_lon: u32, points: &[G]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InsufficientPoints { needed: 1, got: 0 });
        }
        let n = points.len() as f64;
        let lat0 = points.iter().map(|p| p.lat_deg()).sum::<f64>() / n;
        let lon0 = points.iter().map(|p| p.lon_deg()).sum::<f64>() / n;
        Self::new(deg_lat, deg_lon, lat0, lon0)
    }

    pub fn degrees(&self) -> (u32, u32) {
        (self.deg_lat, self.deg_lon)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.lat0, self.lon0)
    }

    fn n_params(&self) -> usize {
        ((self.deg_lat + 1) * (self.deg_lon + 1)) as usize
    }

    fn row<G: Geodetic + ?Sized>(&self, p: &G) -> Vec<f64> {
        let dlat = p.lat_deg() - self.lat0;
        let dlon = p.lon_deg() - self.lon0;
        let mut row = Vec::with_capacity(self.n_params());
        for n in 0..=self.deg_lat {
            for m in 0..=self.deg_lon {
                row.push(dlat.powi(n as i32) * dlon.powi(m as i32));
            }
        }
        row
    }
}

/// Nested bilinear polynomial series in latitude/longitude radians
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegressionTrend {
    deg_x: u32,
    deg_y: u32,
    total: u32,
}

impl RegressionTrend {
    pub fn new(deg_x: u32, deg_y: u32, total: u32) -> Result<Self> {
        if !(1..=MAX_TREND_DEGREE).contains(&total)
            || !(1..=total).contains(&deg_x)
            || !(1..=total).contains(&deg_y)
        {
            return Err(Error::InvalidTrendDegree(format!(
                "regression degrees ({deg_x}, {deg_y}, {total}) need 1 ≤ x, y ≤ total ≤ {MAX_TREND_DEGREE}"
            )));
        }
        Ok(Self {
            deg_x,
            deg_y,
            total,
        })
    }

    pub fn degrees(&self) -> (u32, u32, u32) {
        (self.deg_x, self.deg_y, self.total)
    }

    fn cross_terms(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (1..=self.deg_x)
            .flat_map(move |i| (1..=self.deg_y).map(move |j| (i, j)))
            .filter(move |(i, j)| i + j <= self.total)
    }

    fn n_params(&self) -> usize {
        1 + self.deg_x as usize + self.deg_y as usize + self.cross_terms().count()
    }

    fn row<G: Geodetic + ?Sized>(&self, p: &G) -> Vec<f64> {
        let x = p.lat_rad();
        let y = p.lon_rad();
        let mut row = Vec::with_capacity(self.n_params());
        row.push(1.0);
        row.extend((1..=self.deg_x).map(|i| x.powi(i as i32)));
        row.extend((1..=self.deg_y).map(|j| y.powi(j as i32)));
        row.extend(
            self.cross_terms()
                .map(|(i, j)| x.powi(i as i32) * y.powi(j as i32)),
        );
        row
    }
}

/// Trigonometric bases of the geodetic latitude φ and longitude λ:
///
/// | order | columns |
/// |-------|---------|
/// | 3 | `cosφ·cosλ, cosφ·sinλ, sinφ` |
/// | 4 | `cosφ·cosλ, cosφ·sinλ, sinφ, 1` |
/// | 5 | `1, cosφ·cosλ, cosφ·sinλ, sinφ, sin²φ` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrigonometricTrend {
    order: u32,
}

impl TrigonometricTrend {
    pub fn new(order: u32) -> Result<Self> {
        if !(3..=5).contains(&order) {
            return Err(Error::InvalidTrendDegree(format!(
                "trigonometric order {order} must be 3, 4 or 5"
            )));
        }
        Ok(Self { order })
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    fn row<G: Geodetic + ?Sized>(&self, p: &G) -> Vec<f64> {
        let (sin_lat, cos_lat) = p.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = p.lon_rad().sin_cos();
        let c = cos_lat * cos_lon;
        let s = cos_lat * sin_lon;
        match self.order {
            3 => vec![c, s, sin_lat],
            4 => vec![c, s, sin_lat, 1.0],
            _ => vec![1.0, c, s, sin_lat, sin_lat * sin_lat],
        }
    }
}

/// Closed set of deterministic trend families
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendModel {
    Constant,
    Polynomial(PolynomialTrend),
    Regression(RegressionTrend),
    Trigonometric(TrigonometricTrend),
}

impl TrendModel {
    /// Number of trend coefficients (columns of the impact matrix)
    pub fn n_params(&self) -> usize {
        match self {
            TrendModel::Constant => 1,
            TrendModel::Polynomial(t) => t.n_params(),
            TrendModel::Regression(t) => t.n_params(),
            TrendModel::Trigonometric(t) => t.order as usize,
        }
    }

    /// Regressor row of a single point
    pub fn row<G: Geodetic + ?Sized>(&self, p: &G) -> Vec<f64> {
        match self {
            TrendModel::Constant => vec![1.0],
            TrendModel::Polynomial(t) => t.row(p),
            TrendModel::Regression(t) => t.row(p),
            TrendModel::Trigonometric(t) => t.row(p),
        }
    }

    /// Impact matrix: one row per point, `n_params()` columns
    pub fn impact_matrix<G: Geodetic + Sync>(&self, points: &[G]) -> DMatrix<f64> {
        let data: Vec<f64> = points
            .par_iter()
            .flat_map(|p| self.row(p))
            .collect();
        DMatrix::from_row_slice(points.len(), self.n_params(), &data)
    }
}

impl fmt::Display for TrendModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendModel::Constant => write!(f, "constant"),
            TrendModel::Polynomial(t) => write!(
                f,
                "polynomial ({}, {}) about ({:.4}, {:.4})",
                t.deg_lat, t.deg_lon, t.lat0, t.lon0
            ),
            TrendModel::Regression(t) => {
                write!(f, "regression series ({}, {}, {})", t.deg_x, t.deg_y, t.total)
            }
            TrendModel::Trigonometric(t) => write!(f, "trigonometric ({})", t.order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quasigeoid_core::GeodeticPoint;

    fn points() -> Vec<GeodeticPoint> {
        vec![
            GeodeticPoint::new(52.0, 27.0),
            GeodeticPoint::new(52.5, 28.0),
            GeodeticPoint::new(53.25, 26.5),
        ]
    }

    #[test]
    fn test_invalid_degrees() {
        assert!(matches!(
            PolynomialTrend::new(0, 2, 0.0, 0.0),
            Err(Error::InvalidTrendDegree(_))
        ));
        assert!(PolynomialTrend::new(2, 6, 0.0, 0.0).is_err());
        assert!(RegressionTrend::new(1, 1, 0).is_err());
        assert!(RegressionTrend::new(3, 1, 2).is_err());
        assert!(RegressionTrend::new(1, 0, 2).is_err());
        assert!(RegressionTrend::new(2, 2, 6).is_err());
        assert!(TrigonometricTrend::new(2).is_err());
        assert!(TrigonometricTrend::new(6).is_err());
    }

    #[test]
    fn test_polynomial_layout() {
        let t = TrendModel::Polynomial(PolynomialTrend::new(2, 1, 52.0, 27.0).unwrap());
        assert_eq!(t.n_params(), 6);

        let a = t.impact_matrix(&points());
        assert_eq!(a.shape(), (3, 6));
        // point 1: dlat = 0.5, dlon = 1.0; column n*(nlon+1)+m
        let expected = [1.0, 1.0, 0.5, 0.5, 0.25, 0.25];
        for (k, e) in expected.iter().enumerate() {
            assert_relative_eq!(a[(1, k)], *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_polynomial_centered() {
        let t = PolynomialTrend::centered(1, 1, &points()).unwrap();
        let (lat0, lon0) = t.center();
        assert_relative_eq!(lat0, 52.583333333333336, epsilon = 1e-12);
        assert_relative_eq!(lon0, 27.166666666666668, epsilon = 1e-12);
        let none: Vec<GeodeticPoint> = Vec::new();
        assert!(PolynomialTrend::centered(1, 1, &none).is_err());
    }

    #[test]
    fn test_regression_layout() {
        let t = RegressionTrend::new(2, 2, 3).unwrap();
        // 1, x, x², y, y², xy, xy², x²y
        let model = TrendModel::Regression(t);
        assert_eq!(model.n_params(), 8);

        let p = GeodeticPoint::new(52.5, 28.0);
        let (x, y) = (p.lat_rad(), p.lon_rad());
        let row = model.row(&p);
        let expected = [1.0, x, x * x, y, y * y, x * y, x * y * y, x * x * y];
        assert_eq!(row.len(), expected.len());
        for (r, e) in row.iter().zip(expected) {
            assert_relative_eq!(*r, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_regression_111_has_no_cross_terms() {
        let t = TrendModel::Regression(RegressionTrend::new(1, 1, 1).unwrap());
        assert_eq!(t.n_params(), 3);
        let t = TrendModel::Regression(RegressionTrend::new(1, 1, 2).unwrap());
        assert_eq!(t.n_params(), 4);
    }

    #[test]
    fn test_trigonometric_orders() {
        let p = GeodeticPoint::new(52.5, 28.0);
        let (sl, cl) = p.lat_rad().sin_cos();
        let (sn, cn) = p.lon_rad().sin_cos();

        let t3 = TrendModel::Trigonometric(TrigonometricTrend::new(3).unwrap());
        let t4 = TrendModel::Trigonometric(TrigonometricTrend::new(4).unwrap());
        let t5 = TrendModel::Trigonometric(TrigonometricTrend::new(5).unwrap());

        assert_eq!(t3.row(&p), vec![cl * cn, cl * sn, sl]);
        assert_eq!(t4.row(&p), vec![cl * cn, cl * sn, sl, 1.0]);
        assert_eq!(t5.row(&p), vec![1.0, cl * cn, cl * sn, sl, sl * sl]);
        assert_eq!(t5.n_params(), 5);
    }

    #[test]
    fn test_lower_degree_columns_are_prefix() {
        let pts = points();
        let constant = TrendModel::Constant.impact_matrix(&pts);

        let higher = [
            TrendModel::Regression(RegressionTrend::new(1, 1, 1).unwrap()),
            TrendModel::Polynomial(PolynomialTrend::new(1, 1, 52.0, 27.0).unwrap()),
            TrendModel::Trigonometric(TrigonometricTrend::new(5).unwrap()),
        ];
        for model in higher {
            let a = model.impact_matrix(&pts);
            assert_eq!(a.column(0), constant.column(0), "{model}");
        }

        let t3 = TrendModel::Trigonometric(TrigonometricTrend::new(3).unwrap()).impact_matrix(&pts);
        let t4 = TrendModel::Trigonometric(TrigonometricTrend::new(4).unwrap()).impact_matrix(&pts);
        assert_eq!(t4.columns(0, 3), t3.columns(0, 3));
    }

    #[test]
    fn test_empty_point_list() {
        let none: Vec<GeodeticPoint> = Vec::new();
        assert_eq!(TrendModel::Constant.impact_matrix(&none).shape(), (0, 1));
    }
}
