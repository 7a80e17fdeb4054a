//! Control points: sites where both a geometric height anomaly and the model
//! surface are known

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::surface::ModelSurface;

use super::{Geodetic, GeodeticPoint, Observation};

/// Height errors are never exactly zero; a zero input error is replaced by
/// this value so the noise matrix stays nonsingular.
pub const MIN_HEIGHT_ERROR: f64 = 0.001;

/// An observed point of the collocation.
///
/// * `geometric` = geodetic height − normal height, fixed at construction
/// * `model` = model surface at this point, evaluated on demand
/// * `signal` = `geometric − model`
///
/// The model surface is shared, never owned.
#[derive(Clone)]
pub struct ControlPoint {
    point: GeodeticPoint,
    geometric: Observation,
    surface: Arc<dyn ModelSurface>,
}

impl ControlPoint {
    /// Start building a control point at the given coordinates
    pub fn builder(lat_deg: f64, lon_deg: f64, surface: Arc<dyn ModelSurface>) -> ControlPointBuilder {
        ControlPointBuilder {
            lat_deg,
            lon_deg,
            surface,
            geodetic: 0.0,
            normal: 0.0,
            geodetic_error: 0.0,
            normal_error: 0.0,
        }
    }

    pub fn point(&self) -> &GeodeticPoint {
        &self.point
    }

    /// Geometric height anomaly (geodetic − normal height)
    pub fn geometric(&self) -> Observation {
        self.geometric
    }

    /// Model-surface value at this point (error 0)
    pub fn model(&self) -> Result<Observation> {
        self.surface
            .height(self.point.lat_deg(), self.point.lon_deg())
            .map(Observation::exact)
    }

    /// Residual of the geometric anomaly against the model surface
    pub fn signal(&self) -> Result<Observation> {
        Ok(self.geometric.minus(&self.model()?))
    }
}

impl Geodetic for ControlPoint {
    fn lat_deg(&self) -> f64 {
        self.point.lat_deg()
    }

    fn lon_deg(&self) -> f64 {
        self.point.lon_deg()
    }

    fn lat_rad(&self) -> f64 {
        self.point.lat_rad()
    }

    fn lon_rad(&self) -> f64 {
        self.point.lon_rad()
    }
}

impl PartialEq for ControlPoint {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point && self.geometric == other.geometric
    }
}

impl fmt::Debug for ControlPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPoint")
            .field("point", &self.point)
            .field("geometric", &self.geometric)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ControlPoint`]
pub struct ControlPointBuilder {
    lat_deg: f64,
    lon_deg: f64,
    surface: Arc<dyn ModelSurface>,
    geodetic: f64,
    normal: f64,
    geodetic_error: f64,
    normal_error: f64,
}

impl ControlPointBuilder {
    /// Ellipsoidal (geodetic) height, e.g. from GNSS
    pub fn geodetic_height(mut self, height: f64) -> Self {
        self.geodetic = height;
        self
    }

    /// Normal height from levelling
    pub fn normal_height(mut self, height: f64) -> Self {
        self.normal = height;
        self
    }

    pub fn geodetic_height_error(mut self, error: f64) -> Self {
        self.geodetic_error = error;
        self
    }

    pub fn normal_height_error(mut self, error: f64) -> Self {
        self.normal_error = error;
        self
    }

    pub fn build(self) -> ControlPoint {
        let geodetic = Observation::new(self.geodetic, coerce_error(self.geodetic_error));
        let normal = Observation::new(self.normal, coerce_error(self.normal_error));

        ControlPoint {
            point: GeodeticPoint::new(self.lat_deg, self.lon_deg),
            geometric: geodetic.minus(&normal),
            surface: self.surface,
        }
    }
}

fn coerce_error(error: f64) -> f64 {
    if error == 0.0 {
        MIN_HEIGHT_ERROR
    } else {
        error.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;

    fn flat(height: f64) -> Arc<dyn ModelSurface> {
        Arc::new(move |_lat: f64, _lon: f64| height)
    }

    #[test]
    fn test_geometric_and_signal() {
        let cp = ControlPoint::builder(53.0, 27.5, flat(24.0))
            .geodetic_height(230.0)
            .normal_height(205.5)
            .geodetic_height_error(0.03)
            .normal_height_error(0.04)
            .build();

        assert_relative_eq!(cp.geometric().value(), 24.5, epsilon = 1e-12);
        assert_relative_eq!(cp.geometric().error(), 0.05, epsilon = 1e-12);

        let model = cp.model().unwrap();
        assert_eq!(model.value(), 24.0);
        assert_eq!(model.error(), 0.0);

        let signal = cp.signal().unwrap();
        assert_relative_eq!(signal.value(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(signal.error(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_errors_coerced() {
        let cp = ControlPoint::builder(53.0, 27.5, flat(0.0))
            .geodetic_height(10.0)
            .normal_height(9.0)
            .build();

        assert_relative_eq!(
            cp.geometric().error(),
            MIN_HEIGHT_ERROR * std::f64::consts::SQRT_2,
            epsilon = 1e-15
        );
        assert!(cp.signal().unwrap().error() > 0.0);
    }

    #[test]
    fn test_surface_domain_error_propagates() {
        let surface: Arc<dyn ModelSurface> = Arc::new(Bounded);
        let cp = ControlPoint::builder(80.0, 27.5, surface).build();
        assert!(matches!(cp.signal(), Err(Error::OutOfDomain { .. })));
    }

    struct Bounded;

    impl ModelSurface for Bounded {
        fn height(&self, lat: f64, lon: f64) -> Result<f64> {
            if lat > 60.0 {
                return Err(Error::OutOfDomain { lat, lon });
            }
            Ok(0.0)
        }
    }
}
