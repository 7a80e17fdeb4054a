//! Spherical distance between geodetic points
//!
//! Geodetic latitudes are first reduced to geocentric latitudes
//! ```text
//! ψ = atan((b/a)² · tan φ)
//! ```
//! and the central angle on the resulting sphere is taken with the
//! haversine formula:
//! ```text
//! d = 2 · asin √( sin²((ψ₁−ψ₂)/2) + cos ψ₁ · cos ψ₂ · sin²((λ₁−λ₂)/2) )
//! ```
//! Distances are returned in degrees of arc.

use quasigeoid_core::{Ellipsoid, Geodetic};

/// Angular distance on the auxiliary sphere of an ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalDistance {
    axis_ratio_sq: f64,
}

impl SphericalDistance {
    pub fn new(ellipsoid: &Ellipsoid) -> Self {
        Self {
            axis_ratio_sq: ellipsoid.axis_ratio_squared(),
        }
    }

    /// Geocentric latitude (radians) of a geodetic latitude (radians)
    #[inline]
    pub fn geocentric_latitude(&self, lat_rad: f64) -> f64 {
        (self.axis_ratio_sq * lat_rad.tan()).atan()
    }

    /// Central angle between two points, in degrees
    pub fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: Geodetic + ?Sized,
        B: Geodetic + ?Sized,
    {
        let phi_a = self.geocentric_latitude(a.lat_rad());
        let phi_b = self.geocentric_latitude(b.lat_rad());

        let s_lat = ((phi_a - phi_b) / 2.0).sin();
        let s_lon = ((a.lon_rad() - b.lon_rad()) / 2.0).sin();
        let h = s_lat * s_lat + phi_a.cos() * phi_b.cos() * s_lon * s_lon;

        // h can drift past 1.0 for near-antipodal points
        (2.0 * h.sqrt().min(1.0).asin()).to_degrees()
    }
}
