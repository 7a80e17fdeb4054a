//! Geodetic coordinates

/// Anything located by geodetic latitude and longitude.
pub trait Geodetic {
    /// Latitude in degrees
    fn lat_deg(&self) -> f64;

    /// Longitude in degrees
    fn lon_deg(&self) -> f64;

    /// Latitude in radians
    fn lat_rad(&self) -> f64 {
        self.lat_deg().to_radians()
    }

    /// Longitude in radians
    fn lon_rad(&self) -> f64 {
        self.lon_deg().to_radians()
    }
}

/// A point on the ellipsoid given by geodetic latitude and longitude.
///
/// Radians are derived once at construction. Equality compares the
/// degree coordinates.
#[derive(Debug, Clone, Copy)]
pub struct GeodeticPoint {
    lat_deg: f64,
    lon_deg: f64,
    lat_rad: f64,
    lon_rad: f64,
}

impl GeodeticPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            lat_rad: lat_deg.to_radians(),
            lon_rad: lon_deg.to_radians(),
        }
    }

    /// Copy the coordinates of any geodetic location
    pub fn of<G: Geodetic + ?Sized>(g: &G) -> Self {
        Self::new(g.lat_deg(), g.lon_deg())
    }
}

impl PartialEq for GeodeticPoint {
    fn eq(&self, other: &Self) -> bool {
        self.lat_deg == other.lat_deg && self.lon_deg == other.lon_deg
    }
}

impl Geodetic for GeodeticPoint {
    fn lat_deg(&self) -> f64 {
        self.lat_deg
    }

    fn lon_deg(&self) -> f64 {
        self.lon_deg
    }

    fn lat_rad(&self) -> f64 {
        self.lat_rad
    }

    fn lon_rad(&self) -> f64 {
        self.lon_rad
    }
}

impl<G: Geodetic + ?Sized> Geodetic for &G {
    fn lat_deg(&self) -> f64 {
        (**self).lat_deg()
    }

    fn lon_deg(&self) -> f64 {
        (**self).lon_deg()
    }

    fn lat_rad(&self) -> f64 {
        (**self).lat_rad()
    }

    fn lon_rad(&self) -> f64 {
        (**self).lon_rad()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_radians_derived() {
        let p = GeodeticPoint::new(45.0, 180.0);
        assert_relative_eq!(p.lat_rad(), std::f64::consts::FRAC_PI_4, epsilon = 1e-15);
        assert_relative_eq!(p.lon_rad(), std::f64::consts::PI, epsilon = 1e-15);
    }

    #[test]
    fn test_equality_by_coordinate() {
        assert_eq!(GeodeticPoint::new(52.0, 27.0), GeodeticPoint::new(52.0, 27.0));
        assert_ne!(GeodeticPoint::new(52.0, 27.0), GeodeticPoint::new(52.0, 27.5));
    }
}
