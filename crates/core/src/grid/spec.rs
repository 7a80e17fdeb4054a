//! Geometry of a regular latitude/longitude grid

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point::Geodetic;

/// Extent and spacing of a node-registered geographic grid.
///
/// Converts between node indices `(row, col)` and geodetic coordinates:
/// ```text
/// lat = lat_min + row * d_lat
/// lon = lon_min + col * d_lon
/// ```
/// Row 0 is the southern edge; rows increase northwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Southern edge latitude (degrees)
    pub lat_min: f64,
    /// Western edge longitude (degrees)
    pub lon_min: f64,
    /// Northern edge latitude (degrees)
    pub lat_max: f64,
    /// Eastern edge longitude (degrees)
    pub lon_max: f64,
    /// Latitude step (degrees)
    pub d_lat: f64,
    /// Longitude step (degrees)
    pub d_lon: f64,
}

impl GridSpec {
    /// Create a validated grid specification
    pub fn new(
        lat_min: f64,
        lon_min: f64,
        lat_max: f64,
        lon_max: f64,
        d_lat: f64,
        d_lon: f64,
    ) -> Result<Self> {
        let spec = Self {
            lat_min,
            lon_min,
            lat_max,
            lon_max,
            d_lat,
            d_lon,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check extent ordering and step signs
    pub fn validate(&self) -> Result<()> {
        if self.lat_max < self.lat_min || self.lon_max < self.lon_min {
            return Err(Error::InvalidParameter {
                name: "extent",
                value: format!(
                    "({}, {}) - ({}, {})",
                    self.lat_min, self.lon_min, self.lat_max, self.lon_max
                ),
                reason: "maximum must not be below minimum".into(),
            });
        }
        if !(self.d_lat > 0.0) || !(self.d_lon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "step",
                value: format!("({}, {})", self.d_lat, self.d_lon),
                reason: "grid steps must be positive".into(),
            });
        }
        Ok(())
    }

    /// Number of node rows (latitudes)
    pub fn rows(&self) -> usize {
        ((self.lat_max - self.lat_min + self.d_lat / 2.0) / self.d_lat + 1.0) as usize
    }

    /// Number of node columns (longitudes)
    pub fn cols(&self) -> usize {
        ((self.lon_max - self.lon_min + self.d_lon / 2.0) / self.d_lon + 1.0) as usize
    }

    /// Coordinates `(lat, lon)` of node `(row, col)`
    pub fn node_to_geo(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.lat_min + self.d_lat * row as f64,
            self.lon_min + self.d_lon * col as f64,
        )
    }

    /// Fractional node coordinates `(row, col)` of a location.
    ///
    /// Use `.floor()` to get the index of the cell's south-west node.
    pub fn geo_to_node(&self, lat: f64, lon: f64) -> (f64, f64) {
        (
            (lat - self.lat_min) / self.d_lat,
            (lon - self.lon_min) / self.d_lon,
        )
    }

    /// Whether a location lies inside the closed grid box
    pub fn contains<G: Geodetic + ?Sized>(&self, pt: &G) -> bool {
        let lat = pt.lat_deg();
        let lon = pt.lon_deg();
        !(lat < self.lat_min || lat > self.lat_max || lon < self.lon_min || lon > self.lon_max)
    }
}

impl Default for GridSpec {
    /// One degree square with 2.5' spacing
    fn default() -> Self {
        let step = 2.5 / 60.0;
        Self {
            lat_min: 0.0,
            lon_min: 0.0,
            lat_max: 1.0,
            lon_max: 1.0,
            d_lat: step,
            d_lon: step,
        }
    }
}
