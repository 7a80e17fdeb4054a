//! Bilinear interpolation over a grid, usable as a model surface

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::surface::ModelSurface;

use super::Grid;

/// Bilinear interpolation of a shared [`Grid`].
///
/// Queries outside the closed grid box fail with [`Error::OutOfDomain`].
/// On the northern or eastern edge the missing neighbour is replaced by the
/// edge node itself.
#[derive(Debug, Clone)]
pub struct BilinearInterpolator {
    grid: Arc<Grid>,
}

impl BilinearInterpolator {
    pub fn new(grid: Arc<Grid>) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Interpolated value at `(lat, lon)` in degrees
    pub fn interpolate(&self, lat: f64, lon: f64) -> Result<f64> {
        let spec = self.grid.spec();
        if !(lat >= spec.lat_min && lat <= spec.lat_max && lon >= spec.lon_min && lon <= spec.lon_max)
        {
            return Err(Error::OutOfDomain { lat, lon });
        }

        let (rows, cols) = self.grid.shape();
        let (fr, fc) = spec.geo_to_node(lat, lon);
        let i = (fr.trunc() as usize).min(rows - 1);
        let j = (fc.trunc() as usize).min(cols - 1);
        let fx = fr - i as f64;
        let fy = fc - j as f64;
        let f = (i + 1).min(rows - 1);
        let g = (j + 1).min(cols - 1);

        let d = self.grid.data();
        Ok((1.0 - fx) * (1.0 - fy) * d[[i, j]]
            + (1.0 - fx) * fy * d[[i, g]]
            + fx * (1.0 - fy) * d[[f, j]]
            + fx * fy * d[[f, g]])
    }
}

impl ModelSurface for BilinearInterpolator {
    fn height(&self, lat_deg: f64, lon_deg: f64) -> Result<f64> {
        self.interpolate(lat_deg, lon_deg)
    }
}
