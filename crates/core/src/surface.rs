//! Model-surface provider
//!
//! The dense "model" surface (heights synthesized from a global gravity
//! field model) reaches the estimator only through [`ModelSurface`]: a pure
//! function from geodetic coordinates to a height in meters, valid inside a
//! declared coordinate domain.

use crate::error::Result;
use crate::grid::GridSpec;

/// Pure function `(latitude°, longitude°) → height (m)`.
///
/// Implementations return [`crate::Error::OutOfDomain`] for coordinates
/// outside their domain.
pub trait ModelSurface: Send + Sync {
    fn height(&self, lat_deg: f64, lon_deg: f64) -> Result<f64>;

    /// Heights of every node in grid row `row`, west to east.
    ///
    /// Surfaces whose cost is dominated by latitude-only terms override
    /// this to share that work across the row.
    fn row_heights(&self, spec: &GridSpec, row: usize) -> Result<Vec<f64>> {
        (0..spec.cols())
            .map(|col| {
                let (lat, lon) = spec.node_to_geo(row, col);
                self.height(lat, lon)
            })
            .collect()
    }
}

impl<F> ModelSurface for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn height(&self, lat_deg: f64, lon_deg: f64) -> Result<f64> {
        Ok(self(lat_deg, lon_deg))
    }
}
