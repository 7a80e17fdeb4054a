//! Main Grid type

use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};
use crate::grid::GridSpec;
use crate::maybe_rayon::*;
use crate::point::{Geodetic, PrognosisNode};
use crate::surface::ModelSurface;

/// A regular latitude/longitude grid of height values.
///
/// Values are stored row-major as `(row, col)`; row 0 is the southern
/// edge (see [`GridSpec`]).
///
/// # Example
///
/// ```ignore
/// use quasigeoid_core::grid::{Grid, GridSpec};
///
/// let spec = GridSpec::new(51.0, 23.0, 52.0, 24.0, 0.25, 0.25)?;
/// let mut grid = Grid::new(spec)?;
/// grid.set(2, 3, 24.8)?;
/// let value = grid.get(2, 3)?;
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    data: Array2<f64>,
    spec: GridSpec,
}

impl Grid {
    /// Create a grid of zeros
    pub fn new(spec: GridSpec) -> Result<Self> {
        spec.validate()?;
        let (rows, cols) = (spec.rows(), spec.cols());
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            data: Array2::zeros((rows, cols)),
            spec,
        })
    }

    /// Create a grid from row-major values
    pub fn from_vec(spec: GridSpec, data: Vec<f64>) -> Result<Self> {
        spec.validate()?;
        let (rows, cols) = (spec.rows(), spec.cols());
        if rows == 0 || cols == 0 || data.len() != rows * cols {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        let data = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self { data, spec })
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            }),
        }
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Coordinates `(lat, lon)` of node (row, col)
    pub fn node_to_geo(&self, row: usize, col: usize) -> (f64, f64) {
        self.spec.node_to_geo(row, col)
    }

    /// Whether a location lies inside the grid box
    pub fn contains<G: Geodetic + ?Sized>(&self, pt: &G) -> bool {
        self.spec.contains(pt)
    }

    /// Node (row, col) as a prediction target carrying the current value
    pub fn node(&self, row: usize, col: usize) -> Result<PrognosisNode> {
        let value = self.get(row, col)?;
        let (lat, lon) = self.node_to_geo(row, col);
        Ok(PrognosisNode::new(lat, lon, row, col, value))
    }

    /// Every node of the grid, row by row
    pub fn nodes(&self) -> Vec<PrognosisNode> {
        self.data
            .indexed_iter()
            .map(|((row, col), &value)| {
                let (lat, lon) = self.node_to_geo(row, col);
                PrognosisNode::new(lat, lon, row, col, value)
            })
            .collect()
    }

    /// Evaluate a model surface at every node, rows in parallel through
    /// [`ModelSurface::row_heights`].
    ///
    /// The grid is left unchanged if any node fails.
    pub fn fill_from<S: ModelSurface + ?Sized>(&mut self, surface: &S) -> Result<()> {
        let (rows, cols) = self.shape();
        let spec = self.spec;

        let values: Vec<Vec<f64>> = (0..rows)
            .into_par_iter()
            .map(|row| {
                let heights = surface.row_heights(&spec, row)?;
                if heights.len() != cols {
                    return Err(Error::InvalidDimensions {
                        rows: 1,
                        cols: heights.len(),
                    });
                }
                Ok(heights)
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        self.data = Array2::from_shape_vec((rows, cols), values.into_iter().flatten().collect())
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(())
    }

    /// Write each node's corrected value (model + predicted signal) back
    /// into its cell. Node indices are disjoint, so every cell is written
    /// at most once per node set.
    pub fn apply_predictions(&mut self, nodes: &[PrognosisNode]) -> Result<()> {
        for node in nodes {
            self.set(node.row(), node.col(), node.geometric().value())?;
        }
        Ok(())
    }

    /// Basic statistics over the finite values
    pub fn statistics(&self) -> GridStatistics {
        let mut min = None::<f64>;
        let mut max = None::<f64>;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter().filter(|v| v.is_finite()) {
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
            sum += value;
            count += 1;
        }

        GridStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
        }
    }
}

/// Basic statistics for a grid
#[derive(Debug, Clone)]
pub struct GridStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Observation;
    use approx::assert_relative_eq;

    fn spec() -> GridSpec {
        GridSpec::new(51.0, 23.0, 52.0, 24.0, 0.25, 0.25).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(spec()).unwrap();
        assert_eq!(grid.shape(), (5, 5));
        assert_eq!(grid.len(), 25);
    }

    #[test]
    fn test_grid_access() {
        let mut grid = Grid::new(spec()).unwrap();
        grid.set(2, 3, 42.0).unwrap();
        assert_eq!(grid.get(2, 3).unwrap(), 42.0);
        assert!(grid.get(5, 0).is_err());
        assert!(grid.set(0, 5, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_dimension_mismatch() {
        assert!(Grid::from_vec(spec(), vec![0.0; 24]).is_err());
        assert!(Grid::from_vec(spec(), vec![0.0; 25]).is_ok());
    }

    #[test]
    fn test_fill_from_surface() {
        let mut grid = Grid::new(spec()).unwrap();
        grid.fill_from(&|lat: f64, lon: f64| lat - lon).unwrap();

        assert_relative_eq!(grid.get(0, 0).unwrap(), 28.0, epsilon = 1e-12);
        assert_relative_eq!(grid.get(4, 4).unwrap(), 28.0, epsilon = 1e-12);
        assert_relative_eq!(grid.get(4, 0).unwrap(), 29.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nodes_carry_values() {
        let mut grid = Grid::new(spec()).unwrap();
        grid.set(1, 2, 7.5).unwrap();

        let nodes = grid.nodes();
        assert_eq!(nodes.len(), 25);
        let node = nodes.iter().find(|n| n.row() == 1 && n.col() == 2).unwrap();
        assert_eq!(node.model().value(), 7.5);
        assert_relative_eq!(node.lat_deg(), 51.25, epsilon = 1e-12);
        assert_relative_eq!(node.lon_deg(), 23.5, epsilon = 1e-12);
    }

    #[test]
    fn test_apply_predictions() {
        let mut grid = Grid::new(spec()).unwrap();
        grid.set(1, 1, 20.0).unwrap();

        let node = grid.node(1, 1).unwrap().with_prediction(Observation::new(0.3, 0.01));
        grid.apply_predictions(&[node]).unwrap();

        assert_relative_eq!(grid.get(1, 1).unwrap(), 20.3, epsilon = 1e-12);
        assert_eq!(grid.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_grid_statistics() {
        let data: Vec<f64> = (0..25).map(|v| v as f64).collect();
        let grid = Grid::from_vec(spec(), data).unwrap();

        let stats = grid.statistics();
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(24.0));
        assert_eq!(stats.mean, Some(12.0));
        assert_eq!(stats.valid_count, 25);
    }
}
