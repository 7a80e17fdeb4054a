//! Grid nodes selected as prediction targets

use std::fmt;

use super::{Geodetic, GeodeticPoint, Observation};

/// A grid cell eligible for prediction.
///
/// Carries its `(row, col)` index back into the grid it came from but never
/// owns that grid. `modeled` is the pre-collocation surface value at the
/// cell; `predicted` is the collocation estimate (zero until one is made).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrognosisNode {
    point: GeodeticPoint,
    row: usize,
    col: usize,
    modeled: Observation,
    predicted: Observation,
}

impl PrognosisNode {
    /// Node built from raw grid data; the prediction is zero
    pub fn new(lat_deg: f64, lon_deg: f64, row: usize, col: usize, modeled: f64) -> Self {
        Self {
            point: GeodeticPoint::new(lat_deg, lon_deg),
            row,
            col,
            modeled: Observation::exact(modeled),
            predicted: Observation::zero(),
        }
    }

    /// Copy of this node carrying a freshly estimated prediction
    pub fn with_prediction(&self, predicted: Observation) -> Self {
        Self { predicted, ..*self }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn point(&self) -> &GeodeticPoint {
        &self.point
    }

    /// Collocation estimate of the signal at this node
    pub fn signal(&self) -> Observation {
        self.predicted
    }

    /// Pre-collocation model value
    pub fn model(&self) -> Observation {
        self.modeled
    }

    /// Corrected surface value: model + predicted signal
    pub fn geometric(&self) -> Observation {
        self.modeled.plus(&self.predicted)
    }
}

impl Geodetic for PrognosisNode {
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

impl fmt::Display for PrognosisNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.9}\t{:.9}\t{:.4}\t{:.4}\t{:.4}",
            self.lon_deg(),
            self.lat_deg(),
            self.geometric().value(),
            self.signal().value(),
            self.signal().error()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_has_zero_prediction() {
        let node = PrognosisNode::new(52.0, 27.0, 3, 4, 25.0);
        assert_eq!(node.signal(), Observation::zero());
        assert_eq!(node.model(), Observation::exact(25.0));
        assert_eq!(node.geometric().value(), 25.0);
        assert_eq!((node.row(), node.col()), (3, 4));
    }

    #[test]
    fn test_with_prediction_keeps_index_and_model() {
        let node = PrognosisNode::new(52.0, 27.0, 3, 4, 25.0);
        let predicted = node.with_prediction(Observation::new(0.25, 0.02));

        assert_eq!(predicted.point(), node.point());
        assert_eq!((predicted.row(), predicted.col()), (3, 4));
        assert_eq!(predicted.model(), node.model());
        assert_eq!(predicted.geometric().value(), 25.25);
        assert_eq!(predicted.geometric().error(), 0.02);
        // the source node is untouched
        assert_eq!(node.signal(), Observation::zero());
    }

    #[test]
    fn test_display_columns() {
        let node = PrognosisNode::new(52.0, 27.0, 0, 0, 25.0)
            .with_prediction(Observation::new(0.5, 0.01));
        assert_eq!(
            node.to_string(),
            "27.000000000\t52.000000000\t25.5000\t0.5000\t0.0100"
        );
    }
}
