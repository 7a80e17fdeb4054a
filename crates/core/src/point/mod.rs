//! Geodetic points, observations and the two point roles of collocation:
//! control points (observed) and prognosis nodes (predicted).

mod control;
mod geodetic;
mod node;
mod observation;

pub use control::{ControlPoint, ControlPointBuilder, MIN_HEIGHT_ERROR};
pub use geodetic::{Geodetic, GeodeticPoint};
pub use node::PrognosisNode;
pub use observation::Observation;
