//! # Quasigeoid Core
//!
//! Core types and I/O for quasigeoid refinement by least-squares collocation.
//!
//! This crate provides:
//! - `Ellipsoid` / `RefSystem`: reference ellipsoids with derived constants
//! - `ControlPoint` and `PrognosisNode`: observed and predicted points
//! - `Grid` / `GridSpec`: regular latitude/longitude height grids
//! - `ModelSurface`: the model heights the collocation corrects
//! - Plain-text I/O for grids, control points and predictions

pub mod ellipsoid;
pub mod error;
pub mod grid;
pub mod io;
pub mod maybe_rayon;
pub mod point;
pub mod surface;

pub use ellipsoid::{Ellipsoid, RefSystem};
pub use error::{Error, Result};
pub use grid::{BilinearInterpolator, Grid, GridSpec};
pub use point::{ControlPoint, Geodetic, GeodeticPoint, Observation, PrognosisNode};
pub use surface::ModelSurface;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ellipsoid::{Ellipsoid, RefSystem};
    pub use crate::error::{Error, Result};
    pub use crate::grid::{BilinearInterpolator, Grid, GridSpec};
    pub use crate::point::{ControlPoint, Geodetic, GeodeticPoint, Observation, PrognosisNode};
    pub use crate::surface::ModelSurface;
}
