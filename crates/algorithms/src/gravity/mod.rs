//! Model surface from a global gravity field model
//!
//! [`GravityFieldModel`] loads spherical-harmonic coefficients and removes
//! the normal field of the reference ellipsoid; [`GeoidSynthesis`] turns
//! them into quasigeoid heights and is the [`ModelSurface`] that
//! [`Grid::fill_from`] evaluates to build the model grid.
//!
//! [`ModelSurface`]: quasigeoid_core::ModelSurface
//! [`Grid::fill_from`]: quasigeoid_core::Grid::fill_from

mod coefficients;
mod geoid;
mod legendre;

pub use coefficients::{GravityFieldModel, GravityModel, GEOID_POTENTIAL};
pub use geoid::GeoidSynthesis;
pub use legendre::Legendre;
