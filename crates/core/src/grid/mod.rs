//! Regular geographic grids and interpolation over them

mod grid;
mod interpolator;
mod spec;

pub use grid::{Grid, GridStatistics};
pub use interpolator::BilinearInterpolator;
pub use spec::GridSpec;
