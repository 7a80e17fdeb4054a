//! Error types for quasigeoid refinement

use thiserror::Error;

/// Main error type for quasigeoid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A model surface was queried outside its coordinate domain.
    #[error("Point ({lat}, {lon}) lies outside the model surface domain")]
    OutOfDomain { lat: f64, lon: f64 },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Illegal trend degree: {0}")]
    InvalidTrendDegree(String),

    #[error("Not enough points: need at least {needed}, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    /// Distance statistics of a point set cannot support covariance fitting.
    #[error("Degenerate distance statistics: {0}")]
    DegenerateDistances(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(&'static str),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for quasigeoid operations
pub type Result<T> = std::result::Result<T, Error>;
