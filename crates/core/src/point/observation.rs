//! Observed or estimated values with their standard error

use serde::{Deserialize, Serialize};

/// An immutable `(value, error)` pair. The error is a standard deviation
/// and never negative: [`Observation::new`] stores its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    value: f64,
    error: f64,
}

impl Observation {
    pub fn new(value: f64, error: f64) -> Self {
        Self {
            value,
            error: error.abs(),
        }
    }

    /// A computed quantity without error
    pub fn exact(value: f64) -> Self {
        Self { value, error: 0.0 }
    }

    /// Zero value, zero error
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    /// Difference of two independent observations
    pub fn minus(&self, other: &Observation) -> Observation {
        Observation::new(self.value - other.value, self.error.hypot(other.error))
    }

    /// Sum of two independent observations
    pub fn plus(&self, other: &Observation) -> Observation {
        Observation::new(self.value + other.value, self.error.hypot(other.error))
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} ± {:.4}", self.value, self.error)
    }
}
