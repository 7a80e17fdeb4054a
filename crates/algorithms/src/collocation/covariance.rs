//! Analytic covariance functions of the anomalous signal
//!
//! Each family maps a spherical distance `d` (degrees) to a covariance,
//! given the signal variance `C₀` and correlation distance `d₀`:
//! ```text
//! Gauss-Markov 2nd order:  C₀ (1 + t) e^(−t)              t = d / d₀
//! Gauss-Markov 3rd order:  C₀ (1 + t + t²/3) e^(−t)       t = d / d₀
//! Gaussian:                C₀ exp(−(d/d₀)²)
//! Hirvonen:                C₀ / (1 + (d/d₀)²)
//! ```
//! All families equal `C₀` at `d = 0` and decrease monotonically.
//!
//! Reference:
//! Moritz, H. (1980). Advanced Physical Geodesy, §14–§16.
//! Hirvonen, R.A. (1962). On the statistical analysis of gravity anomalies.

use std::fmt;
use std::str::FromStr;

use quasigeoid_core::{Error, Result};

/// Analytic covariance family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CovType {
    GaussMarkov2,
    GaussMarkov3,
    Gaussian,
    #[default]
    Hirvonen,
}

impl CovType {
    /// All families, in a fixed order
    pub const ALL: [CovType; 4] = [
        CovType::GaussMarkov2,
        CovType::GaussMarkov3,
        CovType::Gaussian,
        CovType::Hirvonen,
    ];

    /// Covariance at `distance` for the given correlation distance and variance
    #[inline]
    pub fn covariance(&self, distance: f64, correl_distance: f64, variance: f64) -> f64 {
        match self {
            CovType::GaussMarkov2 => {
                let t = distance / correl_distance;
                variance * (1.0 + t) * (-t).exp()
            }
            CovType::GaussMarkov3 => {
                let t = distance / correl_distance;
                variance * (1.0 + t + t * t / 3.0) * (-t).exp()
            }
            CovType::Gaussian => {
                let t = distance / correl_distance;
                variance * (-(t * t)).exp()
            }
            CovType::Hirvonen => {
                let t = distance / correl_distance;
                variance / (1.0 + t * t)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CovType::GaussMarkov2 => "gaussMarkov2",
            CovType::GaussMarkov3 => "gaussMarkov3",
            CovType::Gaussian => "gaussian",
            CovType::Hirvonen => "hirvonen",
        }
    }
}

impl fmt::Display for CovType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CovType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "gaussmarkov2" | "gm2" => Ok(CovType::GaussMarkov2),
            "gaussmarkov3" | "gm3" => Ok(CovType::GaussMarkov3),
            "gaussian" | "gauss" => Ok(CovType::Gaussian),
            "hirvonen" => Ok(CovType::Hirvonen),
            _ => Err(Error::InvalidParameter {
                name: "covariance type",
                value: s.to_string(),
                reason: "expected gaussMarkov2, gaussMarkov3, gaussian or hirvonen".into(),
            }),
        }
    }
}

/// A covariance function with fixed variance and correlation distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovFunction {
    kind: CovType,
    variance: f64,
    correl_distance: f64,
}

impl CovFunction {
    /// Create a covariance function.
    ///
    /// `variance` must be finite and non-negative, `correl_distance`
    /// (degrees) finite and positive.
    pub fn new(kind: CovType, variance: f64, correl_distance: f64) -> Result<Self> {
        if !variance.is_finite() || variance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "variance",
                value: variance.to_string(),
                reason: "must be finite and non-negative".into(),
            });
        }
        if !correl_distance.is_finite() || correl_distance <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "correlation distance",
                value: correl_distance.to_string(),
                reason: "must be finite and positive".into(),
            });
        }
        Ok(Self {
            kind,
            variance,
            correl_distance,
        })
    }

    /// Covariance at a spherical distance (degrees)
    #[inline]
    pub fn covariance(&self, distance: f64) -> f64 {
        self.kind.covariance(distance, self.correl_distance, self.variance)
    }

    pub fn kind(&self) -> CovType {
        self.kind
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Correlation distance in degrees
    pub fn correl_distance(&self) -> f64 {
        self.correl_distance
    }
}

impl fmt::Display for CovFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (variance = {:.6}, correlation distance = {:.3}°)",
            self.kind, self.variance, self.correl_distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_value_at_zero_is_variance() {
        for kind in CovType::ALL {
            let f = CovFunction::new(kind, 0.0421, 0.37).unwrap();
            assert_eq!(f.covariance(0.0), 0.0421, "{kind}");
        }
    }

    #[test]
    fn test_non_increasing() {
        for kind in CovType::ALL {
            let f = CovFunction::new(kind, 2.5, 0.8).unwrap();
            let mut prev = f.covariance(0.0);
            for k in 1..2000 {
                let c = f.covariance(k as f64 * 0.005);
                assert!(c <= prev, "{kind} increased at step {k}");
                assert!(c >= 0.0);
                prev = c;
            }
        }
    }

    #[test]
    fn test_known_values() {
        let v = 2.0;
        let d0 = 0.5;
        assert_relative_eq!(
            CovType::GaussMarkov2.covariance(0.5, d0, v),
            2.0 * 2.0 * (-1.0f64).exp(),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            CovType::GaussMarkov3.covariance(0.5, d0, v),
            2.0 * (7.0 / 3.0) * (-1.0f64).exp(),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            CovType::Gaussian.covariance(0.5, d0, v),
            2.0 * (-1.0f64).exp(),
            epsilon = 1e-14
        );
        assert_relative_eq!(CovType::Hirvonen.covariance(0.5, d0, v), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(CovFunction::new(CovType::Hirvonen, -1.0, 0.5).is_err());
        assert!(CovFunction::new(CovType::Hirvonen, 1.0, 0.0).is_err());
        assert!(CovFunction::new(CovType::Hirvonen, f64::NAN, 0.5).is_err());
        assert!(CovFunction::new(CovType::Hirvonen, 0.0, 0.5).is_ok());
    }

    #[test]
    fn test_parse_type() {
        assert_eq!("hirvonen".parse::<CovType>().unwrap(), CovType::Hirvonen);
        assert_eq!("gaussMarkov2".parse::<CovType>().unwrap(), CovType::GaussMarkov2);
        assert_eq!("gauss-markov-3".parse::<CovType>().unwrap(), CovType::GaussMarkov3);
        assert_eq!("Gaussian".parse::<CovType>().unwrap(), CovType::Gaussian);
        assert!("spherical".parse::<CovType>().is_err());

        for kind in CovType::ALL {
            assert_eq!(kind.to_string().parse::<CovType>().unwrap(), kind);
        }
    }
}
