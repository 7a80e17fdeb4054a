//! Reference ellipsoid and geodetic reference systems
//!
//! An [`Ellipsoid`] is defined by its semi-major axis `a`, flattening `f`
//! and geocentric gravitational constant `GM`. Every derived quantity
//! (semi-minor axis, eccentricities, normal gravity at equator and pole,
//! normal potential, mean radius and mean gravity) is computed once at
//! construction and is read-only afterwards.
//!
//! Reference:
//! Moritz, H. (2000). Geodetic Reference System 1980. Journal of Geodesy.
//! Heiskanen, W.A. & Moritz, H. (1967). Physical Geodesy, §2.7–2.9.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Nominal angular velocity of the Earth (rad/s)
pub const EARTH_ANGULAR_VELOCITY: f64 = 7.292115E-5;

/// Level ellipsoid with its derived physical constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    a: f64,
    f: f64,
    gm: f64,
    b: f64,
    /// First eccentricity
    e1: f64,
    /// Second eccentricity
    e2: f64,
    gamma_e: f64,
    gamma_p: f64,
    k: f64,
    c: f64,
    u0: f64,
    r_mean: f64,
    gamma_mean: f64,
}

impl Ellipsoid {
    /// Create an ellipsoid from semi-major axis (m), flattening and GM (m³/s²).
    pub fn new(a: f64, f: f64, gm: f64) -> Result<Self> {
        if !(a > 0.0) {
            return Err(Error::InvalidParameter {
                name: "a",
                value: a.to_string(),
                reason: "semi-major axis must be positive".into(),
            });
        }
        if !(f > 0.0 && f < 1.0) {
            return Err(Error::InvalidParameter {
                name: "f",
                value: f.to_string(),
                reason: "flattening must lie in (0, 1)".into(),
            });
        }
        if !(gm > 0.0) {
            return Err(Error::InvalidParameter {
                name: "gm",
                value: gm.to_string(),
                reason: "gravitational constant must be positive".into(),
            });
        }
        Ok(Self::derive(a, f, gm))
    }

    fn derive(a: f64, f: f64, gm: f64) -> Self {
        let w2 = EARTH_ANGULAR_VELOCITY * EARTH_ANGULAR_VELOCITY;
        let a2 = a * a;

        let b = a * (1.0 - f);
        let e = (a2 - b * b).sqrt();
        let e1 = e / a;
        let e2 = e / b;

        let u0 = gm * e2.atan() / e + w2 * a2 / 3.0;
        let m = w2 * a2 * b / gm;

        let q = a * a2 * w2 / gm;
        let ee = e2 * e2;

        let gamma_e = gm
            * (1.0 - 1.5 * q + f + f * f - 3.0 * f * q / 7.0 + f * f * f
                - 125.0 * q * f * f / 294.0)
            / a2;

        let gamma_p = gm / a2
            - 2.0 * w2 * b * (1.0 - 2.0 * ee * (e2 - e2.atan()) / ((3.0 + ee) * e2.atan() - 3.0 * e2))
                / 3.0;

        let q0 = 0.5 * ((1.0 + 3.0 / ee) * e2.atan() - 3.0 / e2);

        let k = (b * gamma_p - a * gamma_e) / (a * gamma_e);
        let c = (1.0 - (2.0 / 15.0) * (m * e2 / q0)) / 3.0;

        Self {
            a,
            f,
            gm,
            b,
            e1,
            e2,
            gamma_e,
            gamma_p,
            k,
            c,
            u0,
            r_mean: (2.0 * a + b) / 3.0,
            gamma_mean: (2.0 * gamma_e + gamma_p) / 3.0,
        }
    }

    /// Semi-major axis (m)
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Semi-minor axis (m)
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Flattening
    pub fn flattening(&self) -> f64 {
        self.f
    }

    /// Geocentric gravitational constant (m³/s²)
    pub fn gm(&self) -> f64 {
        self.gm
    }

    /// First eccentricity
    pub fn eccentricity(&self) -> f64 {
        self.e1
    }

    /// Second eccentricity
    pub fn second_eccentricity(&self) -> f64 {
        self.e2
    }

    /// Normal gravity at the equator (m/s²)
    pub fn gamma_equator(&self) -> f64 {
        self.gamma_e
    }

    /// Normal gravity at the pole (m/s²)
    pub fn gamma_pole(&self) -> f64 {
        self.gamma_p
    }

    /// Gravity flattening constant `k`
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Normal potential on the ellipsoid surface (m²/s²)
    pub fn normal_potential(&self) -> f64 {
        self.u0
    }

    /// Mean radius `(2a + b) / 3` (m)
    pub fn mean_radius(&self) -> f64 {
        self.r_mean
    }

    /// Mean normal gravity `(2γe + γp) / 3` (m/s²)
    pub fn mean_gravity(&self) -> f64 {
        self.gamma_mean
    }

    /// Squared axis ratio `(b/a)²`, the factor between `tan` of geodetic
    /// and geocentric latitude.
    pub fn axis_ratio_squared(&self) -> f64 {
        let r = self.b / self.a;
        r * r
    }

    /// Normal gravity on the ellipsoid surface (Somigliana).
    ///
    /// `phi` is the geodetic latitude in radians.
    pub fn normal_gravity(&self, phi: f64) -> f64 {
        let s = phi.sin();
        let es = self.e1 * s;
        self.gamma_e * (1.0 + self.k * s * s) / (1.0 - es * es).sqrt()
    }

    /// Even zonal harmonic coefficient `J2n` of the normal field.
    pub fn j2n(&self, n: u32) -> f64 {
        let nf = n as f64;
        let sign = if n % 2 == 0 { -1.0 } else { 1.0 };
        sign * 3.0 * self.e1.powi(2 * n as i32) * (1.0 - nf + 5.0 * nf * self.c)
            / ((2.0 * nf + 1.0) * (2.0 * nf + 3.0))
    }
}

/// Standard geodetic reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefSystem {
    /// Geodetic Reference System 1980
    #[default]
    Grs80,
    /// World Geodetic System 1984
    Wgs84,
}

impl RefSystem {
    /// Defining constants `(a, 1/f, GM)`
    pub fn constants(&self) -> (f64, f64, f64) {
        match self {
            RefSystem::Grs80 => (6_378_137.0, 298.257_222_101, 3.986_005_000E14),
            RefSystem::Wgs84 => (6_378_137.0, 298.257_223_563, 3.986_004_418E14),
        }
    }

    /// The reference ellipsoid of this system
    pub fn ellipsoid(&self) -> Ellipsoid {
        let (a, inv_f, gm) = self.constants();
        Ellipsoid::derive(a, 1.0 / inv_f, gm)
    }
}

impl std::str::FromStr for RefSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "grs80" | "grs-80" | "grs" => Ok(RefSystem::Grs80),
            "wgs84" | "wgs-84" | "wgs" => Ok(RefSystem::Wgs84),
            _ => Err(Error::InvalidParameter {
                name: "ref_system",
                value: s.to_string(),
                reason: "expected grs80 or wgs84".into(),
            }),
        }
    }
}

impl std::fmt::Display for RefSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefSystem::Grs80 => write!(f, "GRS80"),
            RefSystem::Wgs84 => write!(f, "WGS84"),
        }
    }
}
