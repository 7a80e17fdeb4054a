//! Spherical-harmonic coefficients of a global gravity field model
//!
//! Coefficients are read from ICGEM `.gfc` files: header lines are skipped
//! and every `gfc n m C S σC σS` record is stored by its own `(n, m)`, so
//! both degree-major (EGM2008) and order-major (EIGEN-6C4) files load the
//! same way. Fortran `D` exponents are accepted.
//!
//! After loading, the even zonal coefficients of the normal field of the
//! reference ellipsoid are removed up to degree 10, leaving the
//! disturbing potential.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use quasigeoid_core::{Ellipsoid, Error, Result};
use tracing::debug;

/// Gravity potential `W0` of the geoid adopted for the models (m²/s²)
pub const GEOID_POTENTIAL: f64 = 62_636_856.0;

/// Highest `n` of the normal-field zonals `J2n` removed from the model
const NORMAL_ZONAL_TERMS: u32 = 5;

/// Published global gravity field models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityModel {
    /// Earth Gravitational Model 2008 (NGA)
    #[default]
    Egm2008,
    /// EIGEN-6C4 (GFZ Potsdam / GRGS Toulouse)
    Eigen6c4,
}

impl GravityModel {
    /// Geocentric gravitational constant of the model (m³/s²)
    pub fn gm(&self) -> f64 {
        match self {
            GravityModel::Egm2008 | GravityModel::Eigen6c4 => 3.986_004_415E14,
        }
    }

    /// Reference radius of the model (m)
    pub fn radius(&self) -> f64 {
        match self {
            GravityModel::Egm2008 => 6_378_136.3,
            GravityModel::Eigen6c4 => 6_378_136.46,
        }
    }

    /// Maximum degree of the published coefficient set
    pub fn max_degree(&self) -> u32 {
        match self {
            GravityModel::Egm2008 | GravityModel::Eigen6c4 => 2190,
        }
    }
}

impl fmt::Display for GravityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GravityModel::Egm2008 => write!(f, "EGM2008"),
            GravityModel::Eigen6c4 => write!(f, "EIGEN-6C4"),
        }
    }
}

impl FromStr for GravityModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "egm2008" | "egm08" => Ok(GravityModel::Egm2008),
            "eigen6c4" => Ok(GravityModel::Eigen6c4),
            _ => Err(Error::InvalidParameter {
                name: "gravity_model",
                value: s.to_string(),
                reason: "expected egm2008 or eigen6c4".into(),
            }),
        }
    }
}

/// Position of `(n, m)` in triangular storage
#[inline]
fn index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

/// Fully normalized coefficients `C̄nm`, `S̄nm` and their standard errors,
/// truncated at a maximum degree, with the normal field removed.
#[derive(Debug, Clone)]
pub struct GravityFieldModel {
    model: GravityModel,
    ellipsoid: Ellipsoid,
    n_max: u32,
    c: Vec<f64>,
    s: Vec<f64>,
    sigma_c: Vec<f64>,
    sigma_s: Vec<f64>,
}

impl GravityFieldModel {
    /// Read a `.gfc` file, keeping degrees up to `max_degree` (the model's
    /// full degree when `None`).
    pub fn read<P: AsRef<Path>>(
        path: P,
        model: GravityModel,
        ellipsoid: Ellipsoid,
        max_degree: Option<u32>,
    ) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file), model, ellipsoid, max_degree)
    }

    /// Same as [`read`](Self::read) over any buffered reader
    pub fn from_reader<R: BufRead>(
        reader: R,
        model: GravityModel,
        ellipsoid: Ellipsoid,
        max_degree: Option<u32>,
    ) -> Result<Self> {
        let n_max = max_degree.unwrap_or(model.max_degree());
        if n_max < 1 || n_max > model.max_degree() {
            return Err(Error::InvalidParameter {
                name: "max_degree",
                value: n_max.to_string(),
                reason: format!("must lie in 1..={} for {model}", model.max_degree()),
            });
        }

        let size = index(n_max as usize, n_max as usize) + 1;
        let mut field = Self {
            model,
            ellipsoid,
            n_max,
            c: vec![0.0; size],
            s: vec![0.0; size],
            sigma_c: vec![0.0; size],
            sigma_s: vec![0.0; size],
        };

        let mut records = 0usize;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.first() != Some(&"gfc") {
                continue;
            }
            if fields.len() < 5 {
                return Err(Error::Parse {
                    line: line_no,
                    reason: "gfc record needs at least n, m, C and S".into(),
                });
            }

            let n = parse_index(fields[1], line_no)?;
            let m = parse_index(fields[2], line_no)?;
            if m > n {
                return Err(Error::Parse {
                    line: line_no,
                    reason: format!("order {m} exceeds degree {n}"),
                });
            }
            if n > n_max as usize {
                continue;
            }

            let k = index(n, m);
            field.c[k] = parse_coefficient(fields[3], line_no)?;
            field.sigma_c[k] = match fields.get(5) {
                Some(raw) => parse_coefficient(raw, line_no)?,
                None => 0.0,
            };
            if m > 0 {
                field.s[k] = parse_coefficient(fields[4], line_no)?;
                field.sigma_s[k] = match fields.get(6) {
                    Some(raw) => parse_coefficient(raw, line_no)?,
                    None => 0.0,
                };
            }
            records += 1;
        }

        if records == 0 {
            return Err(Error::Parse {
                line: 0,
                reason: "no gfc records found".into(),
            });
        }

        field.remove_normal_field();
        debug!(model = %model, n_max, records, "read gravity field coefficients");
        Ok(field)
    }

    /// Subtract the even zonals of the normal field, rescaled to the
    /// model's GM and radius.
    fn remove_normal_field(&mut self) {
        let ell = self.ellipsoid;
        let gm_ratio = ell.gm() / self.model.gm();
        let a_ratio = ell.a() / self.model.radius();

        for i in (1..=NORMAL_ZONAL_TERMS).filter(|&i| 2 * i <= self.n_max) {
            let correction =
                gm_ratio * a_ratio.powi(i as i32) * ell.j2n(i) / ((4 * i + 1) as f64).sqrt();
            self.c[index(2 * i as usize, 0)] += correction;
        }
    }

    pub fn model(&self) -> GravityModel {
        self.model
    }

    /// Reference ellipsoid of the normal field
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn max_degree(&self) -> u32 {
        self.n_max
    }

    /// `C̄nm` of the disturbing potential; `n ≤ max_degree`, `m ≤ n`
    pub fn c(&self, n: usize, m: usize) -> f64 {
        self.c[index(n, m)]
    }

    /// `S̄nm`; `n ≤ max_degree`, `m ≤ n`
    pub fn s(&self, n: usize, m: usize) -> f64 {
        self.s[index(n, m)]
    }

    /// Coefficients `(C̄n0..C̄nn, S̄n0..S̄nn)` of degree `n`
    pub(crate) fn degree(&self, n: usize) -> (&[f64], &[f64]) {
        let range = index(n, 0)..=index(n, n);
        (&self.c[range.clone()], &self.s[range])
    }

    /// Standard errors `(σC̄nm, σS̄nm)`
    pub fn sigma(&self, n: usize, m: usize) -> (f64, f64) {
        let k = index(n, m);
        (self.sigma_c[k], self.sigma_s[k])
    }

    /// `Σ σ²` over all coefficients of degree 2 and above
    pub fn commission_variance(&self) -> f64 {
        let start = index(2, 0);
        self.sigma_c[start..]
            .iter()
            .zip(&self.sigma_s[start..])
            .map(|(c, s)| c * c + s * s)
            .sum()
    }
}

fn parse_index(raw: &str, line: usize) -> Result<usize> {
    raw.parse::<usize>().map_err(|e| Error::Parse {
        line,
        reason: format!("'{raw}': {e}"),
    })
}

fn parse_coefficient(raw: &str, line: usize) -> Result<f64> {
    raw.replace(['D', 'd'], "e")
        .parse::<f64>()
        .map_err(|e| Error::Parse {
            line,
            reason: format!("'{raw}': {e}"),
        })
}
