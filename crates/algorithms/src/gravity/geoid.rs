//! Height-anomaly synthesis from a global gravity field model
//!
//! ```text
//! N(φ, λ) = N0 + GM/(r·γ) · Σn=2..nmax (a/r)ⁿ Σm=0..n (C̄nm cos mλ + S̄nm sin mλ) P̄nm(sin φ̄)
//! N0      = (GM − GMₑ)/(R·γ̄) − (W0 − U0)/γ̄
//! ```
//! `φ̄` is the geocentric latitude, `r` the ellipsoidal radius and `γ` the
//! normal gravity at the point; `R` and `γ̄` are the mean radius and mean
//! gravity of the ellipsoid.
//!
//! The accuracy of the synthesized heights combines the coefficient
//! commission error with an omission term for the truncated degrees:
//! ```text
//! σN = R·√(Σ σ²(C̄nm, S̄nm) + 10⁻¹⁰/(nmax+1)²)
//! ```

use quasigeoid_core::{Error, GridSpec, ModelSurface, Result};

use super::coefficients::{GravityFieldModel, GEOID_POTENTIAL};
use super::legendre::Legendre;

/// Omission constant of the degree-variance model
const OMISSION_SCALE: f64 = 1.0e-10;

/// Quasigeoid heights synthesized from a [`GravityFieldModel`].
///
/// As a [`ModelSurface`] it evaluates any point on the globe; filling a
/// grid goes through [`ModelSurface::row_heights`], which builds the
/// Legendre table once per grid row.
#[derive(Debug, Clone)]
pub struct GeoidSynthesis {
    field: GravityFieldModel,
    n0: f64,
    total_error: f64,
}

impl GeoidSynthesis {
    pub fn new(field: GravityFieldModel) -> Self {
        let ell = field.ellipsoid();
        let model = field.model();

        let n0 = (model.gm() - ell.gm()) / (ell.mean_radius() * ell.mean_gravity())
            - (GEOID_POTENTIAL - ell.normal_potential()) / ell.mean_gravity();

        let omission = OMISSION_SCALE / ((field.max_degree() + 1) as f64).powi(2);
        let total_error = ell.mean_radius() * (field.commission_variance() + omission).sqrt();

        Self {
            field,
            n0,
            total_error,
        }
    }

    pub fn field(&self) -> &GravityFieldModel {
        &self.field
    }

    /// Zero-degree term `N0` (m)
    pub fn zero_degree_term(&self) -> f64 {
        self.n0
    }

    /// Standard error of a synthesized height (m)
    pub fn total_error(&self) -> f64 {
        self.total_error
    }

    /// Radius of the ellipsoid at geodetic latitude `lat` (radians)
    fn ellipsoidal_radius(&self, lat: f64) -> f64 {
        let ell = self.field.ellipsoid();
        let e2 = ell.eccentricity().powi(2);
        let s2 = lat.sin().powi(2);
        ell.a() * (1.0 - e2 * (1.0 - e2) * s2 / (1.0 - e2 * s2)).sqrt()
    }

    /// Latitude-only factors: Legendre table, `r` and `GM/(r·γ)`
    fn latitude_terms(&self, lat_deg: f64) -> Result<(Legendre, f64, f64)> {
        let ell = self.field.ellipsoid();
        let lat = lat_deg.to_radians();
        let geocentric = (ell.axis_ratio_squared() * lat.tan()).atan();

        let legendre = Legendre::new(geocentric, self.field.max_degree())?;
        let r = self.ellipsoidal_radius(lat);
        let gamma = ell.normal_gravity(lat);
        Ok((legendre, r, self.field.model().gm() / (r * gamma)))
    }

    fn synthesize(&self, legendre: &Legendre, r: f64, factor: f64, lon_deg: f64) -> f64 {
        let n_max = self.field.max_degree() as usize;
        let lon = lon_deg.to_radians();
        let (sin_m, cos_m): (Vec<f64>, Vec<f64>) =
            (0..=n_max).map(|m| (m as f64 * lon).sin_cos()).unzip();

        let scale = self.field.model().radius() / r;
        let mut scale_n = scale;
        let mut sum = 0.0;
        for n in 2..=n_max {
            scale_n *= scale;
            let (c, s) = self.field.degree(n);
            let p = legendre.degree(n);
            let sigma: f64 = (0..=n)
                .map(|m| (c[m] * cos_m[m] + s[m] * sin_m[m]) * p[m])
                .sum();
            sum += sigma * scale_n;
        }

        sum * factor + self.n0
    }
}

fn check_latitude(lat_deg: f64, lon_deg: f64) -> Result<()> {
    if (-90.0..=90.0).contains(&lat_deg) && lon_deg.is_finite() {
        Ok(())
    } else {
        Err(Error::OutOfDomain {
            lat: lat_deg,
            lon: lon_deg,
        })
    }
}

impl ModelSurface for GeoidSynthesis {
    fn height(&self, lat_deg: f64, lon_deg: f64) -> Result<f64> {
        check_latitude(lat_deg, lon_deg)?;
        let (legendre, r, factor) = self.latitude_terms(lat_deg)?;
        Ok(self.synthesize(&legendre, r, factor, lon_deg))
    }

    fn row_heights(&self, spec: &GridSpec, row: usize) -> Result<Vec<f64>> {
        let (lat_deg, lon_deg) = spec.node_to_geo(row, 0);
        check_latitude(lat_deg, lon_deg)?;
        let (legendre, r, factor) = self.latitude_terms(lat_deg)?;

        Ok((0..spec.cols())
            .map(|col| {
                let (_, lon_deg) = spec.node_to_geo(row, col);
                self.synthesize(&legendre, r, factor, lon_deg)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::GravityModel;
    use approx::assert_relative_eq;
    use quasigeoid_core::{Ellipsoid, Geodetic, Grid, RefSystem};
    use std::io::Cursor;

    /// Normal-field zonals of `ell` in the model's scaling, so that only the
    /// extra records survive normal-field removal.
    fn normal_field_gfc(ell: &Ellipsoid, n_max: u32, extra: &str) -> String {
        let model = GravityModel::Egm2008;
        let mut gfc = String::from("end_of_head\ngfc 0 0 1.0 0.0 0.0 0.0\n");
        for i in 1..=n_max / 2 {
            let c = -(ell.gm() / model.gm())
                * (ell.a() / model.radius()).powi(i as i32)
                * ell.j2n(i)
                / ((4 * i + 1) as f64).sqrt();
            gfc.push_str(&format!("gfc {} 0 {:e} 0.0 1.0e-11 0.0\n", 2 * i, c));
        }
        gfc.push_str(extra);
        gfc
    }

    fn synthesis(extra: &str) -> GeoidSynthesis {
        let ell = RefSystem::Grs80.ellipsoid();
        let gfc = normal_field_gfc(&ell, 4, extra);
        let field =
            GravityFieldModel::from_reader(Cursor::new(gfc), GravityModel::Egm2008, ell, Some(4))
                .unwrap();
        GeoidSynthesis::new(field)
    }

    #[test]
    fn test_zero_degree_term_grs80_egm2008() {
        let g = synthesis("");
        // (GM − GMₑ)/(R·γ̄) ≈ −0.937 m, −(W0 − U0)/γ̄ ≈ +0.495 m
        assert!(g.zero_degree_term() > -0.45 && g.zero_degree_term() < -0.43);
    }

    #[test]
    fn test_normal_field_only_gives_zero_degree_term() {
        let g = synthesis("");
        for (lat, lon) in [(51.0, 23.0), (54.3, 28.7), (-33.0, 151.0), (0.0, 0.0)] {
            assert_relative_eq!(g.height(lat, lon).unwrap(), g.zero_degree_term(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sectorial_term_follows_cos_two_lambda() {
        let g = synthesis("gfc 2 2 1.0e-6 0.0 0.0 0.0\n");
        let n0 = g.zero_degree_term();

        let east = g.height(45.0, 0.0).unwrap() - n0;
        let north = g.height(45.0, 90.0).unwrap() - n0;
        let diagonal = g.height(45.0, 45.0).unwrap() - n0;

        assert!(east.abs() > 1.0);
        assert_relative_eq!(east, -north, max_relative = 1e-9);
        assert!(diagonal.abs() < 1e-9);
    }

    #[test]
    fn test_row_heights_match_pointwise_synthesis() {
        let g = synthesis("gfc 3 1 2.0e-7 -1.5e-7 0.0 0.0\ngfc 4 3 -3.0e-7 4.0e-7 0.0 0.0\n");
        let spec = GridSpec::new(51.0, 23.0, 52.0, 25.0, 0.5, 0.5).unwrap();

        let mut grid = Grid::new(spec).unwrap();
        grid.fill_from(&g).unwrap();

        for node in grid.nodes() {
            let expected = g.height(node.point().lat_deg(), node.point().lon_deg()).unwrap();
            assert_relative_eq!(node.model().value(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_total_error_combines_commission_and_omission() {
        let g = synthesis("");
        let ell = RefSystem::Grs80.ellipsoid();
        // two zonals carry σ = 1e-11
        let expected = ell.mean_radius() * (2.0_f64 * 1e-22 + 1e-10 / 25.0).sqrt();
        assert_relative_eq!(g.total_error(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_latitude_outside_globe() {
        let g = synthesis("");
        assert!(matches!(g.height(91.0, 0.0), Err(Error::OutOfDomain { .. })));
        assert!(matches!(g.height(f64::NAN, 0.0), Err(Error::OutOfDomain { .. })));
    }
}
