//! Fully normalized associated Legendre functions
//!
//! Standard forward column recursion in `t = sin φ`, `u = cos φ`:
//! ```text
//! P̄nn = u·√((2n+1)/(2n))·P̄n−1,n−1
//! P̄nm = a_nm·t·P̄n−1,m − b_nm·P̄n−2,m
//! a_nm = √((2n−1)(2n+1) / ((n−m)(n+m)))
//! b_nm = √((2n+1)(n+m−1)(n−m−1) / ((n−m)(n+m)(2n−3)))
//! ```
//! with `P̄00 = 1`, `P̄10 = √3·t`, `P̄11 = √3·u`.

use quasigeoid_core::{Error, Result};

/// Table of `P̄nm(sin φ)` for `0 ≤ m ≤ n ≤ n_max`, stored triangularly.
#[derive(Debug, Clone)]
pub struct Legendre {
    n_max: usize,
    values: Vec<f64>,
}

impl Legendre {
    /// Evaluate the table at geocentric latitude `phi` (radians).
    pub fn new(phi: f64, n_max: u32) -> Result<Self> {
        if n_max < 1 {
            return Err(Error::InvalidParameter {
                name: "n_max",
                value: n_max.to_string(),
                reason: "must be at least 1".into(),
            });
        }

        let n_max = n_max as usize;
        let (t, u) = phi.sin_cos();
        let mut values = vec![0.0; (n_max + 1) * (n_max + 2) / 2];
        let idx = |n: usize, m: usize| n * (n + 1) / 2 + m;

        let sqrt3 = 3f64.sqrt();
        values[idx(0, 0)] = 1.0;
        values[idx(1, 0)] = sqrt3 * t;
        values[idx(1, 1)] = sqrt3 * u;

        for n in 2..=n_max {
            let nf = n as f64;
            for m in 0..n {
                let mf = m as f64;
                let a = ((2.0 * nf - 1.0) * (2.0 * nf + 1.0) / ((nf - mf) * (nf + mf))).sqrt();
                let mut v = a * t * values[idx(n - 1, m)];
                if m + 2 <= n {
                    let b = ((2.0 * nf + 1.0) * (nf + mf - 1.0) * (nf - mf - 1.0)
                        / ((nf - mf) * (nf + mf) * (2.0 * nf - 3.0)))
                        .sqrt();
                    v -= b * values[idx(n - 2, m)];
                }
                values[idx(n, m)] = v;
            }
            values[idx(n, n)] = u * ((2.0 * nf + 1.0) / (2.0 * nf)).sqrt() * values[idx(n - 1, n - 1)];
        }

        Ok(Self { n_max, values })
    }

    pub fn max_degree(&self) -> usize {
        self.n_max
    }

    /// `P̄nm`, or `None` outside `0 ≤ m ≤ n ≤ n_max`
    pub fn value(&self, n: usize, m: usize) -> Option<f64> {
        (m <= n && n <= self.n_max).then(|| self.values[n * (n + 1) / 2 + m])
    }

    /// `P̄n0..P̄nn`; `n ≤ n_max`
    pub(crate) fn degree(&self, n: usize) -> &[f64] {
        let start = n * (n + 1) / 2;
        &self.values[start..=start + n]
    }
}
