//! Posterior covariance of the collocation prediction
//!
//! With `Q = Cst·Cinv`:
//! ```text
//! plain:     E = Css − Q·Cstᵀ
//! adjusted:  E = Css − Q·Cstᵀ + (Q·A − B)·Exx·(Aᵀ·Qᵀ − Bᵀ),   Exx = (Aᵀ·Cinv·A)⁻¹
//! ```
//! The correction term accounts for the uncertainty of the estimated trend
//! coefficients; leaving it out understates the prediction error.
//!
//! `Css` is the auto-covariance of the targets under the same stationary,
//! isotropic covariance function fitted to the control points, so its
//! diagonal is the signal variance.

use nalgebra::DMatrix;

/// Trend matrices entering the adjusted posterior covariance
#[derive(Debug, Clone, Copy)]
pub struct TrendAdjustment<'a> {
    /// Impact matrix of the control points (n × p)
    pub a: &'a DMatrix<f64>,
    /// Impact matrix of the targets (m × p)
    pub b: &'a DMatrix<f64>,
    /// Covariance of the trend coefficients (p × p)
    pub exx: &'a DMatrix<f64>,
}

/// Posterior covariance of a prediction, plain or trend-adjusted.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMatrix<'a> {
    q: &'a DMatrix<f64>,
    cst: &'a DMatrix<f64>,
    trend: Option<TrendAdjustment<'a>>,
}

impl<'a> ErrorMatrix<'a> {
    /// `q = Cst·Cinv` (m × n) and `cst` (m × n)
    pub fn new(q: &'a DMatrix<f64>, cst: &'a DMatrix<f64>) -> Self {
        Self {
            q,
            cst,
            trend: None,
        }
    }

    pub fn with_trend(mut self, trend: TrendAdjustment<'a>) -> Self {
        self.trend = Some(trend);
        self
    }

    /// `Q·A − B`
    fn trend_gain(&self, trend: &TrendAdjustment<'_>) -> DMatrix<f64> {
        self.q * trend.a - trend.b
    }

    /// Full m × m posterior covariance for a given target auto-covariance
    pub fn full(&self, css: &DMatrix<f64>) -> DMatrix<f64> {
        let mut e = css - self.q * self.cst.transpose();
        if let Some(trend) = &self.trend {
            let g = self.trend_gain(trend);
            e += &g * trend.exx * g.transpose();
        }
        e
    }

    /// Diagonal of [`full`](Self::full) when the diagonal of `Css` is
    /// `variance`, without forming any m × m matrix.
    pub fn variances(&self, variance: f64) -> Vec<f64> {
        let m = self.q.nrows();
        let mut vars: Vec<f64> = (0..m)
            .map(|i| variance - self.q.row(i).dot(&self.cst.row(i)))
            .collect();

        if let Some(trend) = &self.trend {
            let g = self.trend_gain(trend);
            let ge = &g * trend.exx;
            for (i, v) in vars.iter_mut().enumerate() {
                *v += ge.row(i).dot(&g.row(i));
            }
        }
        vars
    }

    /// Standard errors; variances that round below zero are clamped to 0
    pub fn standard_errors(&self, variance: f64) -> Vec<f64> {
        self.variances(variance)
            .into_iter()
            .map(|v| v.max(0.0).sqrt())
            .collect()
    }
}
