//! Summary statistics of signal sets

use quasigeoid_core::Observation;

/// Root mean square of one component of a set of signals; 0 for an
/// empty set.
///
/// ```ignore
/// let value_rms = rms_of_signals(&signals, Observation::value);
/// let error_rms = rms_of_signals(&signals, Observation::error);
/// ```
pub fn rms_of_signals<F>(signals: &[Observation], component: F) -> f64
where
    F: Fn(&Observation) -> f64,
{
    if signals.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = signals.iter().map(|s| component(s).powi(2)).sum();
    (sum_sq / signals.len() as f64).sqrt()
}

/// RMS of the values and of the errors of a signal set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalRms {
    pub value: f64,
    pub error: f64,
}

impl SignalRms {
    pub fn of(signals: &[Observation]) -> Self {
        Self {
            value: rms_of_signals(signals, Observation::value),
            error: rms_of_signals(signals, Observation::error),
        }
    }
}
