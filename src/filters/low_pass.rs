use std::f64::consts::PI;

/// Convert a cutoff frequency (Hz) and sample interval (s) into an
/// exponential smoothing coefficient: `1 / (1 + tau / dt)`, `tau = 1 / (2*pi*fc)`
#[must_use]
pub fn smoothing_factor(cutoff_hz: f64, dt_s: f64) -> f64 {
    let tau = 1.0 / (2.0 * PI * cutoff_hz);
    1.0 / (1.0 + tau / dt_s)
}

/// First-order low-pass filter with a per-sample coefficient
///
/// The coefficient is supplied on every call so that callers can adapt it to
/// the sample interval and signal speed.
#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    last_raw: Option<f64>,
    last_filtered: Option<f64>,
}

impl LowPassFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one sample. The first sample initializes the filter and passes through.
    pub fn filter(&mut self, value: f64, alpha: f64) -> f64 {
        let filtered = match self.last_filtered {
            Some(last) => alpha.mul_add(value - last, last),
            None => value,
        };

        self.last_raw = Some(value);
        self.last_filtered = Some(filtered);

        filtered
    }

    /// Most recent unfiltered input
    #[must_use]
    pub fn last_raw(&self) -> Option<f64> {
        self.last_raw
    }

    /// Most recent output
    #[must_use]
    pub fn last_filtered(&self) -> Option<f64> {
        self.last_filtered
    }

    pub fn reset(&mut self) {
        self.last_raw = None;
        self.last_filtered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut filter = LowPassFilter::new();

        assert_eq!(filter.filter(10.0, 0.5), 10.0);
        assert_eq!(filter.filter(20.0, 0.5), 15.0); // 10 + 0.5 * (20 - 10)
        assert_eq!(filter.last_raw(), Some(20.0));
        assert_eq!(filter.last_filtered(), Some(15.0));
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut filter = LowPassFilter::new();
        filter.filter(10.0, 0.5);
        filter.reset();

        assert!(filter.last_raw().is_none());
        assert_eq!(filter.filter(40.0, 0.1), 40.0);
    }

    #[test]
    fn test_smoothing_factor_bounds() {
        let dt = 1.0 / 30.0;
        let low = smoothing_factor(1.0, dt);
        let high = smoothing_factor(100.0, dt);

        assert!(low > 0.0 && low < 1.0);
        assert!(high > low, "higher cutoff must follow the input more closely");
        assert!(high < 1.0);
    }
}
