//! One-Euro adaptive low-pass filter for 2-D joint positions.
//!
//! Damped when the joint is still, responsive while it moves: the position
//! cutoff grows linearly with the filtered speed,
//! `cutoff = min_cutoff + beta * |dx|`.

use super::low_pass::{smoothing_factor, LowPassFilter};
use super::PointFilter;
use crate::constants::{DEFAULT_BETA, DEFAULT_DERIVATIVE_CUTOFF, DEFAULT_MIN_CUTOFF, MS_PER_SECOND};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tuning parameters, fixed for the lifetime of a filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneEuroParams {
    /// Cutoff (Hz) at rest; lower is smoother
    pub min_cutoff: f64,
    /// Cutoff gain per unit of speed (px/s); higher means less lag on fast motion
    pub beta: f64,
    /// Cutoff (Hz) of the derivative filter
    pub derivative_cutoff: f64,
}

impl Default for OneEuroParams {
    fn default() -> Self {
        Self {
            min_cutoff: DEFAULT_MIN_CUTOFF,
            beta: DEFAULT_BETA,
            derivative_cutoff: DEFAULT_DERIVATIVE_CUTOFF,
        }
    }
}

impl OneEuroParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_cutoff.is_finite() && self.min_cutoff > 0.0) {
            return Err(Error::FilterError(format!(
                "Minimum cutoff must be positive, got {}",
                self.min_cutoff
            )));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(Error::FilterError(format!("Beta must be non-negative, got {}", self.beta)));
        }
        if !(self.derivative_cutoff.is_finite() && self.derivative_cutoff > 0.0) {
            return Err(Error::FilterError(format!(
                "Derivative cutoff must be positive, got {}",
                self.derivative_cutoff
            )));
        }
        Ok(())
    }
}

/// Position and derivative filters for one axis
#[derive(Debug, Clone, Default)]
struct AxisFilter {
    position: LowPassFilter,
    derivative: LowPassFilter,
}

impl AxisFilter {
    fn prime(&mut self, value: f64) {
        self.position.filter(value, 1.0);
        self.derivative.filter(0.0, 1.0);
    }

    fn filter(&mut self, value: f64, dt: f64, params: &OneEuroParams) -> f64 {
        let raw_derivative = match self.position.last_raw() {
            Some(previous) => (value - previous) / dt,
            None => 0.0,
        };
        let derivative = self
            .derivative
            .filter(raw_derivative, smoothing_factor(params.derivative_cutoff, dt));

        let cutoff = params.beta.mul_add(derivative.abs(), params.min_cutoff);
        self.position.filter(value, smoothing_factor(cutoff, dt))
    }

    fn reset(&mut self) {
        self.position.reset();
        self.derivative.reset();
    }
}

/// One-Euro filter over an (x, y) position
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    params: OneEuroParams,
    x: AxisFilter,
    y: AxisFilter,
    last_timestamp_ms: Option<f64>,
}

impl OneEuroFilter {
    /// Create a new One-Euro filter
    ///
    /// # Panics
    ///
    /// Panics if the parameters are out of range; use [`OneEuroParams::validate`]
    /// first when they come from user input.
    #[must_use]
    pub fn new(params: OneEuroParams) -> Self {
        assert!(params.min_cutoff > 0.0, "Minimum cutoff must be positive");
        assert!(params.beta >= 0.0, "Beta must be non-negative");
        assert!(params.derivative_cutoff > 0.0, "Derivative cutoff must be positive");

        Self {
            params,
            x: AxisFilter::default(),
            y: AxisFilter::default(),
            last_timestamp_ms: None,
        }
    }

    #[must_use]
    pub fn params(&self) -> &OneEuroParams {
        &self.params
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::new(OneEuroParams::default())
    }
}

impl PointFilter for OneEuroFilter {
    fn apply(&mut self, x: f64, y: f64, timestamp_ms: f64) -> (f64, f64) {
        // Non-finite samples pass through and leave the state alone
        if !(x.is_finite() && y.is_finite() && timestamp_ms.is_finite()) {
            return (x, y);
        }

        let Some(previous) = self.last_timestamp_ms else {
            self.x.prime(x);
            self.y.prime(y);
            self.last_timestamp_ms = Some(timestamp_ms);
            return (x, y);
        };

        let dt = (timestamp_ms - previous) / MS_PER_SECOND;
        if dt <= 0.0 {
            return (x, y);
        }

        let filtered = (
            self.x.filter(x, dt, &self.params),
            self.y.filter(y, dt, &self.params),
        );
        self.last_timestamp_ms = Some(timestamp_ms);

        filtered
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.last_timestamp_ms = None;
    }

    fn name(&self) -> &str {
        "OneEuroFilter"
    }
}
