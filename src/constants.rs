//! Constants used throughout the engine

/// Minimum detector confidence for a joint to count as seen
pub const VISIBILITY_CONFIDENCE_THRESHOLD: f64 = 0.35;

/// Continuous dwell (ms) before a seen joint is treated as stable
pub const VISIBILITY_DWELL_MS: f64 = 150.0;

/// One-Euro filter defaults, tuned for human motion in a ~640x480 frame
pub const DEFAULT_MIN_CUTOFF: f64 = 6.5;
pub const DEFAULT_BETA: f64 = 0.6;
pub const DEFAULT_DERIVATIVE_CUTOFF: f64 = 1.0;

/// Symmetry normalization scale (px) used when shoulder width is unavailable
pub const DEFAULT_SYMMETRY_SCALE: f64 = 100.0;

/// Milliseconds per second
pub const MS_PER_SECOND: f64 = 1000.0;

/// Confidence scores are reported on a 0-100 scale
pub const CONFIDENCE_PERCENT_SCALE: f64 = 100.0;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
