//! Signal filtering algorithms for smoothing joint positions.
//!
//! Each joint gets its own filter instance, created the first time the joint is
//! seen and kept for the rest of the session. [`JointSmoother`] owns that map.

/// First-order low-pass building block
pub mod low_pass;

/// One-Euro adaptive filter
pub mod one_euro;

use crate::keypoint::{JointName, Keypoint, PoseFrame, SmoothedPose};
use crate::{Error, Result};
use one_euro::{OneEuroFilter, OneEuroParams};
use std::collections::HashMap;

/// Trait for all per-joint position filters
pub trait PointFilter: Send + Sync {
    /// Filter one position sample taken at `timestamp_ms`
    fn apply(&mut self, x: f64, y: f64, timestamp_ms: f64) -> (f64, f64);

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl PointFilter for NoFilter {
    fn apply(&mut self, x: f64, y: f64, _timestamp_ms: f64) -> (f64, f64) {
        (x, y)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Which filter to build for each joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    None,
    OneEuro(OneEuroParams),
}

impl Default for FilterKind {
    fn default() -> Self {
        FilterKind::OneEuro(OneEuroParams::default())
    }
}

impl FilterKind {
    /// Parse a filter description such as `none`, `one_euro` or
    /// `one_euro:<min_cutoff>:<beta>:<derivative_cutoff>`
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.split(':');
        let name = parts.next().unwrap_or_default().trim().to_lowercase();
        let args = parts
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|_| Error::FilterError(format!("Invalid filter parameter '{p}' in '{spec}'")))
            })
            .collect::<Result<Vec<f64>>>()?;

        match name.as_str() {
            "none" | "nofilter" => {
                if !args.is_empty() {
                    return Err(Error::FilterError(format!("Filter '{name}' takes no parameters")));
                }
                Ok(FilterKind::None)
            }
            "one_euro" | "oneeuro" | "1euro" => {
                let defaults = OneEuroParams::default();
                let params = match args.as_slice() {
                    [] => defaults,
                    [min_cutoff] => OneEuroParams {
                        min_cutoff: *min_cutoff,
                        ..defaults
                    },
                    [min_cutoff, beta] => OneEuroParams {
                        min_cutoff: *min_cutoff,
                        beta: *beta,
                        ..defaults
                    },
                    [min_cutoff, beta, derivative_cutoff] => OneEuroParams {
                        min_cutoff: *min_cutoff,
                        beta: *beta,
                        derivative_cutoff: *derivative_cutoff,
                    },
                    _ => {
                        return Err(Error::FilterError(format!(
                            "Too many parameters for one_euro filter: {spec}"
                        )))
                    }
                };
                params.validate()?;
                Ok(FilterKind::OneEuro(params))
            }
            _ => Err(Error::FilterError(format!("Unknown filter type: {spec}"))),
        }
    }

    /// Build a fresh filter instance
    #[must_use]
    pub fn build(&self) -> Box<dyn PointFilter> {
        match self {
            FilterKind::None => Box::new(NoFilter),
            FilterKind::OneEuro(params) => Box::new(OneEuroFilter::new(*params)),
        }
    }
}

/// Create a point filter by type name
pub fn create_filter(filter_type: &str) -> Result<Box<dyn PointFilter>> {
    FilterKind::parse(filter_type).map(|kind| kind.build())
}

/// Per-joint filter bank
pub struct JointSmoother {
    kind: FilterKind,
    filters: HashMap<JointName, Box<dyn PointFilter>>,
}

impl JointSmoother {
    #[must_use]
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            filters: HashMap::new(),
        }
    }

    /// Smooth one joint's position, creating its filter on first sighting
    pub fn filter(&mut self, joint: JointName, x: f64, y: f64, timestamp_ms: f64) -> (f64, f64) {
        let kind = self.kind;
        self.filters
            .entry(joint)
            .or_insert_with(|| kind.build())
            .apply(x, y, timestamp_ms)
    }

    /// Smooth every keypoint of a frame; confidences pass through unchanged
    pub fn smooth_pose(&mut self, frame: &PoseFrame, timestamp_ms: f64) -> SmoothedPose {
        let keypoints = frame
            .keypoints
            .iter()
            .map(|kp| {
                let (x, y) = self.filter(kp.name, kp.x, kp.y, timestamp_ms);
                Keypoint { x, y, ..*kp }
            })
            .collect();

        SmoothedPose {
            keypoints,
            timestamp: timestamp_ms,
            width: frame.width,
            height: frame.height,
        }
    }

    /// Drop every joint's filter state
    pub fn reset(&mut self) {
        self.filters.clear();
    }

    /// Number of joints with live filter state
    #[must_use]
    pub fn tracked_joints(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn kind(&self) -> FilterKind {
        self.kind
    }
}

impl Default for JointSmoother {
    fn default() -> Self {
        Self::new(FilterKind::default())
    }
}
