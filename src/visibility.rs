//! Visibility gating for flickering or low-confidence joints.
//!
//! A joint only counts as usable once its confidence has stayed at or above
//! the threshold for a continuous dwell period. A single low-confidence frame
//! throws the accumulated dwell away.

use crate::constants::{VISIBILITY_CONFIDENCE_THRESHOLD, VISIBILITY_DWELL_MS};
use crate::keypoint::{JointName, Keypoint};
use std::collections::{BTreeSet, HashMap};

/// Dwell bookkeeping for one joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityRecord {
    /// When confidence most recently rose above the threshold
    pub since_ms: f64,
    /// Whether the dwell requirement has been met
    pub stable: bool,
}

/// Debounces per-frame confidence into a stable visibility set
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    confidence_threshold: f64,
    dwell_ms: f64,
    records: HashMap<JointName, VisibilityRecord>,
}

impl VisibilityGate {
    #[must_use]
    pub fn new(confidence_threshold: f64, dwell_ms: f64) -> Self {
        Self {
            confidence_threshold,
            dwell_ms,
            records: HashMap::new(),
        }
    }

    /// Update records from one frame and return the joints that are stably visible
    ///
    /// Joints missing from `keypoints` keep whatever record they had.
    pub fn update_visibility(&mut self, keypoints: &[Keypoint], timestamp_ms: f64) -> BTreeSet<JointName> {
        let mut visible = BTreeSet::new();

        for kp in keypoints {
            if kp.confidence >= self.confidence_threshold {
                let record = self.records.entry(kp.name).or_insert(VisibilityRecord {
                    since_ms: timestamp_ms,
                    stable: false,
                });
                if timestamp_ms - record.since_ms >= self.dwell_ms {
                    record.stable = true;
                }
                if record.stable {
                    visible.insert(kp.name);
                }
            } else {
                self.records.remove(&kp.name);
            }
        }

        visible
    }

    #[must_use]
    pub fn record(&self, joint: JointName) -> Option<&VisibilityRecord> {
        self.records.get(&joint)
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(VISIBILITY_CONFIDENCE_THRESHOLD, VISIBILITY_DWELL_MS)
    }
}
