//! Repetition counting over a phase graph.
//!
//! The tracker sits in one phase at a time. Each phase declares the angle
//! condition for *entering* it, so while in phase `P` the tracker waits for the
//! condition of `P.next`. Re-entering the start phase completes a repetition.

use crate::catalogue::RepLogic;
use crate::geometry::joint_angle;
use crate::keypoint::{JointName, SmoothedPose};
use crate::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Live repetition progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepState {
    pub phase: String,
    pub rep_count: u32,
    pub guidance: String,
}

/// Hysteresis state machine driven by one joint angle
#[derive(Debug, Clone)]
pub struct RepTracker {
    logic: RepLogic,
    state: RepState,
}

impl RepTracker {
    pub fn new(logic: RepLogic) -> Result<Self> {
        logic.validate()?;
        let state = Self::initial_state(&logic)?;
        Ok(Self { logic, state })
    }

    fn initial_state(logic: &RepLogic) -> Result<RepState> {
        let start = logic
            .phase(&logic.start_phase)
            .ok_or_else(|| Error::CatalogueError(format!("Start phase '{}' is not defined", logic.start_phase)))?;

        Ok(RepState {
            phase: logic.start_phase.clone(),
            rep_count: 0,
            guidance: start.guidance.clone(),
        })
    }

    /// Advance from one frame; frozen unless all tracked joints are stably visible
    pub fn update(&mut self, pose: &SmoothedPose, visible: &BTreeSet<JointName>) -> &RepState {
        if self.logic.joints.iter().all(|joint| visible.contains(joint)) {
            let [a, b, c] = self.logic.joints;
            if let (Some(a), Some(b), Some(c)) = (pose.get(a), pose.get(b), pose.get(c)) {
                self.observe_angle(joint_angle(a.position(), b.position(), c.position()));
            }
        }
        &self.state
    }

    /// Feed one visible angle sample; returns whether the phase changed
    pub fn observe_angle(&mut self, angle: f64) -> bool {
        if !angle.is_finite() {
            return false;
        }

        let Some(armed_name) = self.logic.phase(&self.state.phase).map(|phase| phase.next.clone()) else {
            return false;
        };
        let Some(armed) = self.logic.phase(&armed_name) else {
            return false;
        };
        if !armed.is_entered_by(angle) {
            return false;
        }

        debug!("Phase {} -> {} at {angle:.1}°", self.state.phase, armed_name);
        self.state.guidance = armed.guidance.clone();
        if armed_name == self.logic.start_phase {
            self.state.rep_count += 1;
            debug!("Repetition {} complete", self.state.rep_count);
        }
        self.state.phase = armed_name;
        true
    }

    #[must_use]
    pub fn state(&self) -> &RepState {
        &self.state
    }

    #[must_use]
    pub fn logic(&self) -> &RepLogic {
        &self.logic
    }

    /// Return to the start phase with zero repetitions
    pub fn reset(&mut self) {
        if let Ok(state) = Self::initial_state(&self.logic) {
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{Direction, Phase};
    use std::collections::BTreeMap;

    fn elbow_logic() -> RepLogic {
        RepLogic {
            joints: [JointName::RightShoulder, JointName::RightElbow, JointName::RightWrist],
            start_phase: "extension".to_string(),
            phases: BTreeMap::from([
                ("extension".to_string(), Phase::new(160.0, Direction::AtLeast, "Curl up", "flexion")),
                ("flexion".to_string(), Phase::new(100.0, Direction::AtMost, "Lower slowly", "extension")),
            ]),
        }
    }

    #[test]
    fn test_initial_state() {
        let tracker = RepTracker::new(elbow_logic()).unwrap();
        assert_eq!(
            tracker.state(),
            &RepState {
                phase: "extension".to_string(),
                rep_count: 0,
                guidance: "Curl up".to_string(),
            }
        );
    }

    #[test]
    fn test_full_cycle_counts_one_rep() {
        let mut tracker = RepTracker::new(elbow_logic()).unwrap();

        assert!(!tracker.observe_angle(170.0));
        assert!(tracker.observe_angle(90.0));
        assert_eq!(tracker.state().phase, "flexion");
        assert_eq!(tracker.state().guidance, "Lower slowly");
        assert_eq!(tracker.state().rep_count, 0);

        assert!(tracker.observe_angle(170.0));
        assert_eq!(tracker.state().phase, "extension");
        assert_eq!(tracker.state().guidance, "Curl up");
        assert_eq!(tracker.state().rep_count, 1);
    }

    #[test]
    fn test_hysteresis_band_holds_phase() {
        let mut tracker = RepTracker::new(elbow_logic()).unwrap();
        tracker.observe_angle(95.0);

        // Between the two thresholds nothing changes
        for angle in [110.0, 130.0, 150.0, 159.9, 120.0] {
            assert!(!tracker.observe_angle(angle));
        }
        assert_eq!(tracker.state().phase, "flexion");
        assert_eq!(tracker.state().rep_count, 0);
    }

    #[test]
    fn test_non_finite_angle_is_ignored() {
        let mut tracker = RepTracker::new(elbow_logic()).unwrap();
        assert!(!tracker.observe_angle(f64::NAN));
        assert_eq!(tracker.state().phase, "extension");
    }

    #[test]
    fn test_reset() {
        let mut tracker = RepTracker::new(elbow_logic()).unwrap();
        tracker.observe_angle(90.0);
        tracker.observe_angle(170.0);
        tracker.observe_angle(90.0);
        tracker.reset();

        assert_eq!(tracker.state().phase, "extension");
        assert_eq!(tracker.state().rep_count, 0);
    }

    #[test]
    fn test_rejects_invalid_logic() {
        let logic = RepLogic {
            start_phase: "rest".to_string(),
            ..elbow_logic()
        };
        assert!(RepTracker::new(logic).is_err());
    }
}
