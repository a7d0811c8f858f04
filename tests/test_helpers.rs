//! Helper functions and utilities for tests
#![allow(dead_code)]

use exercise_form_analysis::{
    catalogue::{BodyRegion, Catalogue, Direction, ExerciseDefinition, Phase, RepLogic},
    keypoint::{JointName, Keypoint, PoseFrame},
};
use std::collections::BTreeMap;

/// Interval between frames of a 30 fps camera
pub const FRAME_MS: f64 = 1000.0 / 30.0;

/// Build a frame where every joint has the same confidence
pub fn create_test_frame(points: &[(JointName, f64, f64)], confidence: f64, timestamp: f64) -> PoseFrame {
    let keypoints = points
        .iter()
        .map(|&(name, x, y)| Keypoint::new(name, x, y, confidence))
        .collect();
    PoseFrame::new(keypoints, timestamp, 640, 480).expect("test frames have unique joints")
}

/// Right arm whose elbow angle is `angle_deg`, upper arm hanging straight down
pub fn right_arm_at(angle_deg: f64) -> Vec<(JointName, f64, f64)> {
    let (elbow_x, elbow_y) = (300.0, 250.0);
    let heading = (angle_deg - 90.0).to_radians();
    vec![
        (JointName::RightShoulder, elbow_x, elbow_y - 100.0),
        (JointName::RightElbow, elbow_x, elbow_y),
        (
            JointName::RightWrist,
            elbow_x + 100.0 * heading.cos(),
            elbow_y + 100.0 * heading.sin(),
        ),
    ]
}

/// Elbow flexion/extension cycle: extension (>= 160) <-> flexion (<= 100)
pub fn elbow_rep_logic() -> RepLogic {
    RepLogic {
        joints: [JointName::RightShoulder, JointName::RightElbow, JointName::RightWrist],
        start_phase: "extension".to_string(),
        phases: BTreeMap::from([
            (
                "extension".to_string(),
                Phase::new(160.0, Direction::AtLeast, "Curl up", "flexion"),
            ),
            (
                "flexion".to_string(),
                Phase::new(100.0, Direction::AtMost, "Lower slowly", "extension"),
            ),
        ]),
    }
}

/// Catalogue with an elbow-curl exercise (reps only) and a rule-only exercise
pub fn create_test_catalogue() -> Catalogue {
    let mut catalogue = Catalogue::builtin();
    catalogue.insert(
        "curl",
        ExerciseDefinition {
            name: "Elbow Curl".to_string(),
            region: BodyRegion::HalfBody,
            required_joints: vec![JointName::RightShoulder, JointName::RightElbow, JointName::RightWrist],
            rules: vec![],
            rep_logic: Some(elbow_rep_logic()),
        },
    );
    catalogue
}
