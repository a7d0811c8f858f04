//! Body keypoint types shared by every stage of the pipeline.
//!
//! The joint vocabulary is the 17-point MoveNet/COCO skeleton. Any name that
//! appears in a pose frame or exercise definition has to be one of these, which
//! is enforced when the data is deserialized.

use crate::{Error, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anatomical landmark names understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointName {
    /// Every joint in detector output order
    pub const ALL: [JointName; 17] = [
        JointName::Nose,
        JointName::LeftEye,
        JointName::RightEye,
        JointName::LeftEar,
        JointName::RightEar,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftWrist,
        JointName::RightWrist,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftAnkle,
        JointName::RightAnkle,
    ];

    /// Wire name, e.g. `left_shoulder`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JointName::Nose => "nose",
            JointName::LeftEye => "left_eye",
            JointName::RightEye => "right_eye",
            JointName::LeftEar => "left_ear",
            JointName::RightEar => "right_ear",
            JointName::LeftShoulder => "left_shoulder",
            JointName::RightShoulder => "right_shoulder",
            JointName::LeftElbow => "left_elbow",
            JointName::RightElbow => "right_elbow",
            JointName::LeftWrist => "left_wrist",
            JointName::RightWrist => "right_wrist",
            JointName::LeftHip => "left_hip",
            JointName::RightHip => "right_hip",
            JointName::LeftKnee => "left_knee",
            JointName::RightKnee => "right_knee",
            JointName::LeftAnkle => "left_ankle",
            JointName::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JointName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        JointName::ALL
            .iter()
            .copied()
            .find(|joint| joint.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown joint name: {s}")))
    }
}

/// Pixel position in the source frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn to_point(self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// One landmark estimate for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: JointName,
    pub x: f64,
    pub y: f64,
    /// Detector confidence in [0, 1]
    #[serde(rename = "score")]
    pub confidence: f64,
}

impl Keypoint {
    #[must_use]
    pub const fn new(name: JointName, x: f64, y: f64, confidence: f64) -> Self {
        Self { name, x, y, confidence }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Full set of keypoints detected for one camera frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseFrame {
    pub keypoints: Vec<Keypoint>,
    /// Capture time in epoch milliseconds
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Pose whose positions have been replaced by filtered estimates
pub type SmoothedPose = PoseFrame;

impl PoseFrame {
    /// Build a frame, rejecting keypoint lists that name a joint twice
    pub fn new(keypoints: Vec<Keypoint>, timestamp: f64, width: u32, height: u32) -> Result<Self> {
        for (i, kp) in keypoints.iter().enumerate() {
            if keypoints[..i].iter().any(|other| other.name == kp.name) {
                return Err(Error::InvalidInput(format!("Duplicate keypoint: {}", kp.name)));
            }
        }

        Ok(Self {
            keypoints,
            timestamp,
            width,
            height,
        })
    }

    /// Look up a joint by name
    #[must_use]
    pub fn get(&self, name: JointName) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_name_round_trip() {
        for joint in JointName::ALL {
            assert_eq!(joint.as_str().parse::<JointName>().unwrap(), joint);
        }
        assert!("left_toe".parse::<JointName>().is_err());
    }

    #[test]
    fn test_keypoint_wire_format() {
        let kp: Keypoint = serde_json::from_str(r#"{"name":"left_knee","x":1.5,"y":2.0,"score":0.9}"#).unwrap();
        assert_eq!(kp, Keypoint::new(JointName::LeftKnee, 1.5, 2.0, 0.9));

        let unknown = serde_json::from_str::<Keypoint>(r#"{"name":"tail","x":0,"y":0,"score":1}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_pose_frame_rejects_duplicates() {
        let kp = Keypoint::new(JointName::Nose, 0.0, 0.0, 1.0);
        assert!(PoseFrame::new(vec![kp, kp], 0.0, 640, 480).is_err());
        assert!(PoseFrame::new(vec![kp], 0.0, 640, 480).is_ok());
    }

    #[test]
    fn test_pose_frame_lookup() {
        let frame = PoseFrame::new(
            vec![
                Keypoint::new(JointName::LeftHip, 10.0, 20.0, 0.8),
                Keypoint::new(JointName::RightHip, 30.0, 20.0, 0.7),
            ],
            0.0,
            640,
            480,
        )
        .unwrap();

        assert_eq!(frame.get(JointName::RightHip).map(|kp| kp.x), Some(30.0));
        assert!(frame.get(JointName::Nose).is_none());
    }
}
