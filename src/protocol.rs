//! JSON message protocol between the caller and the engine.
//!
//! ```json
//! {"type":"pose","payload":{"poseFrame":{"keypoints":[...]},"timestamp":1700000000000}}
//! {"type":"setExercise","payload":{"exerciseId":"squat"}}
//! {"type":"result","payload":{"smoothedPose":{...},"feedbackEvents":[],"repState":null,"visibleJoints":[]}}
//! ```

use crate::keypoint::{JointName, PoseFrame, SmoothedPose};
use crate::reps::RepState;
use crate::rules::FeedbackEvent;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosePayload {
    pub pose_frame: PoseFrame,
    /// Epoch milliseconds, expected non-decreasing
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetExercisePayload {
    pub exercise_id: String,
}

/// Caller -> engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum InboundMessage {
    Pose(PosePayload),
    SetExercise(SetExercisePayload),
}

impl InboundMessage {
    #[must_use]
    pub fn pose(pose_frame: PoseFrame, timestamp: f64) -> Self {
        InboundMessage::Pose(PosePayload { pose_frame, timestamp })
    }

    #[must_use]
    pub fn set_exercise(exercise_id: &str) -> Self {
        InboundMessage::SetExercise(SetExercisePayload {
            exercise_id: exercise_id.to_string(),
        })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything the engine produced for one pose message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResult {
    pub smoothed_pose: SmoothedPose,
    pub feedback_events: Vec<FeedbackEvent>,
    /// `None` when the active exercise has no repetition logic
    pub rep_state: Option<RepState>,
    pub visible_joints: Vec<JointName>,
}

/// Engine -> caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum OutboundMessage {
    Result(FrameResult),
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn into_result(self) -> FrameResult {
        match self {
            OutboundMessage::Result(result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::Keypoint;

    #[test]
    fn test_parse_pose_message() {
        let text = r#"{"type":"pose","payload":{"poseFrame":{"keypoints":[
            {"name":"nose","x":320.5,"y":100.0,"score":0.92}],"width":640,"height":480,"frameId":7},
            "timestamp":1700000000000}}"#;

        match InboundMessage::from_json(text).unwrap() {
            InboundMessage::Pose(payload) => {
                assert_eq!(payload.timestamp, 1_700_000_000_000.0);
                assert_eq!(payload.pose_frame.width, 640);
                assert_eq!(
                    payload.pose_frame.keypoints,
                    vec![Keypoint::new(JointName::Nose, 320.5, 100.0, 0.92)]
                );
            }
            other => panic!("Expected pose message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_set_exercise_message() {
        let message = InboundMessage::from_json(r#"{"type":"setExercise","payload":{"exerciseId":"bicepCurl"}}"#).unwrap();
        assert_eq!(message, InboundMessage::set_exercise("bicepCurl"));
    }

    #[test]
    fn test_unknown_message_type_is_an_error() {
        assert!(InboundMessage::from_json(r#"{"type":"shutdown","payload":{}}"#).is_err());
    }

    #[test]
    fn test_result_wire_names() {
        let result = OutboundMessage::Result(FrameResult {
            smoothed_pose: SmoothedPose::new(vec![], 0.0, 640, 480).unwrap(),
            feedback_events: vec![],
            rep_state: Some(RepState {
                phase: "extension".to_string(),
                rep_count: 2,
                guidance: "Curl Up".to_string(),
            }),
            visible_joints: vec![JointName::LeftKnee],
        });
        let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "result");
        assert_eq!(value["payload"]["repState"]["repCount"], 2);
        assert_eq!(value["payload"]["visibleJoints"][0], "left_knee");
        assert!(value["payload"]["feedbackEvents"].as_array().unwrap().is_empty());
        assert!(value["payload"]["smoothedPose"]["keypoints"].is_array());
    }
}
