//! Geometric rule evaluation.
//!
//! Turns a smoothed, visibility-gated pose into feedback events for the active
//! exercise. Holds no per-frame memory; all temporal state lives upstream.

use crate::catalogue::{ExerciseDefinition, Rule, RuleKind, Severity};
use crate::constants::{CONFIDENCE_PERCENT_SCALE, DEFAULT_SYMMETRY_SCALE, EPSILON};
use crate::geometry::{distance, joint_angle, normalized_vertical_offset};
use crate::keypoint::{JointName, Keypoint, Position, SmoothedPose};
use crate::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Corrective feedback produced by one rule for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEvent {
    /// Joint the feedback is attached to
    pub joint: JointName,
    pub label: String,
    pub action_text: String,
    /// Degrees for angle rules, fraction of shoulder width for symmetry rules
    pub deviation: f64,
    pub severity: Severity,
    /// Lowest detector confidence among the rule's joints, 0-100
    pub confidence: f64,
    /// Smoothed pixel position to draw the feedback at
    pub anchor: Position,
}

/// Stateless evaluator for exercise rules
#[derive(Debug, Clone)]
pub struct RuleEngine {
    symmetry_fallback_scale: f64,
}

impl RuleEngine {
    #[must_use]
    pub fn new(symmetry_fallback_scale: f64) -> Self {
        Self {
            symmetry_fallback_scale,
        }
    }

    /// Evaluate every rule of `exercise` in declared order
    ///
    /// Rules whose joints are not all stably visible are skipped. A rule that
    /// cannot be evaluated is logged and skipped without affecting the others.
    pub fn evaluate(
        &self,
        exercise: &ExerciseDefinition,
        pose: &SmoothedPose,
        visible: &BTreeSet<JointName>,
    ) -> Vec<FeedbackEvent> {
        exercise
            .rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| match self.evaluate_rule(rule, pose, visible) {
                Ok(event) => event,
                Err(e) => {
                    warn!("{} rule #{index} skipped: {e}", exercise.name);
                    None
                }
            })
            .collect()
    }

    /// Evaluate a single rule; `Ok(None)` means nothing to report
    pub fn evaluate_rule(
        &self,
        rule: &Rule,
        pose: &SmoothedPose,
        visible: &BTreeSet<JointName>,
    ) -> Result<Option<FeedbackEvent>> {
        if let Some(missing) = rule.joints().iter().find(|joint| !visible.contains(*joint)) {
            debug!("Rule '{}' waiting for {missing}", rule.feedback.label);
            return Ok(None);
        }

        match &rule.kind {
            RuleKind::AngleDeviation { joints, target } => {
                let [a, b, c] = lookup(pose, joints)?;
                let angle = joint_angle(a.position(), b.position(), c.position());
                let deviation = (angle - target).abs();
                if !deviation.is_finite() {
                    return Err(Error::InvalidInput(format!(
                        "Non-finite angle at {} for '{}'",
                        b.name, rule.feedback.label
                    )));
                }

                Ok(match rule.thresholds.classify(deviation) {
                    Severity::Low => None,
                    severity => Some(FeedbackEvent {
                        joint: b.name,
                        label: rule.feedback.label.clone(),
                        action_text: format!("{} ~{}°", rule.feedback.action, deviation.round()),
                        deviation,
                        severity,
                        confidence: min_confidence(&[a, b, c]),
                        anchor: b.position(),
                    }),
                })
            }
            RuleKind::BilateralSymmetry { joints } => {
                let [first, second] = lookup(pose, joints)?;
                let scale = self.shoulder_scale(pose, visible);
                let deviation = normalized_vertical_offset(first.position(), second.position(), scale);
                if !deviation.is_finite() {
                    return Err(Error::InvalidInput(format!(
                        "Non-finite offset between {} and {}",
                        first.name, second.name
                    )));
                }

                Ok(match rule.thresholds.classify(deviation) {
                    Severity::Low => None,
                    severity => {
                        // Larger pixel y is lower in the image: the lagging side.
                        let lower = if first.y > second.y { first } else { second };
                        Some(FeedbackEvent {
                            joint: lower.name,
                            label: rule.feedback.label.clone(),
                            action_text: rule.feedback.action.clone(),
                            deviation,
                            severity,
                            confidence: min_confidence(&[first, second]),
                            anchor: lower.position(),
                        })
                    }
                })
            }
        }
    }

    /// Shoulder-to-shoulder distance, or the fallback when shoulders are unusable
    fn shoulder_scale(&self, pose: &SmoothedPose, visible: &BTreeSet<JointName>) -> f64 {
        let shoulders = [JointName::LeftShoulder, JointName::RightShoulder];
        if !shoulders.iter().all(|joint| visible.contains(joint)) {
            return self.symmetry_fallback_scale;
        }

        match (pose.get(JointName::LeftShoulder), pose.get(JointName::RightShoulder)) {
            (Some(left), Some(right)) => {
                let width = distance(left.position(), right.position());
                if width.is_finite() && width > EPSILON {
                    width
                } else {
                    self.symmetry_fallback_scale
                }
            }
            _ => self.symmetry_fallback_scale,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SYMMETRY_SCALE)
    }
}

fn lookup<'a, const N: usize>(pose: &'a SmoothedPose, joints: &[JointName; N]) -> Result<[&'a Keypoint; N]> {
    let mut found = Vec::with_capacity(N);
    for joint in joints {
        let kp = pose
            .get(*joint)
            .ok_or_else(|| Error::InvalidInput(format!("Joint {joint} missing from pose")))?;
        found.push(kp);
    }
    found
        .try_into()
        .map_err(|_| Error::InvalidInput("Joint lookup size mismatch".to_string()))
}

fn min_confidence(keypoints: &[&Keypoint]) -> f64 {
    keypoints
        .iter()
        .map(|kp| kp.confidence)
        .fold(f64::INFINITY, f64::min)
        * CONFIDENCE_PERCENT_SCALE
}
