//! Frame-by-frame analysis engine.
//!
//! Owns every piece of cross-frame state (filters, visibility records, phase
//! tracker) and produces one [`FrameResult`] per pose message. It is not shared:
//! callers that need a separate execution context wrap it in
//! [`crate::worker::EngineWorker`].

use crate::catalogue::{Catalogue, ExerciseDefinition};
use crate::config::Config;
use crate::filters::JointSmoother;
use crate::keypoint::PoseFrame;
use crate::protocol::{FrameResult, InboundMessage, OutboundMessage};
use crate::reps::{RepState, RepTracker};
use crate::rules::RuleEngine;
use crate::visibility::VisibilityGate;
use crate::{Error, Result};
use log::{debug, info, warn};

/// Single-threaded pose analysis pipeline
pub struct PoseEngine {
    catalogue: Catalogue,
    active_id: String,
    smoother: JointSmoother,
    visibility: VisibilityGate,
    rules: RuleEngine,
    reps: Option<RepTracker>,
    reset_filters_on_switch: bool,
}

impl PoseEngine {
    /// Create an engine over `catalogue`, starting on the configured default exercise
    pub fn new(catalogue: Catalogue, config: &Config) -> Result<Self> {
        let active_id = config.analysis.default_exercise.clone();
        let definition = catalogue.get(&active_id).ok_or_else(|| {
            Error::ConfigError(format!("Default exercise '{active_id}' is not in the catalogue"))
        })?;
        let reps = Self::tracker_for(definition);

        info!("Engine starting with exercise {}", definition.name);

        Ok(Self {
            smoother: JointSmoother::new(config.filter_kind()?),
            visibility: VisibilityGate::new(config.visibility.confidence_threshold, config.visibility.dwell_ms),
            rules: RuleEngine::new(config.analysis.symmetry_fallback_scale),
            reset_filters_on_switch: config.analysis.reset_filters_on_switch,
            catalogue,
            active_id,
            reps,
        })
    }

    /// Built-in catalogue with default settings
    pub fn with_defaults() -> Result<Self> {
        Self::new(Catalogue::builtin(), &Config::default())
    }

    fn tracker_for(definition: &ExerciseDefinition) -> Option<RepTracker> {
        let logic = definition.rep_logic.clone()?;
        match RepTracker::new(logic) {
            Ok(tracker) => Some(tracker),
            Err(e) => {
                warn!("Repetition tracking disabled for {}: {e}", definition.name);
                None
            }
        }
    }

    /// Dispatch one inbound message; pose messages produce a result
    pub fn handle(&mut self, message: InboundMessage) -> Option<OutboundMessage> {
        match message {
            InboundMessage::SetExercise(payload) => {
                self.set_exercise(&payload.exercise_id);
                None
            }
            InboundMessage::Pose(payload) => Some(OutboundMessage::Result(
                self.process_pose(&payload.pose_frame, payload.timestamp),
            )),
        }
    }

    /// Switch the active exercise. Unknown ids are ignored and return `false`.
    ///
    /// Selecting any known exercise, including the active one, restarts the
    /// repetition cycle.
    pub fn set_exercise(&mut self, exercise_id: &str) -> bool {
        let Some(definition) = self.catalogue.get(exercise_id) else {
            debug!("Ignoring unknown exercise '{exercise_id}'");
            return false;
        };

        info!("Switched to exercise {}", definition.name);
        self.reps = Self::tracker_for(definition);
        self.active_id = exercise_id.to_string();
        if self.reset_filters_on_switch {
            self.smoother.reset();
        }
        true
    }

    /// Run one frame through smoothing, gating, rules and repetition tracking
    pub fn process_pose(&mut self, frame: &PoseFrame, timestamp_ms: f64) -> FrameResult {
        let smoothed_pose = self.smoother.smooth_pose(frame, timestamp_ms);
        let visible = self
            .visibility
            .update_visibility(&smoothed_pose.keypoints, timestamp_ms);

        let feedback_events = match self.catalogue.get(&self.active_id) {
            Some(definition) => self.rules.evaluate(definition, &smoothed_pose, &visible),
            None => Vec::new(),
        };
        let rep_state = self
            .reps
            .as_mut()
            .map(|tracker| tracker.update(&smoothed_pose, &visible).clone());

        FrameResult {
            smoothed_pose,
            feedback_events,
            rep_state,
            visible_joints: visible.into_iter().collect(),
        }
    }

    /// Forget all temporal state and restart the current exercise
    pub fn restart(&mut self) {
        self.smoother.reset();
        self.visibility.reset();
        if let Some(tracker) = self.reps.as_mut() {
            tracker.reset();
        }
    }

    #[must_use]
    pub fn active_exercise_id(&self) -> &str {
        &self.active_id
    }

    #[must_use]
    pub fn active_exercise(&self) -> Option<&ExerciseDefinition> {
        self.catalogue.get(&self.active_id)
    }

    /// Current repetition progress, if the exercise tracks repetitions
    #[must_use]
    pub fn rep_state(&self) -> Option<&RepState> {
        self.reps.as_ref().map(RepTracker::state)
    }

    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Joints with live smoothing state
    #[must_use]
    pub fn tracked_joints(&self) -> usize {
        self.smoother.tracked_joints()
    }
}
