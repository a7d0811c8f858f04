//! Repetition counting through the full engine pipeline

mod test_helpers;

use exercise_form_analysis::{
    config::Config,
    engine::PoseEngine,
    protocol::FrameResult,
    reps::{RepState, RepTracker},
};
use test_helpers::{create_test_catalogue, create_test_frame, elbow_rep_logic, right_arm_at, FRAME_MS};

struct Session {
    engine: PoseEngine,
    now: f64,
}

impl Session {
    fn new(exercise: &str) -> Self {
        let mut config = Config::default();
        config.analysis.default_exercise = exercise.to_string();
        Self {
            engine: PoseEngine::new(create_test_catalogue(), &config).unwrap(),
            now: 0.0,
        }
    }

    /// Hold the arm at `angle` for `frames` frames, returning the last result
    fn hold(&mut self, angle: f64, frames: u32, confidence: f64) -> FrameResult {
        let points = right_arm_at(angle);
        let mut last = None;
        for _ in 0..frames {
            let frame = create_test_frame(&points, confidence, self.now);
            last = Some(self.engine.process_pose(&frame, self.now));
            self.now += FRAME_MS;
        }
        last.unwrap()
    }

    fn state(&self) -> RepState {
        self.engine.rep_state().cloned().unwrap()
    }
}

fn state(phase: &str, rep_count: u32, guidance: &str) -> RepState {
    RepState {
        phase: phase.to_string(),
        rep_count,
        guidance: guidance.to_string(),
    }
}

#[test]
fn test_single_curl_counts_one_rep() {
    let mut session = Session::new("curl");

    let result = session.hold(170.0, 15, 0.9);
    assert_eq!(result.rep_state, Some(state("extension", 0, "Curl up")));

    let result = session.hold(90.0, 20, 0.9);
    assert_eq!(result.rep_state, Some(state("flexion", 0, "Lower slowly")));

    let result = session.hold(170.0, 20, 0.9);
    assert_eq!(result.rep_state, Some(state("extension", 1, "Curl up")));
}

#[test]
fn test_partial_range_does_not_count() {
    let mut session = Session::new("curl");
    session.hold(170.0, 15, 0.9);

    // Never reaches the flexion threshold
    for _ in 0..3 {
        session.hold(120.0, 15, 0.9);
        session.hold(170.0, 15, 0.9);
    }
    assert_eq!(session.state(), state("extension", 0, "Curl up"));

    // Flexed but never fully extended again
    session.hold(80.0, 20, 0.9);
    session.hold(140.0, 20, 0.9);
    assert_eq!(session.state(), state("flexion", 0, "Lower slowly"));
}

#[test]
fn test_several_reps_accumulate() {
    let mut session = Session::new("curl");
    session.hold(170.0, 15, 0.9);

    for expected in 1..=4 {
        session.hold(85.0, 20, 0.9);
        session.hold(175.0, 20, 0.9);
        assert_eq!(session.state().rep_count, expected);
    }
}

#[test]
fn test_tracker_frozen_while_joints_hidden() {
    let mut session = Session::new("curl");
    session.hold(170.0, 15, 0.9);
    session.hold(90.0, 20, 0.9);
    assert_eq!(session.state().phase, "flexion");

    // Arm fully extended but the detector has lost it
    let result = session.hold(170.0, 20, 0.1);
    assert!(result.visible_joints.is_empty());
    assert_eq!(result.rep_state, Some(state("flexion", 0, "Lower slowly")));

    // Visible again only after the dwell, then the rep completes
    let result = session.hold(170.0, 3, 0.9);
    assert_eq!(result.rep_state, Some(state("flexion", 0, "Lower slowly")));
    let result = session.hold(170.0, 10, 0.9);
    assert_eq!(result.rep_state, Some(state("extension", 1, "Curl up")));
}

#[test]
fn test_switch_restarts_cycle() {
    let mut session = Session::new("curl");
    session.hold(170.0, 15, 0.9);
    session.hold(90.0, 20, 0.9);
    session.hold(170.0, 20, 0.9);
    session.hold(90.0, 20, 0.9);
    assert_eq!(session.state(), state("flexion", 1, "Lower slowly"));

    assert!(session.engine.set_exercise("shoulderPress"));
    assert!(session.engine.rep_state().is_none());
    let result = session.hold(90.0, 5, 0.9);
    assert!(result.rep_state.is_none());

    assert!(session.engine.set_exercise("curl"));
    assert_eq!(session.state(), state("extension", 0, "Curl up"));

    // Extension is the phase we are already in, so nothing completes
    session.hold(170.0, 20, 0.9);
    assert_eq!(session.state(), state("extension", 0, "Curl up"));
}

#[test]
fn test_reselecting_active_exercise_restarts_cycle() {
    let mut session = Session::new("curl");
    session.hold(170.0, 15, 0.9);
    session.hold(90.0, 20, 0.9);
    assert_eq!(session.state().phase, "flexion");

    assert!(session.engine.set_exercise("curl"));
    assert_eq!(session.state(), state("extension", 0, "Curl up"));
}

#[test]
fn test_builtin_curl_guidance() {
    let mut session = Session::new("bicepCurl");
    assert_eq!(session.state(), state("extension", 0, "Curl Up"));

    session.hold(170.0, 15, 0.9);
    session.hold(45.0, 25, 0.9);
    assert_eq!(session.state(), state("flexion", 0, "Lower Slowly"));
    session.hold(170.0, 25, 0.9);
    assert_eq!(session.state(), state("extension", 1, "Curl Up"));
}

#[test]
fn test_tracker_on_raw_angles() {
    let mut tracker = RepTracker::new(elbow_rep_logic()).unwrap();

    let changes: Vec<bool> = [170.0, 130.0, 100.0, 60.0, 159.9, 160.0, f64::NAN, 100.0]
        .into_iter()
        .map(|angle| tracker.observe_angle(angle))
        .collect();

    assert_eq!(changes, vec![false, false, true, false, false, true, false, true]);
    assert_eq!(tracker.state(), &state("flexion", 1, "Lower slowly"));
}
