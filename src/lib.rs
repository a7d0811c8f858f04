//! Exercise form analysis over live 2-D body keypoint streams.
//!
//! This library turns per-frame keypoint estimates from an external pose model
//! into:
//! - a jitter-reduced joint stream (One-Euro smoothing per joint)
//! - severity-graded corrective feedback from declarative exercise rules
//! - repetition counts and live phase guidance
//!
//! The per-frame pipeline is:
//! 1. Smoothing of every keypoint with its own adaptive filter
//! 2. Visibility gating, so only joints seen confidently for a dwell period are used
//! 3. Rule evaluation (angle deviation and bilateral symmetry)
//! 4. Repetition phase tracking over one designated joint angle
//!
//! # Examples
//!
//! ## Processing frames directly
//!
//! ```no_run
//! use exercise_form_analysis::{
//!     engine::PoseEngine,
//!     keypoint::{JointName, Keypoint, PoseFrame},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = PoseEngine::with_defaults()?;
//! engine.set_exercise("bicepCurl");
//!
//! let frame = PoseFrame::new(
//!     vec![
//!         Keypoint::new(JointName::RightShoulder, 300.0, 150.0, 0.9),
//!         Keypoint::new(JointName::RightElbow, 310.0, 250.0, 0.8),
//!         Keypoint::new(JointName::RightWrist, 315.0, 340.0, 0.85),
//!     ],
//!     1_700_000_000_000.0,
//!     640,
//!     480,
//! )?;
//!
//! let result = engine.process_pose(&frame, frame.timestamp);
//! for event in &result.feedback_events {
//!     println!("{:?}: {} ({})", event.severity, event.label, event.action_text);
//! }
//! if let Some(reps) = &result.rep_state {
//!     println!("{} reps, {}", reps.rep_count, reps.guidance);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## JSON messages on a worker thread
//!
//! ```no_run
//! use exercise_form_analysis::{engine::PoseEngine, protocol::InboundMessage, worker::EngineWorker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let worker = EngineWorker::start(PoseEngine::with_defaults()?)?;
//!
//! worker.send(InboundMessage::from_json(
//!     r#"{"type":"setExercise","payload":{"exerciseId":"squat"}}"#,
//! )?)?;
//! worker.send(InboundMessage::from_json(
//!     r#"{"type":"pose","payload":{"poseFrame":{"keypoints":[]},"timestamp":0}}"#,
//! )?)?;
//!
//! if let Some(result) = worker.latest() {
//!     println!("{} joints visible", result.visible_joints.len());
//! }
//! worker.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom catalogues
//!
//! ```no_run
//! use exercise_form_analysis::{catalogue::Catalogue, config::Config, engine::PoseEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalogue = Catalogue::from_file("exercises.yaml")?;
//! let mut config = Config::default();
//! config.analysis.default_exercise = "lunge".to_string();
//!
//! let engine = PoseEngine::new(catalogue, &config)?;
//! println!("Active: {}", engine.active_exercise_id());
//! # Ok(())
//! # }
//! ```

/// Joint vocabulary and pose frame types
pub mod keypoint;

/// Signal filtering algorithms for smoothing joint positions
pub mod filters;

/// Confidence debouncing per joint
pub mod visibility;

/// Planar angle and distance helpers
pub mod geometry;

/// Exercise definitions, rules and phase graphs
pub mod catalogue;

/// Geometric rule evaluation
pub mod rules;

/// Repetition phase tracking
pub mod reps;

/// JSON message protocol
pub mod protocol;

/// Frame-by-frame analysis engine
pub mod engine;

/// Engine worker thread
pub mod worker;

/// Error types and result handling
pub mod error;

/// Constants used throughout the engine
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
