//! Exercise catalogue: declarative form rules and repetition phase graphs.
//!
//! Definitions are plain data interpreted by [`crate::rules`] and
//! [`crate::reps`]. A catalogue can be built in code, loaded from YAML, or taken
//! from [`Catalogue::builtin`].

use crate::keypoint::JointName;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Graded deviation from the ideal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Which part of the body an exercise needs in frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    FullBody,
    HalfBody,
}

/// Medium/high deviation limits; both compare with a strict `>`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub medium: f64,
    pub high: f64,
}

impl Thresholds {
    #[must_use]
    pub fn classify(&self, deviation: f64) -> Severity {
        if deviation > self.high {
            Severity::High
        } else if deviation > self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.medium.is_finite() && self.high.is_finite()) {
            return Err(Error::CatalogueError("Thresholds must be finite".to_string()));
        }
        if self.medium < 0.0 || self.medium > self.high {
            return Err(Error::CatalogueError(format!(
                "Thresholds must satisfy 0 <= medium <= high, got medium={} high={}",
                self.medium, self.high
            )));
        }
        Ok(())
    }
}

/// Text shown to the user when a rule fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackText {
    pub label: String,
    pub action: String,
}

/// What a rule measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    /// Angle at the middle joint compared with `target` degrees
    AngleDeviation { joints: [JointName; 3], target: f64 },
    /// Vertical offset between a left/right pair, relative to shoulder width
    BilateralSymmetry { joints: [JointName; 2] },
}

/// One declarative form check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub thresholds: Thresholds,
    pub feedback: FeedbackText,
}

impl Rule {
    #[must_use]
    pub fn angle(joints: [JointName; 3], target: f64, thresholds: Thresholds, label: &str, action: &str) -> Self {
        Self {
            kind: RuleKind::AngleDeviation { joints, target },
            thresholds,
            feedback: FeedbackText {
                label: label.to_string(),
                action: action.to_string(),
            },
        }
    }

    #[must_use]
    pub fn symmetry(joints: [JointName; 2], thresholds: Thresholds, label: &str, action: &str) -> Self {
        Self {
            kind: RuleKind::BilateralSymmetry { joints },
            thresholds,
            feedback: FeedbackText {
                label: label.to_string(),
                action: action.to_string(),
            },
        }
    }

    /// Joints that must all be stably visible before the rule is evaluated
    #[must_use]
    pub fn joints(&self) -> &[JointName] {
        match &self.kind {
            RuleKind::AngleDeviation { joints, .. } => joints,
            RuleKind::BilateralSymmetry { joints } => joints,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let RuleKind::AngleDeviation { target, .. } = self.kind {
            if !(0.0..=180.0).contains(&target) {
                return Err(Error::CatalogueError(format!(
                    "Angle target must be within [0, 180], got {target}"
                )));
            }
        }
        self.thresholds.validate()
    }
}

/// Which way the angle has to move to enter a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Enter once the angle rises to at least the threshold
    AtLeast,
    /// Enter once the angle falls to at most the threshold
    AtMost,
}

impl Direction {
    #[must_use]
    pub fn is_met(self, angle: f64, threshold: f64) -> bool {
        match self {
            Direction::AtLeast => angle >= threshold,
            Direction::AtMost => angle <= threshold,
        }
    }
}

/// One state of a repetition cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Angle (degrees) that must be reached to enter this phase
    pub threshold: f64,
    pub direction: Direction,
    /// Guidance shown while this phase is current
    pub guidance: String,
    /// Phase that follows this one
    pub next: String,
}

impl Phase {
    #[must_use]
    pub fn new(threshold: f64, direction: Direction, guidance: &str, next: &str) -> Self {
        Self {
            threshold,
            direction,
            guidance: guidance.to_string(),
            next: next.to_string(),
        }
    }

    #[must_use]
    pub fn is_entered_by(&self, angle: f64) -> bool {
        self.direction.is_met(angle, self.threshold)
    }
}

/// Phase graph driven by one joint angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepLogic {
    /// Angle is measured at the middle joint
    pub joints: [JointName; 3],
    /// Initial phase; re-entering it completes a repetition
    pub start_phase: String,
    pub phases: BTreeMap<String, Phase>,
}

impl RepLogic {
    #[must_use]
    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.get(name)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.phases.contains_key(&self.start_phase) {
            return Err(Error::CatalogueError(format!(
                "Start phase '{}' is not defined",
                self.start_phase
            )));
        }
        for (name, phase) in &self.phases {
            if !phase.threshold.is_finite() {
                return Err(Error::CatalogueError(format!("Phase '{name}' has a non-finite threshold")));
            }
            if !self.phases.contains_key(&phase.next) {
                return Err(Error::CatalogueError(format!(
                    "Phase '{name}' points at unknown phase '{}'",
                    phase.next
                )));
            }
        }
        Ok(())
    }
}

/// Complete description of one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub name: String,
    pub region: BodyRegion,
    pub required_joints: Vec<JointName>,
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub rep_logic: Option<RepLogic>,
}

impl ExerciseDefinition {
    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate()
                .map_err(|e| Error::CatalogueError(format!("{} rule #{index}: {e}", self.name)))?;
        }
        if let Some(logic) = &self.rep_logic {
            logic
                .validate()
                .map_err(|e| Error::CatalogueError(format!("{} rep logic: {e}", self.name)))?;
        }
        Ok(())
    }
}

/// Exercises selectable by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub exercises: BTreeMap<String, ExerciseDefinition>,
}

impl Catalogue {
    /// Load a catalogue from a YAML file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML catalogue document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let catalogue: Catalogue = serde_yaml::from_str(content)?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Save the catalogue as YAML
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.exercises.is_empty() {
            return Err(Error::CatalogueError("Catalogue has no exercises".to_string()));
        }
        self.exercises.values().try_for_each(ExerciseDefinition::validate)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    pub fn insert(&mut self, id: &str, definition: ExerciseDefinition) {
        self.exercises.insert(id.to_string(), definition);
    }

    /// Squat, bicep curl and shoulder press
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalogue = Self::default();
        catalogue.insert("squat", squat());
        catalogue.insert("bicepCurl", bicep_curl());
        catalogue.insert("shoulderPress", shoulder_press());
        catalogue
    }
}

fn squat() -> ExerciseDefinition {
    use JointName::*;

    let knees = Thresholds { medium: 6.0, high: 12.0 };
    ExerciseDefinition {
        name: "Squat".to_string(),
        region: BodyRegion::FullBody,
        required_joints: vec![LeftHip, LeftKnee, LeftAnkle, RightHip, RightKnee, RightAnkle],
        rules: vec![
            Rule::angle([LeftHip, LeftKnee, LeftAnkle], 180.0, knees, "Knees collapsing in", "Push knees out"),
            Rule::angle([RightHip, RightKnee, RightAnkle], 180.0, knees, "Knees collapsing in", "Push knees out"),
        ],
        rep_logic: Some(RepLogic {
            joints: [RightHip, RightKnee, RightAnkle],
            start_phase: "standing".to_string(),
            phases: BTreeMap::from([
                ("standing".to_string(), Phase::new(160.0, Direction::AtLeast, "Squat down", "bottom")),
                ("bottom".to_string(), Phase::new(100.0, Direction::AtMost, "Drive up", "standing")),
            ]),
        }),
    }
}

fn bicep_curl() -> ExerciseDefinition {
    use JointName::*;

    let elbows = Thresholds { medium: 20.0, high: 35.0 };
    ExerciseDefinition {
        name: "Bicep Curl".to_string(),
        region: BodyRegion::HalfBody,
        required_joints: vec![LeftShoulder, LeftElbow, LeftWrist, RightShoulder, RightElbow, RightWrist],
        rules: vec![
            Rule::angle([LeftElbow, LeftShoulder, LeftHip], 0.0, elbows, "Elbow swinging forward", "Keep elbow pinned"),
            Rule::angle([RightElbow, RightShoulder, RightHip], 0.0, elbows, "Elbow swinging forward", "Keep elbow pinned"),
            Rule::angle(
                [RightShoulder, RightHip, RightKnee],
                180.0,
                Thresholds { medium: 10.0, high: 20.0 },
                "Leaning back",
                "Stand up straight",
            ),
            Rule::symmetry(
                [LeftShoulder, RightShoulder],
                Thresholds { medium: 0.15, high: 0.25 },
                "Shoulders uneven",
                "Keep shoulders level",
            ),
        ],
        rep_logic: Some(RepLogic {
            joints: [RightShoulder, RightElbow, RightWrist],
            start_phase: "extension".to_string(),
            phases: BTreeMap::from([
                ("extension".to_string(), Phase::new(150.0, Direction::AtLeast, "Curl Up", "flexion")),
                ("flexion".to_string(), Phase::new(60.0, Direction::AtMost, "Lower Slowly", "extension")),
            ]),
        }),
    }
}

fn shoulder_press() -> ExerciseDefinition {
    use JointName::*;

    ExerciseDefinition {
        name: "Shoulder Press".to_string(),
        region: BodyRegion::HalfBody,
        required_joints: vec![LeftShoulder, LeftElbow, LeftWrist, RightShoulder, RightElbow, RightWrist],
        rules: vec![Rule::symmetry(
            [LeftWrist, RightWrist],
            Thresholds { medium: 0.1, high: 0.2 },
            "Uneven lift",
            "Push both arms up evenly",
        )],
        rep_logic: None,
    }
}
