/// Planner output: beats annotated with resolved camera and character direction.

use serde::{Deserialize, Serialize};

use crate::core::persistent::StateChange;
use crate::core::variety::{Violation, ViolationKind};
use crate::schema::beat::{Beat, BeatId};
use crate::schema::scene_state::ScenePersistentState;
use crate::schema::template::SceneTemplate;

/// Which resolved fields came from a recognised hint rather than a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationFlags {
    pub shot: bool,
    pub angle: bool,
    pub expression: bool,
}

impl ValidationFlags {
    pub fn count(&self) -> u32 {
        [self.shot, self.angle, self.expression]
            .iter()
            .filter(|v| **v)
            .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarryoverFlag {
    pub applied: bool,
    pub source_beat: Option<BeatId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarietyAdjustment {
    pub adjusted: bool,
    pub original_shot: String,
    pub final_shot: String,
    pub original_angle: String,
    pub final_angle: String,
    pub reason: Option<String>,
    /// Everything the proposal broke, soft warnings included.
    pub violations: Vec<Violation>,
    /// Hard violations kept because no alternative existed.
    pub unresolved: Vec<ViolationKind>,
}

/// Direction for one character on one beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDirective {
    /// The name as written on the beat.
    pub name: String,
    /// Profile key, or the lower-cased name for characters without a profile.
    pub key: String,
    pub expression: String,
    pub pose: Option<String>,
    pub pose_carried_from: Option<BeatId>,
    pub expression_carried_from: Option<BeatId>,
    pub deception_tell: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedBeat {
    pub beat: Beat,
    pub shot_type: String,
    pub camera_angle: String,
    /// The first listed character's expression, or the tone's generic
    /// expression for an empty frame.
    pub expression: String,
    pub pose: Option<String>,
    pub validation: ValidationFlags,
    pub carryover: CarryoverFlag,
    pub variety: VarietyAdjustment,
    pub template: SceneTemplate,
    pub template_reason: String,
    pub characters: Vec<CharacterDirective>,
    /// Scene state after this beat was folded in.
    pub scene_state: ScenePersistentState,
    pub state_changes: Vec<StateChange>,
}

impl AnnotatedBeat {
    pub fn directive(&self, name: &str) -> Option<&CharacterDirective> {
        self.characters
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name) || c.key.eq_ignore_ascii_case(name))
    }
}
