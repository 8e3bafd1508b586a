/// Per-character pose/expression continuity within a scene.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::schema::beat::BeatId;

/// What a character last looked like, and which beats established it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterBeatState {
    pub pose: Option<String>,
    /// Starts as the character's profile default, if any.
    pub expression: Option<String>,
    pub pose_source: Option<BeatId>,
    pub expression_source: Option<BeatId>,
    /// The beat that last set either attribute.
    pub last_set_by: Option<BeatId>,
}

/// Character key → state. Keys are canonical character keys.
pub type CharacterStates = BTreeMap<String, CharacterBeatState>;

/// Effective pose/expression for one character on one beat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarryoverOutcome {
    pub pose: Option<String>,
    pub expression: Option<String>,
    /// Set when the pose was inherited; names the beat that set it.
    pub pose_carried_from: Option<BeatId>,
    pub expression_carried_from: Option<BeatId>,
}

impl CarryoverOutcome {
    pub fn applied(&self) -> bool {
        self.pose_carried_from.is_some() || self.expression_carried_from.is_some()
    }

    /// The earliest-listed carryover source: pose first, then expression.
    pub fn source(&self) -> Option<&BeatId> {
        self.pose_carried_from
            .as_ref()
            .or(self.expression_carried_from.as_ref())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterCarryoverTracker;

impl CharacterCarryoverTracker {
    pub fn get_or_create<'a>(
        &self,
        states: &'a mut CharacterStates,
        character: &str,
        default_expression: Option<&str>,
    ) -> &'a mut CharacterBeatState {
        states
            .entry(character.to_string())
            .or_insert_with(|| CharacterBeatState {
                expression: default_expression.map(str::to_string),
                ..Default::default()
            })
    }

    /// Merge what this beat supplies with what the character already had.
    ///
    /// `pose` / `expression` are `Some` only when the beat itself supplied
    /// them; `None` always triggers a carryover lookup.
    pub fn apply(
        &self,
        states: &mut CharacterStates,
        character: &str,
        beat: &BeatId,
        pose: Option<String>,
        expression: Option<String>,
        default_expression: Option<&str>,
    ) -> CarryoverOutcome {
        let entry = self.get_or_create(states, character, default_expression);
        let mut outcome = CarryoverOutcome::default();

        match pose {
            Some(pose) => {
                entry.pose = Some(pose);
                entry.pose_source = Some(beat.clone());
                entry.last_set_by = Some(beat.clone());
            }
            None if entry.pose.is_some() => {
                outcome.pose_carried_from = entry.pose_source.clone();
            }
            None => {}
        }

        match expression {
            Some(expression) => {
                entry.expression = Some(expression);
                entry.expression_source = Some(beat.clone());
                entry.last_set_by = Some(beat.clone());
            }
            // A profile default has no source beat and is not a carryover.
            None if entry.expression_source.is_some() => {
                outcome.expression_carried_from = entry.expression_source.clone();
            }
            None => {}
        }

        outcome.pose = entry.pose.clone();
        outcome.expression = entry.expression.clone();

        if outcome.applied() {
            debug!(
                character,
                beat = %beat,
                pose_from = ?outcome.pose_carried_from,
                expression_from = ?outcome.expression_carried_from,
                "carryover applied"
            );
        }
        outcome
    }
}
