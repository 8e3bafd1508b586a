/// Scene- and episode-scoped planning state.
///
/// A [`SceneContext`] lives for one scene and is threaded through the beat
/// fold. An [`EpisodeAccumulator`] only ever grows by summing finished scenes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::core::carryover::CharacterStates;
use crate::core::variety::SceneVarietyState;
use crate::schema::annotated::AnnotatedBeat;
use crate::schema::scene_state::ScenePersistentState;
use crate::schema::template::SceneTemplate;

/// Running counts over processed beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanStats {
    pub total_beats: u32,
    pub carryover_applied: u32,
    pub variety_adjustments: u32,
    pub validated_fields: u32,
}

impl PlanStats {
    pub fn record(&mut self, beat: &AnnotatedBeat) {
        self.total_beats += 1;
        if beat.carryover.applied {
            self.carryover_applied += 1;
        }
        if beat.variety.adjusted {
            self.variety_adjustments += 1;
        }
        self.validated_fields += beat.validation.count();
    }
}

impl AddAssign for PlanStats {
    fn add_assign(&mut self, other: Self) {
        self.total_beats += other.total_beats;
        self.carryover_applied += other.carryover_applied;
        self.variety_adjustments += other.variety_adjustments;
        self.validated_fields += other.validated_fields;
    }
}

/// Everything one scene's fold carries from beat to beat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SceneContext {
    pub scene_number: u32,
    pub variety: SceneVarietyState,
    pub characters: CharacterStates,
    pub persistent: ScenePersistentState,
    /// Character key → the name the scene state records them under.
    pub names: BTreeMap<String, String>,
    pub stats: PlanStats,
    pub templates: Vec<SceneTemplate>,
}

impl SceneContext {
    pub fn new(scene_number: u32, persistent: ScenePersistentState) -> Self {
        Self {
            scene_number,
            persistent,
            ..Default::default()
        }
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            scene_number: self.scene_number,
            stats: self.stats,
            templates: self.templates.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub scene_number: u32,
    pub stats: PlanStats,
    /// One tag per beat, in beat order.
    pub templates: Vec<SceneTemplate>,
}

/// Episode-level totals. Scenes are summed in, never interleaved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeAccumulator {
    pub totals: PlanStats,
    pub scene_templates: Vec<(u32, Vec<SceneTemplate>)>,
}

impl EpisodeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(mut self, scene: &SceneSummary) -> Self {
        self.totals += scene.stats;
        self.scene_templates
            .push((scene.scene_number, scene.templates.clone()));
        self
    }

    /// Combine two partial accumulations, `other` covering later scenes.
    pub fn merge(mut self, other: EpisodeAccumulator) -> Self {
        self.totals += other.totals;
        self.scene_templates.extend(other.scene_templates);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_summary(scene_number: u32, beats: u32, templates: &[SceneTemplate]) -> SceneSummary {
        SceneSummary {
            scene_number,
            stats: PlanStats {
                total_beats: beats,
                carryover_applied: 1,
                variety_adjustments: 0,
                validated_fields: beats * 2,
            },
            templates: templates.to_vec(),
        }
    }

    #[test]
    fn absorb_sums_counts() {
        let acc = EpisodeAccumulator::new()
            .absorb(&make_summary(1, 3, &[SceneTemplate::Vehicle]))
            .absorb(&make_summary(2, 2, &[SceneTemplate::Combat]));
        assert_eq!(acc.totals.total_beats, 5);
        assert_eq!(acc.totals.carryover_applied, 2);
        assert_eq!(acc.totals.validated_fields, 10);
        assert_eq!(acc.scene_templates[1], (2, vec![SceneTemplate::Combat]));
    }

    #[test]
    fn merge_matches_sequential_absorb() {
        let a = make_summary(1, 3, &[SceneTemplate::Stealth]);
        let b = make_summary(2, 4, &[SceneTemplate::Generic]);
        let sequential = EpisodeAccumulator::new().absorb(&a).absorb(&b);
        let merged = EpisodeAccumulator::new()
            .absorb(&a)
            .merge(EpisodeAccumulator::new().absorb(&b));
        assert_eq!(sequential, merged);
    }

    #[test]
    fn fresh_context_is_empty() {
        let ctx = SceneContext::new(4, ScenePersistentState::default());
        assert_eq!(ctx.scene_number, 4);
        assert_eq!(ctx.stats, PlanStats::default());
        assert!(ctx.characters.is_empty());
        assert_eq!(ctx.variety.beat_count, 0);
    }
}
