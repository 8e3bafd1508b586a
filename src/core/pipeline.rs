/// The planning pipeline: Beat → AnnotatedBeat orchestration.
///
/// Wires together vocabulary resolution, expression profiles, carryover,
/// variety enforcement, scene-state tracking and template classification.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{BTreeMap, Entry};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::carryover::CharacterCarryoverTracker;
use crate::core::classifier::SceneTemplateClassifier;
use crate::core::config::{ConfigError, PlannerConfig};
use crate::core::context::{EpisodeAccumulator, SceneContext, SceneSummary};
use crate::core::persistent::ScenePersistentStateTracker;
use crate::core::profiles::{is_deception_signal, ProfileError, ProfileRegistry};
use crate::core::variety::VarietyTracker;
use crate::core::vocabulary::{StaticVocabulary, VocabCategory, VocabularyLookup};
use crate::schema::annotated::{
    AnnotatedBeat, CarryoverFlag, CharacterDirective, ValidationFlags, VarietyAdjustment,
};
use crate::schema::beat::{Beat, BeatId, Episode, Scene};
use crate::schema::scene_state::{CastName, ScenePersistentState};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("beat '{beat}' is marked scene {found} but listed under scene {expected}")]
    SceneMismatch {
        beat: BeatId,
        expected: u32,
        found: u32,
    },
    #[error("beat id '{beat}' appears more than once in scene {scene}")]
    DuplicateBeatId { scene: u32, beat: BeatId },
    #[error("scene {scene} has a beat with an empty id")]
    EmptyBeatId { scene: u32 },
    #[error("scene {0} appears more than once in the episode")]
    DuplicateScene(u32),
}

/// One planned scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePlan {
    pub scene_number: u32,
    pub location: Option<String>,
    pub beats: Vec<AnnotatedBeat>,
    pub final_state: ScenePersistentState,
    pub summary: SceneSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodePlan {
    pub title: String,
    pub scenes: Vec<ScenePlan>,
    pub summary: EpisodeAccumulator,
}

/// The top-level planner. Built via `BeatStateProcessor::builder()`.
///
/// Holds only read-only tables and tuning; all per-scene state lives in the
/// [`SceneContext`] threaded through [`BeatStateProcessor::step`].
pub struct BeatStateProcessor {
    profiles: ProfileRegistry,
    vocabulary: Box<dyn VocabularyLookup>,
    config: PlannerConfig,
    variety: VarietyTracker,
    carryover: CharacterCarryoverTracker,
    persistent: ScenePersistentStateTracker,
    classifier: SceneTemplateClassifier,
}

/// Builder for constructing a `BeatStateProcessor`.
#[derive(Default)]
pub struct BeatStateProcessorBuilder {
    profiles_path: Option<String>,
    profiles_dir: Option<String>,
    config_path: Option<String>,
    /// Directly provided profiles (for testing without files).
    profiles: Option<ProfileRegistry>,
    vocabulary: Option<Box<dyn VocabularyLookup>>,
    config: Option<PlannerConfig>,
}

impl BeatStateProcessor {
    pub fn builder() -> BeatStateProcessorBuilder {
        BeatStateProcessorBuilder::default()
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a single scene. Fails only on structurally invalid input.
    pub fn process_scene(&self, scene: &Scene) -> Result<ScenePlan, PipelineError> {
        validate_scene(scene)?;
        Ok(self.plan_scene(scene))
    }

    /// Plan every scene in order. Each scene starts from fresh trackers;
    /// only the summary counts run across scenes.
    pub fn process_episode(&self, episode: &Episode) -> Result<EpisodePlan, PipelineError> {
        validate_episode(episode)?;

        let mut summary = EpisodeAccumulator::new();
        let mut scenes = Vec::with_capacity(episode.scenes.len());
        for scene in &episode.scenes {
            let plan = self.plan_scene(scene);
            summary = summary.absorb(&plan.summary);
            scenes.push(plan);
        }

        info!(
            title = %episode.title,
            scenes = scenes.len(),
            beats = summary.totals.total_beats,
            carryover = summary.totals.carryover_applied,
            adjustments = summary.totals.variety_adjustments,
            validated = summary.totals.validated_fields,
            "episode planned"
        );
        Ok(EpisodePlan {
            title: episode.title.clone(),
            scenes,
            summary,
        })
    }

    /// Opening context for a scene: persistent state seeded from all of its text.
    pub fn begin_scene(&self, scene: &Scene) -> SceneContext {
        let texts: Vec<&str> = scene
            .beats
            .iter()
            .map(|b| b.script_excerpt.as_str())
            .collect();

        // Aliases of one character collapse onto the first spelling used.
        let mut names = BTreeMap::new();
        let mut present = Vec::new();
        for listed in scene.cast() {
            let listed = listed.trim();
            if listed.is_empty() {
                continue;
            }
            if let Entry::Vacant(slot) = names.entry(self.character_key(listed)) {
                slot.insert(listed.to_string());
                present.push(listed.to_string());
            }
        }

        let persistent = self
            .persistent
            .initialize(&texts, &present, scene.location.as_deref());
        let mut ctx = SceneContext::new(scene.number, persistent);
        ctx.names = names;
        ctx
    }

    /// Profile key for a listed name, or the lower-cased name itself.
    fn character_key(&self, name: &str) -> String {
        self.profiles
            .resolve(name)
            .map_or_else(|| name.trim().to_lowercase(), |p| p.key.clone())
    }

    /// A listed character as the scene state sees them: filed under the
    /// scene's name for them, matched in text by any known spelling.
    fn cast_name(&self, names: &BTreeMap<String, String>, listed: &str) -> CastName {
        let recorded = names
            .get(&self.character_key(listed))
            .cloned()
            .unwrap_or_else(|| listed.trim().to_string());
        let mut cast = CastName::new(recorded).with_spelling(listed);
        if let Some(profile) = self.profiles.resolve(listed) {
            for spelling in profile.names() {
                cast = cast.with_spelling(spelling);
            }
        }
        cast
    }

    /// Fold one beat into the scene context.
    pub fn step(&self, mut ctx: SceneContext, beat: &Beat) -> (SceneContext, AnnotatedBeat) {
        let vocab = self.vocabulary.as_ref();

        let camera = beat.camera();
        let shot_hit = camera.and_then(|h| vocab.lookup(VocabCategory::ShotType, h));
        let angle_hit = camera.and_then(|h| vocab.lookup(VocabCategory::CameraAngle, h));
        let validation_shot = shot_hit.is_some();
        let validation_angle = angle_hit.is_some();
        let proposed_shot = shot_hit.unwrap_or_else(|| vocab.default_term(VocabCategory::ShotType));
        let proposed_angle =
            angle_hit.unwrap_or_else(|| vocab.default_term(VocabCategory::CameraAngle));

        let tone = beat.tone();
        let deceptive = tone.is_some_and(is_deception_signal);
        let supplied_pose = beat
            .pose()
            .map(|hint| vocab.resolve(VocabCategory::Pose, Some(hint)));

        let mut directives: Vec<CharacterDirective> = Vec::with_capacity(beat.characters.len());
        for name in beat.characters.iter().filter(|n| !n.trim().is_empty()) {
            let profile = self.profiles.resolve(name);
            let key = self.character_key(name);
            if directives.iter().any(|d| d.key == key) {
                continue;
            }

            let supplied_expression = tone.map(|t| {
                let expression = self.profiles.expression_for(name, Some(t), vocab);
                if deceptive {
                    self.profiles.apply_deception_tell(name, &expression)
                } else {
                    expression
                }
            });
            let outcome = self.carryover.apply(
                &mut ctx.characters,
                &key,
                &beat.id,
                supplied_pose.clone(),
                supplied_expression,
                profile.map(|p| p.default_expression.as_str()),
            );

            let expression = outcome
                .expression
                .unwrap_or_else(|| self.profiles.expression_for(name, None, vocab));
            directives.push(CharacterDirective {
                name: name.clone(),
                key,
                expression,
                pose: outcome.pose,
                pose_carried_from: outcome.pose_carried_from,
                expression_carried_from: outcome.expression_carried_from,
                deception_tell: deceptive && profile.is_some_and(|p| !p.deception_tells.is_empty()),
            });
        }

        let primary = directives.first();
        let expression = primary.map_or_else(
            || vocab.resolve(VocabCategory::Expression, tone),
            |d| d.expression.clone(),
        );
        let pose = match primary {
            Some(d) => d.pose.clone(),
            None => supplied_pose,
        };
        let validation = ValidationFlags {
            shot: validation_shot,
            angle: validation_angle,
            expression: primary.is_some_and(|d| self.profiles.resolve(&d.name).is_some())
                || tone.is_some_and(|t| vocab.lookup(VocabCategory::Expression, t).is_some()),
        };

        let carried_from = directives.iter().find_map(|d| {
            d.pose_carried_from
                .as_ref()
                .or(d.expression_carried_from.as_ref())
        });
        let carryover = CarryoverFlag {
            applied: carried_from.is_some(),
            source_beat: carried_from.cloned(),
        };

        let enforcement = self
            .variety
            .enforce(&ctx.variety, &proposed_shot, &proposed_angle, vocab);
        ctx.variety = self.variety.advance(
            std::mem::take(&mut ctx.variety),
            &enforcement.shot,
            &enforcement.angle,
        );
        let variety = VarietyAdjustment {
            adjusted: enforcement.adjusted(),
            original_shot: enforcement.proposed_shot,
            final_shot: enforcement.shot,
            original_angle: enforcement.proposed_angle,
            final_angle: enforcement.angle,
            reason: enforcement.reason,
            violations: enforcement.violations,
            unresolved: enforcement.unresolved,
        };

        let beat_cast: Vec<CastName> = beat
            .characters
            .iter()
            .filter(|n| !n.trim().is_empty())
            .map(|n| self.cast_name(&ctx.names, n))
            .collect();
        let update = self.persistent.update(
            std::mem::take(&mut ctx.persistent),
            &beat.script_excerpt,
            &beat_cast,
        );
        ctx.persistent = update.state;

        let matched = self.classifier.classify(beat, &ctx.persistent);
        ctx.templates.push(matched.template);

        debug!(
            beat = %beat.id,
            shot = %variety.final_shot,
            angle = %variety.final_angle,
            template = matched.template.tag(),
            carryover = carryover.applied,
            "beat planned"
        );

        let annotated = AnnotatedBeat {
            beat: beat.clone(),
            shot_type: variety.final_shot.clone(),
            camera_angle: variety.final_angle.clone(),
            expression,
            pose,
            validation,
            carryover,
            variety,
            template: matched.template,
            template_reason: matched.reason,
            characters: directives,
            scene_state: ctx.persistent.clone(),
            state_changes: update.changes,
        };
        ctx.stats.record(&annotated);
        (ctx, annotated)
    }

    fn plan_scene(&self, scene: &Scene) -> ScenePlan {
        let mut ctx = self.begin_scene(scene);
        let mut beats = Vec::with_capacity(scene.beats.len());
        for beat in &scene.beats {
            let (next, annotated) = self.step(ctx, beat);
            ctx = next;
            beats.push(annotated);
        }

        let summary = ctx.summary();
        info!(
            scene = scene.number,
            beats = summary.stats.total_beats,
            carryover = summary.stats.carryover_applied,
            adjustments = summary.stats.variety_adjustments,
            "scene planned"
        );
        ScenePlan {
            scene_number: scene.number,
            location: scene.location.clone(),
            beats,
            final_state: ctx.persistent,
            summary,
        }
    }
}

impl BeatStateProcessorBuilder {
    /// A RON profile list. Replaces the built-in roster unless
    /// [`Self::with_profiles`] supplies a base registry.
    pub fn profiles_path(mut self, path: &str) -> Self {
        self.profiles_path = Some(path.to_string());
        self
    }

    /// A directory of RON profile lists, loaded in file-name order.
    pub fn profiles_dir(mut self, path: &str) -> Self {
        self.profiles_dir = Some(path.to_string());
        self
    }

    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Provide profiles directly (for testing without files).
    pub fn with_profiles(mut self, profiles: ProfileRegistry) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: Box<dyn VocabularyLookup>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Provide tuning directly. Takes precedence over `config_path`.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<BeatStateProcessor, PipelineError> {
        let from_files = self.profiles_path.is_some() || self.profiles_dir.is_some();
        let mut profiles = match self.profiles {
            Some(profiles) => profiles,
            None if from_files => ProfileRegistry::new(),
            None => ProfileRegistry::builtin()?,
        };

        if let Some(ref path) = self.profiles_path {
            profiles.load_from_ron(Path::new(path))?;
        }

        if let Some(ref dir) = self.profiles_dir {
            if Path::new(dir).exists() {
                load_ron_files_from_dir(dir, |path| {
                    profiles.load_from_ron(path)?;
                    Ok(())
                })?;
            }
        }

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => PlannerConfig::load_from_ron(Path::new(&path))?,
            (None, None) => PlannerConfig::default(),
        };
        config.validate()?;

        Ok(BeatStateProcessor {
            profiles,
            vocabulary: self
                .vocabulary
                .unwrap_or_else(|| Box::new(StaticVocabulary::new())),
            config,
            variety: VarietyTracker::new(config.shot_repeat_limit, config.angle_stagnation_limit),
            carryover: CharacterCarryoverTracker,
            persistent: ScenePersistentStateTracker::new(config.motion_scan_beats),
            classifier: SceneTemplateClassifier,
        })
    }
}

/// Read an episode from a RON file.
pub fn load_episode(path: &Path) -> Result<Episode, PipelineError> {
    let contents = std::fs::read_to_string(path)?;
    parse_episode(&contents)
}

pub fn parse_episode(input: &str) -> Result<Episode, PipelineError> {
    Ok(ron::from_str(input)?)
}

/// Reject input the fold cannot plan: beats filed under the wrong scene,
/// and missing or repeated beat ids.
pub fn validate_scene(scene: &Scene) -> Result<(), PipelineError> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for beat in &scene.beats {
        if beat.id.as_str().trim().is_empty() {
            return Err(PipelineError::EmptyBeatId {
                scene: scene.number,
            });
        }
        if beat.scene_number != scene.number {
            return Err(PipelineError::SceneMismatch {
                beat: beat.id.clone(),
                expected: scene.number,
                found: beat.scene_number,
            });
        }
        if !seen.insert(beat.id.as_str()) {
            return Err(PipelineError::DuplicateBeatId {
                scene: scene.number,
                beat: beat.id.clone(),
            });
        }
    }
    Ok(())
}

pub fn validate_episode(episode: &Episode) -> Result<(), PipelineError> {
    let mut seen: FxHashSet<u32> = FxHashSet::default();
    for scene in &episode.scenes {
        if !seen.insert(scene.number) {
            return Err(PipelineError::DuplicateScene(scene.number));
        }
        validate_scene(scene)?;
    }
    Ok(())
}

/// Load all .ron files from a directory, in file-name order, calling `loader` for each.
fn load_ron_files_from_dir<F>(dir: &str, mut loader: F) -> Result<(), PipelineError>
where
    F: FnMut(&Path) -> Result<(), PipelineError>,
{
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in &paths {
        loader(path)?;
    }
    Ok(())
}
