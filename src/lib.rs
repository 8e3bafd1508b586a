//! Shot Planner: deterministic camera and performance planning for scripted scenes.
//!
//! Turns a scene's beats into annotated shots: canonical shot type and camera
//! angle, per-character expression and pose with continuity carried between
//! beats, variety enforcement against monotonous coverage, scene-wide state
//! (vehicle motion, presence, gear) and a scene template tag for downstream
//! prompt assembly.

pub mod core;
pub mod schema;

pub use crate::core::config::PlannerConfig;
pub use crate::core::pipeline::{BeatStateProcessor, EpisodePlan, PipelineError, ScenePlan};
pub use crate::core::vocabulary::{StaticVocabulary, VocabCategory, VocabularyLookup};
pub use crate::schema::annotated::AnnotatedBeat;
pub use crate::schema::beat::{Beat, BeatId, Episode, Scene};
