//! WASM bindings for shot-planner, powering the storyboard preview page.

use wasm_bindgen::prelude::*;

use shot_planner::core::config::PlannerConfig;
use shot_planner::core::pipeline::BeatStateProcessor;
use shot_planner::core::profiles::ProfileRegistry;
use shot_planner::schema::beat::{Episode, Scene};
use shot_planner::schema::template::SceneTemplate;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize, Default)]
#[serde(default)]
struct PlannerOptions {
    /// RON profile list; the built-in roster when absent.
    profiles_ron: Option<String>,
    config: Option<PlannerConfig>,
}

#[derive(serde::Serialize)]
struct ProfileInfo {
    key: String,
    aliases: Vec<String>,
    default_expression: String,
    tells: usize,
}

fn js_err(context: &str, e: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// ShotPlanner: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct ShotPlanner {
    processor: BeatStateProcessor,
}

#[wasm_bindgen]
impl ShotPlanner {
    /// Create a planner from a JSON options object (may be empty).
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "profiles_ron": "[ (key: \"cat\", default_expression: ...) ]",
    ///   "config": { "shot_repeat_limit": 3, "angle_stagnation_limit": 3, "motion_scan_beats": 5 }
    /// }
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: &str) -> Result<ShotPlanner, JsError> {
        let options: PlannerOptions = if options_json.trim().is_empty() {
            PlannerOptions::default()
        } else {
            serde_json::from_str(options_json).map_err(|e| js_err("Invalid options JSON", e))?
        };

        let mut builder = BeatStateProcessor::builder();
        if let Some(ref source) = options.profiles_ron {
            let profiles =
                ProfileRegistry::parse_ron(source).map_err(|e| js_err("Profile parse error", e))?;
            builder = builder.with_profiles(profiles);
        }
        if let Some(config) = options.config {
            builder = builder.with_config(config);
        }
        let processor = builder
            .build()
            .map_err(|e| js_err("Planner build error", e))?;

        Ok(ShotPlanner { processor })
    }

    /// Plan a whole episode given as JSON. Returns the annotated plan as JSON.
    pub fn plan_episode(&self, episode_json: &str) -> Result<String, JsError> {
        let episode: Episode =
            serde_json::from_str(episode_json).map_err(|e| js_err("Invalid episode JSON", e))?;
        let plan = self
            .processor
            .process_episode(&episode)
            .map_err(|e| js_err("Planning error", e))?;
        serde_json::to_string(&plan).map_err(|e| js_err("Serialization error", e))
    }

    /// Plan one scene given as JSON.
    pub fn plan_scene(&self, scene_json: &str) -> Result<String, JsError> {
        let scene: Scene =
            serde_json::from_str(scene_json).map_err(|e| js_err("Invalid scene JSON", e))?;
        let plan = self
            .processor
            .process_scene(&scene)
            .map_err(|e| js_err("Planning error", e))?;
        serde_json::to_string(&plan).map_err(|e| js_err("Serialization error", e))
    }

    /// Return a JSON summary of the roster this planner uses.
    pub fn profiles(&self) -> Result<String, JsError> {
        let info: Vec<ProfileInfo> = self
            .processor
            .profiles()
            .profiles()
            .iter()
            .map(|p| ProfileInfo {
                key: p.key.clone(),
                aliases: p.aliases.clone(),
                default_expression: p.default_expression.clone(),
                tells: p.deception_tells.len(),
            })
            .collect();
        serde_json::to_string(&info).map_err(|e| js_err("Serialization error", e))
    }

    /// Return the built-in roster as a JSON array of full profiles.
    pub fn builtin_profiles() -> Result<String, JsError> {
        let registry = ProfileRegistry::builtin().map_err(|e| js_err("Profile parse error", e))?;
        serde_json::to_string(registry.profiles()).map_err(|e| js_err("Serialization error", e))
    }

    /// Return JSON array of scene template tags in classification priority order.
    pub fn scene_templates() -> String {
        let tags: Vec<&str> = [
            SceneTemplate::Vehicle,
            SceneTemplate::Combat,
            SceneTemplate::Stealth,
            SceneTemplate::SuitUp,
            SceneTemplate::Ghost,
            SceneTemplate::Establishing,
            SceneTemplate::IndoorDialogue,
            SceneTemplate::Generic,
        ]
        .iter()
        .map(|t| t.tag())
        .collect();
        serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_string())
    }
}
