use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether the scene's vehicle is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    InMotion,
    Parked,
    #[default]
    Unknown,
}

/// Protective headgear state shared by everyone in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GearState {
    HelmetDown,
    HelmetVisorUp,
    HelmetOff,
    #[default]
    Unknown,
}

impl GearState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HelmetDown => "HELMET_DOWN",
            Self::HelmetVisorUp => "HELMET_VISOR_UP",
            Self::HelmetOff => "HELMET_OFF",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Scene-wide facts that persist from beat to beat until an explicit
/// narrative cue changes them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenePersistentState {
    pub vehicle: Option<String>,
    pub motion: MotionState,
    /// Characters currently in the scene, in order of arrival.
    pub present: Vec<String>,
    /// Character → spatial position label (e.g. "rider", "passenger").
    pub positions: BTreeMap<String, String>,
    pub gear: GearState,
    pub location: Option<String>,
    /// Character → appearance-phase label (e.g. "suited").
    pub appearance: BTreeMap<String, String>,
}

impl ScenePersistentState {
    pub fn is_present(&self, character: &str) -> bool {
        self.present.iter().any(|c| c.eq_ignore_ascii_case(character))
    }

    pub fn vehicle_in_motion(&self) -> bool {
        self.vehicle.is_some() && self.motion == MotionState::InMotion
    }
}

/// A character named on a beat, as the scene state sees them: the name the
/// state files them under plus every spelling that may refer to them in
/// beat text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastName {
    pub name: String,
    pub spellings: Vec<String>,
}

impl CastName {
    /// A character known only by the one name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            spellings: vec![name.clone()],
            name,
        }
    }

    pub fn with_spelling(mut self, spelling: &str) -> Self {
        let spelling = spelling.trim();
        if !spelling.is_empty() && !self.spellings.iter().any(|s| s.eq_ignore_ascii_case(spelling)) {
            self.spellings.push(spelling.to_string());
        }
        self
    }
}
