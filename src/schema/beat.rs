use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype wrapper for beat identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeatId(pub String);

impl BeatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One camera composition within a scene. Beats are the sole input to the
/// planning pipeline and are never mutated once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    pub id: BeatId,
    pub scene_number: u32,
    pub script_excerpt: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub camera_hint: Option<String>,
    #[serde(default)]
    pub pose_hint: Option<String>,
    #[serde(default)]
    pub emotional_tone: Option<String>,
}

impl Beat {
    pub fn new(id: impl Into<String>, scene_number: u32, script_excerpt: impl Into<String>) -> Self {
        Self {
            id: BeatId::new(id),
            scene_number,
            script_excerpt: script_excerpt.into(),
            characters: Vec::new(),
            camera_hint: None,
            pose_hint: None,
            emotional_tone: None,
        }
    }

    pub fn with_characters(mut self, characters: &[&str]) -> Self {
        self.characters = characters.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_camera(mut self, hint: &str) -> Self {
        self.camera_hint = Some(hint.to_string());
        self
    }

    pub fn with_pose(mut self, hint: &str) -> Self {
        self.pose_hint = Some(hint.to_string());
        self
    }

    pub fn with_tone(mut self, tone: &str) -> Self {
        self.emotional_tone = Some(tone.to_string());
        self
    }

    /// The emotional tone, or `None` when it is missing or blank.
    pub fn tone(&self) -> Option<&str> {
        non_blank(self.emotional_tone.as_deref())
    }

    pub fn camera(&self) -> Option<&str> {
        non_blank(self.camera_hint.as_deref())
    }

    pub fn pose(&self) -> Option<&str> {
        non_blank(self.pose_hint.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// An ordered run of beats sharing one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub number: u32,
    #[serde(default)]
    pub location: Option<String>,
    pub beats: Vec<Beat>,
}

impl Scene {
    /// Every character named by any beat, in order of first appearance.
    pub fn cast(&self) -> Vec<String> {
        let mut cast: Vec<String> = Vec::new();
        for beat in &self.beats {
            for name in &beat.characters {
                if !cast.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                    cast.push(name.clone());
                }
            }
        }
        cast
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub scenes: Vec<Scene>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_hints_read_as_missing() {
        let beat = Beat::new("1-1", 1, "She waits.")
            .with_tone("   ")
            .with_camera("")
            .with_pose(" leaning ");
        assert_eq!(beat.tone(), None);
        assert_eq!(beat.camera(), None);
        assert_eq!(beat.pose(), Some("leaning"));
    }

    #[test]
    fn cast_is_ordered_and_deduplicated() {
        let scene = Scene {
            number: 1,
            location: None,
            beats: vec![
                Beat::new("1-1", 1, "").with_characters(&["Cat", "Daniel"]),
                Beat::new("1-2", 1, "").with_characters(&["daniel", "Rook"]),
            ],
        };
        assert_eq!(scene.cast(), vec!["Cat", "Daniel", "Rook"]);
    }

    #[test]
    fn ron_defaults_optional_fields() {
        let beat: Beat = ron::from_str(
            r#"(id: "2-4", scene_number: 2, script_excerpt: "Rain on the visor.")"#,
        )
        .unwrap();
        assert_eq!(beat.id, BeatId::new("2-4"));
        assert!(beat.characters.is_empty());
        assert!(beat.camera_hint.is_none());
    }
}
