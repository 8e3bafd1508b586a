use serde::{Deserialize, Serialize};

/// The narrative-scene template taxonomy.
///
/// Downstream prompt assembly picks its prompt skeleton from this tag, so
/// the variants name WHAT kind of moment a beat is, not how it should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneTemplate {
    Vehicle,
    Combat,
    Stealth,
    SuitUp,
    Ghost,
    Establishing,
    IndoorDialogue,
    Generic,
}

impl SceneTemplate {
    /// Returns the tag string for this template (e.g., "suit_up").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Combat => "combat",
            Self::Stealth => "stealth",
            Self::SuitUp => "suit_up",
            Self::Ghost => "ghost",
            Self::Establishing => "establishing",
            Self::IndoorDialogue => "indoor_dialogue",
            Self::Generic => "generic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_tags() {
        assert_eq!(SceneTemplate::Vehicle.tag(), "vehicle");
        assert_eq!(SceneTemplate::SuitUp.tag(), "suit_up");
        assert_eq!(SceneTemplate::IndoorDialogue.tag(), "indoor_dialogue");
    }

    #[test]
    fn serde_uses_tag_names() {
        let serialized = ron::to_string(&SceneTemplate::IndoorDialogue).unwrap();
        assert_eq!(serialized, "indoor_dialogue");
    }
}
