/// Character expression profiles and per-character facial vocabulary.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::vocabulary::{VocabCategory, VocabularyLookup};

/// Tone fragments that mean a character is hiding something.
const DECEPTION_CUES: &[&str] = &[
    "concealing",
    "hiding",
    "lying",
    "masking",
    "pretending",
    "feigning",
    "false",
    "not revealing",
];

const STRESS_CUES: &[&str] = &[
    "stress", "fear", "afraid", "scared", "panic", "terrified", "threat", "danger", "pressure",
];

const VULNERABLE_CUES: &[&str] = &[
    "vulnerable", "soft", "tender", "fragile", "exposed", "hurt", "grief", "tearful",
];

/// How a single character's face reads on camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterExpressionProfile {
    pub key: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Free-text note for writers; the planner never reads it.
    #[serde(default)]
    pub personality: String,
    pub default_expression: String,
    pub stressed_expression: String,
    pub vulnerable_expression: String,
    /// Physical tells shown when the character conceals something, most
    /// characteristic first.
    #[serde(default)]
    pub deception_tells: Vec<String>,
    /// Emotion keyword → expression, scanned in order.
    #[serde(default)]
    pub emotions: Vec<(String, String)>,
}

impl CharacterExpressionProfile {
    /// The key followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("name '{name}' is claimed by both '{first}' and '{second}'")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
    #[error("profile '{0}' has an empty default expression")]
    EmptyDefault(String),
}

const BUILTIN_PROFILES: &str = include_str!("../../data/profiles.ron");

/// Registry of character profiles, addressable by key or alias.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<CharacterExpressionProfile>,
    /// Lower-cased key or alias → index into `profiles`.
    index: FxHashMap<String, usize>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The roster compiled into the crate.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::parse_ron(BUILTIN_PROFILES)
    }

    pub fn register(&mut self, profile: CharacterExpressionProfile) -> Result<(), ProfileError> {
        if profile.default_expression.trim().is_empty() {
            return Err(ProfileError::EmptyDefault(profile.key));
        }

        let slot = self.profiles.len();
        let mut claimed = Vec::new();
        for name in profile.names() {
            let lowered = name.trim().to_lowercase();
            if let Some(&existing) = self.index.get(&lowered) {
                return Err(ProfileError::DuplicateName {
                    name: name.to_string(),
                    first: self.profiles[existing].key.clone(),
                    second: profile.key.clone(),
                });
            }
            if !claimed.contains(&lowered) {
                claimed.push(lowered);
            }
        }

        for name in claimed {
            self.index.insert(name, slot);
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Case-insensitive exact match against a key or any alias.
    pub fn resolve(&self, name: &str) -> Option<&CharacterExpressionProfile> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.profiles[i])
    }

    pub fn profiles(&self) -> &[CharacterExpressionProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Pick the expression for a character given an optional tone.
    pub fn expression_for(
        &self,
        character: &str,
        tone: Option<&str>,
        vocab: &dyn VocabularyLookup,
    ) -> String {
        let tone = tone.map(str::trim).filter(|t| !t.is_empty());
        let Some(profile) = self.resolve(character) else {
            return vocab.resolve(VocabCategory::Expression, tone);
        };
        let Some(tone) = tone else {
            return profile.default_expression.clone();
        };

        let lowered = tone.to_lowercase();
        if let Some((_, expression)) = profile
            .emotions
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
        {
            return expression.clone();
        }
        if STRESS_CUES.iter().any(|cue| lowered.contains(cue)) {
            return profile.stressed_expression.clone();
        }
        if VULNERABLE_CUES.iter().any(|cue| lowered.contains(cue)) {
            return profile.vulnerable_expression.clone();
        }
        vocab.resolve(VocabCategory::Expression, Some(tone))
    }

    /// Append the character's leading deception tell, if there is one.
    pub fn apply_deception_tell(&self, character: &str, expression: &str) -> String {
        match self
            .resolve(character)
            .and_then(|p| p.deception_tells.first())
        {
            Some(tell) => format!("{}, {}", expression, tell),
            None => expression.to_string(),
        }
    }

    /// Load profiles from a RON file. The file should contain a list of profiles.
    pub fn load_from_ron(&mut self, path: &Path) -> Result<(), ProfileError> {
        let contents = std::fs::read_to_string(path)?;
        let profiles: Vec<CharacterExpressionProfile> = ron::from_str(&contents)?;
        for profile in profiles {
            self.register(profile)?;
        }
        Ok(())
    }

    pub fn parse_ron(input: &str) -> Result<Self, ProfileError> {
        let profiles: Vec<CharacterExpressionProfile> = ron::from_str(input)?;
        let mut registry = Self::new();
        for profile in profiles {
            registry.register(profile)?;
        }
        Ok(registry)
    }
}

/// True if a tone or script fragment implies the speaker is concealing something.
pub fn is_deception_signal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    DECEPTION_CUES.iter().any(|cue| lowered.contains(cue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocabulary::StaticVocabulary;

    fn make_cat() -> CharacterExpressionProfile {
        CharacterExpressionProfile {
            key: "cat".to_string(),
            aliases: vec!["Catherine".to_string(), "Cat Vance".to_string()],
            personality: "guarded courier".to_string(),
            default_expression: "cool half-lidded stare".to_string(),
            stressed_expression: "jaw tight, eyes scanning exits".to_string(),
            vulnerable_expression: "guard dropped, eyes glassy".to_string(),
            deception_tells: vec![
                "thumb worrying her ring".to_string(),
                "smile that stops short of her eyes".to_string(),
            ],
            emotions: vec![
                ("amused".to_string(), "crooked smirk".to_string()),
                ("angry".to_string(), "nostrils flared, very still".to_string()),
            ],
        }
    }

    fn make_rook() -> CharacterExpressionProfile {
        CharacterExpressionProfile {
            key: "Rook".to_string(),
            aliases: Vec::new(),
            personality: String::new(),
            default_expression: "blank soldier's face".to_string(),
            stressed_expression: "teeth bared".to_string(),
            vulnerable_expression: "looks away".to_string(),
            deception_tells: Vec::new(),
            emotions: Vec::new(),
        }
    }

    fn registry() -> ProfileRegistry {
        let mut registry = ProfileRegistry::new();
        registry.register(make_cat()).unwrap();
        registry.register(make_rook()).unwrap();
        registry
    }

    #[test]
    fn resolve_by_key_and_alias() {
        let registry = registry();
        assert_eq!(registry.resolve("CAT").unwrap().key, "cat");
        assert_eq!(registry.resolve("catherine").unwrap().key, "cat");
        assert_eq!(registry.resolve(" Cat Vance ").unwrap().key, "cat");
        assert_eq!(registry.resolve("rook").unwrap().key, "Rook");
        assert!(registry.resolve("Vance").is_none());
    }

    #[test]
    fn duplicate_alias_rejected() {
        let mut registry = registry();
        let mut impostor = make_rook();
        impostor.key = "Catherine".to_string();
        let err = registry.register(impostor).unwrap_err();
        assert!(matches!(err, ProfileError::DuplicateName { ref first, .. } if first == "cat"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn empty_default_rejected() {
        let mut registry = ProfileRegistry::new();
        let mut blank = make_rook();
        blank.default_expression = "  ".to_string();
        assert!(matches!(
            registry.register(blank),
            Err(ProfileError::EmptyDefault(_))
        ));
    }

    #[test]
    fn expression_without_tone_is_default() {
        let registry = registry();
        let vocab = StaticVocabulary::new();
        assert_eq!(
            registry.expression_for("Cat", None, &vocab),
            "cool half-lidded stare"
        );
        assert_eq!(
            registry.expression_for("Cat", Some("  "), &vocab),
            "cool half-lidded stare"
        );
    }

    #[test]
    fn expression_uses_first_matching_emotion() {
        let registry = registry();
        let vocab = StaticVocabulary::new();
        assert_eq!(
            registry.expression_for("Cat", Some("Amused but angry"), &vocab),
            "crooked smirk"
        );
    }

    #[test]
    fn expression_falls_back_to_stress_then_vulnerable() {
        let registry = registry();
        let vocab = StaticVocabulary::new();
        assert_eq!(
            registry.expression_for("Cat", Some("under pressure"), &vocab),
            "jaw tight, eyes scanning exits"
        );
        assert_eq!(
            registry.expression_for("Cat", Some("soft, vulnerable"), &vocab),
            "guard dropped, eyes glassy"
        );
    }

    #[test]
    fn expression_falls_back_to_vocabulary() {
        let registry = registry();
        let vocab = StaticVocabulary::new();
        assert_eq!(
            registry.expression_for("Cat", Some("determined"), &vocab),
            "set jaw, level gaze"
        );
        assert_eq!(
            registry.expression_for("Stranger", Some("suspicious"), &vocab),
            "narrowed eyes, lips pressed"
        );
        assert_eq!(
            registry.expression_for("Stranger", None, &vocab),
            "relaxed, unreadable"
        );
    }

    #[test]
    fn deception_tell_appends_first_fragment() {
        let registry = registry();
        assert_eq!(
            registry.apply_deception_tell("cat", "cool half-lidded stare"),
            "cool half-lidded stare, thumb worrying her ring"
        );
        assert_eq!(registry.apply_deception_tell("Rook", "teeth bared"), "teeth bared");
        assert_eq!(registry.apply_deception_tell("Nobody", "flat"), "flat");
    }

    #[test]
    fn deception_signals() {
        assert!(is_deception_signal("Concealing the truth"));
        assert!(is_deception_signal("not revealing her fear"));
        assert!(is_deception_signal("false calm"));
        assert!(!is_deception_signal("honest relief"));
    }

    #[test]
    fn ron_round_trip() {
        let profile = make_cat();
        let serialized = ron::to_string(&vec![profile]).unwrap();
        let registry = ProfileRegistry::parse_ron(&serialized).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("Catherine").unwrap().emotions.len(), 2);
    }

    #[test]
    fn builtin_roster_loads() {
        let registry = ProfileRegistry::builtin().unwrap();
        assert!(!registry.is_empty());
        assert!(registry.resolve("Cat").is_some());
        assert!(!registry.resolve("Cat").unwrap().deception_tells.is_empty());
    }

    #[test]
    fn load_test_profiles_from_ron() {
        let path = std::path::PathBuf::from("tests/fixtures/test_profiles.ron");
        let mut registry = ProfileRegistry::new();
        registry.load_from_ron(&path).unwrap();
        assert!(registry.resolve("Cat").is_some());
        assert!(registry.resolve("Danny").is_some());
    }
}
