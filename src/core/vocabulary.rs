/// Canonical camera, expression and pose vocabulary.
///
/// The planner only ever sees this through [`VocabularyLookup`], so a host
/// application can swap in its own tables without touching the trackers.

use serde::{Deserialize, Serialize};

/// Which vocabulary table a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabCategory {
    ShotType,
    CameraAngle,
    Expression,
    Pose,
}

/// Lookup capability consumed by the planner.
///
/// Implementations must be deterministic and pure. `alternatives` must be
/// order-stable for identical arguments.
pub trait VocabularyLookup: Send + Sync {
    /// Strict lookup: the canonical term a hint names, or `None` if the hint
    /// does not match anything in the category.
    fn lookup(&self, category: VocabCategory, hint: &str) -> Option<String>;

    /// The fallback term for a category.
    fn default_term(&self, category: VocabCategory) -> String;

    /// Candidate replacements for `current`, excluding `current` itself and
    /// everything in `exclude`. Same-family terms come first.
    fn alternatives(&self, category: VocabCategory, current: &str, exclude: &[String]) -> Vec<String>;

    /// Total lookup: never fails, falls back to [`Self::default_term`].
    fn resolve(&self, category: VocabCategory, hint: Option<&str>) -> String {
        hint.and_then(|h| self.lookup(category, h))
            .unwrap_or_else(|| self.default_term(category))
    }
}

/// One row of a static vocabulary table.
#[derive(Debug, Clone, Copy)]
pub struct VocabEntry {
    pub term: &'static str,
    pub family: &'static str,
    /// Phrases that name this term in free text. Longer phrases are listed
    /// before the shorter ones they contain.
    pub cues: &'static [&'static str],
}

const fn entry(
    term: &'static str,
    family: &'static str,
    cues: &'static [&'static str],
) -> VocabEntry {
    VocabEntry { term, family, cues }
}

static SHOT_TYPES: &[VocabEntry] = &[
    entry("extreme_close_up", "close", &["extreme close up", "extreme closeup", "ecu", "macro"]),
    entry("medium_close_up", "close", &["medium close up", "medium closeup", "mcu"]),
    entry("close_up", "close", &["close up", "closeup", "tight shot", "cu"]),
    entry("insert", "close", &["insert", "detail shot"]),
    entry("medium_wide", "medium", &["medium wide", "medium long", "cowboy", "american shot"]),
    entry("over_the_shoulder", "medium", &["over the shoulder", "ots"]),
    entry("two_shot", "medium", &["two shot", "2 shot"]),
    entry("medium", "medium", &["medium shot", "medium", "mid shot", "waist up"]),
    entry("extreme_wide", "wide", &["extreme wide", "extreme long", "ews", "aerial"]),
    entry("wide", "wide", &["wide shot", "wide", "long shot", "full shot", "full body"]),
    entry("establishing", "wide", &["establishing"]),
];

static CAMERA_ANGLES: &[VocabEntry] = &[
    entry("worms_eye", "low", &["worms eye", "worm s eye", "ground level"]),
    entry("low", "low", &["low angle", "low"]),
    entry("birds_eye", "high", &["birds eye", "bird s eye", "overhead", "top down"]),
    entry("high", "high", &["high angle", "high"]),
    entry("dutch", "tilted", &["dutch", "canted", "tilted"]),
    entry("eye_level", "neutral", &["eye level", "straight on", "neutral angle"]),
    entry("profile", "neutral", &["profile", "side on"]),
];

static EXPRESSIONS: &[VocabEntry] = &[
    entry("jaw clenched, eyes hard", "anger", &["furious", "angry", "anger", "rage", "hostile"]),
    entry("narrowed eyes, lips pressed", "anger", &["suspicious", "distrust", "wary"]),
    entry("wide eyes, breath caught", "fear", &["terrified", "afraid", "scared", "fear", "panic"]),
    entry("brow knit, eyes darting", "fear", &["anxious", "nervous", "tense", "worried"]),
    entry("raised brows, parted lips", "surprise", &["shocked", "surprised", "surprise", "stunned"]),
    entry("downcast eyes, slack mouth", "sadness", &["grief", "sad", "sorrow", "mourning", "hurt"]),
    entry("soft gaze, faint smile", "warmth", &["tender", "affection", "love", "fond"]),
    entry("open smile, bright eyes", "warmth", &["happy", "joy", "delighted", "relieved"]),
    entry("wry half-smile", "warmth", &["amused", "playful", "teasing", "smug"]),
    entry("set jaw, level gaze", "resolve", &["determined", "resolute", "focused", "resolve"]),
    entry("relaxed, unreadable", "neutral", &["calm", "composed", "neutral", "flat"]),
];

static POSES: &[VocabEntry] = &[
    entry("riding, leaning into the handlebars", "vehicle", &["riding", "on the bike", "astride"]),
    entry("seated behind the wheel", "vehicle", &["driving", "behind the wheel"]),
    entry("running", "motion", &["running", "sprinting", "fleeing"]),
    entry("walking", "motion", &["walking", "striding", "pacing"]),
    entry("crouching low", "low", &["crouching", "crouched", "squatting"]),
    entry("kneeling", "low", &["kneeling", "on one knee"]),
    entry("lying prone", "low", &["lying", "prone", "sprawled"]),
    entry("seated", "rest", &["seated", "sitting", "sits"]),
    entry("leaning against a wall", "rest", &["leaning", "leans"]),
    entry("arms crossed", "standing", &["arms crossed", "arms folded"]),
    entry("fighting stance", "standing", &["fighting stance", "guard up", "braced"]),
    entry("standing", "standing", &["standing", "stands", "upright"]),
];

/// The built-in static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticVocabulary;

impl StaticVocabulary {
    pub fn new() -> Self {
        Self
    }

    pub fn entries(category: VocabCategory) -> &'static [VocabEntry] {
        match category {
            VocabCategory::ShotType => SHOT_TYPES,
            VocabCategory::CameraAngle => CAMERA_ANGLES,
            VocabCategory::Expression => EXPRESSIONS,
            VocabCategory::Pose => POSES,
        }
    }

    fn family_of(category: VocabCategory, term: &str) -> Option<&'static str> {
        Self::entries(category)
            .iter()
            .find(|e| e.term == term)
            .map(|e| e.family)
    }
}

impl VocabularyLookup for StaticVocabulary {
    fn lookup(&self, category: VocabCategory, hint: &str) -> Option<String> {
        let padded = normalize_hint(hint);
        let entries = Self::entries(category);

        // A hint that already is a canonical term wins outright.
        if let Some(exact) = entries.iter().find(|e| e.term.eq_ignore_ascii_case(hint.trim())) {
            return Some(exact.term.to_string());
        }

        entries
            .iter()
            .find(|e| e.cues.iter().any(|cue| padded.contains(&format!(" {} ", cue))))
            .map(|e| e.term.to_string())
    }

    fn default_term(&self, category: VocabCategory) -> String {
        match category {
            VocabCategory::ShotType => "medium",
            VocabCategory::CameraAngle => "eye_level",
            VocabCategory::Expression => "relaxed, unreadable",
            VocabCategory::Pose => "standing",
        }
        .to_string()
    }

    fn alternatives(&self, category: VocabCategory, current: &str, exclude: &[String]) -> Vec<String> {
        let family = Self::family_of(category, current);
        let allowed = |e: &&VocabEntry| e.term != current && !exclude.iter().any(|x| x == e.term);

        let entries = Self::entries(category);
        let same = entries
            .iter()
            .filter(allowed)
            .filter(|e| Some(e.family) == family);
        let other = entries
            .iter()
            .filter(allowed)
            .filter(|e| Some(e.family) != family);

        same.chain(other).map(|e| e.term.to_string()).collect()
    }
}

/// Lower-case, turn separators into spaces, and pad so cues can be matched
/// on token boundaries with a plain substring search.
fn normalize_hint(hint: &str) -> String {
    let mut out = String::with_capacity(hint.len() + 2);
    out.push(' ');
    let mut last_space = true;
    for ch in hint.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if !last_space {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_prefers_longer_cues() {
        let vocab = StaticVocabulary::new();
        assert_eq!(
            vocab.lookup(VocabCategory::ShotType, "Medium close-up on Cat").as_deref(),
            Some("medium_close_up")
        );
        assert_eq!(
            vocab.lookup(VocabCategory::ShotType, "extreme wide, dusk").as_deref(),
            Some("extreme_wide")
        );
        assert_eq!(vocab.lookup(VocabCategory::ShotType, "CLOSE_UP").as_deref(), Some("close_up"));
    }

    #[test]
    fn lookup_matches_on_token_boundaries() {
        let vocab = StaticVocabulary::new();
        // "follow" must not read as "low"
        assert_eq!(vocab.lookup(VocabCategory::CameraAngle, "follow cam"), None);
        assert_eq!(
            vocab.lookup(VocabCategory::CameraAngle, "medium shot, low-angle").as_deref(),
            Some("low")
        );
        assert_eq!(
            vocab.lookup(VocabCategory::CameraAngle, "bird's-eye view").as_deref(),
            Some("birds_eye")
        );
    }

    #[test]
    fn resolve_is_total() {
        let vocab = StaticVocabulary::new();
        assert_eq!(vocab.resolve(VocabCategory::ShotType, Some("something odd")), "medium");
        assert_eq!(vocab.resolve(VocabCategory::CameraAngle, None), "eye_level");
        assert_eq!(vocab.resolve(VocabCategory::Pose, Some("")), "standing");
    }

    #[test]
    fn alternatives_prefer_same_family() {
        let vocab = StaticVocabulary::new();
        let alts = vocab.alternatives(VocabCategory::ShotType, "close_up", &[]);
        assert_eq!(&alts[..3], &["extreme_close_up", "medium_close_up", "insert"]);
        assert!(!alts.contains(&"close_up".to_string()));
        assert!(alts.contains(&"wide".to_string()));
    }

    #[test]
    fn alternatives_respect_exclusions() {
        let vocab = StaticVocabulary::new();
        let exclude = vec!["medium_wide".to_string(), "two_shot".to_string()];
        let alts = vocab.alternatives(VocabCategory::ShotType, "medium", &exclude);
        assert_eq!(alts[0], "over_the_shoulder");
        assert!(alts.iter().all(|a| !exclude.contains(a)));
    }

    #[test]
    fn alternatives_for_unknown_term_lists_everything_else() {
        let vocab = StaticVocabulary::new();
        let alts = vocab.alternatives(VocabCategory::CameraAngle, "canted-ish", &[]);
        assert_eq!(alts.len(), CAMERA_ANGLES.len());
    }

    #[test]
    fn alternatives_are_order_stable() {
        let vocab = StaticVocabulary::new();
        let exclude = vec!["low".to_string()];
        assert_eq!(
            vocab.alternatives(VocabCategory::CameraAngle, "low", &exclude),
            vocab.alternatives(VocabCategory::CameraAngle, "low", &exclude)
        );
    }
}
