/// Scene template classification as a fixed-priority decision list.
///
/// The rule order is part of the contract: a beat that is both a fight and
/// a conversation is `combat`, because combat is checked first.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::core::cues::{first_match, pattern};
use crate::schema::beat::Beat;
use crate::schema::scene_state::ScenePersistentState;
use crate::schema::template::SceneTemplate;

static RIDING: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b(rid(e|es|ing)|rode|driv(e|es|ing)|drove|behind\s+the\s+wheel|cruis\w*|weav(e|es|ing)\s+through\s+traffic)\b")
});

static COMBAT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b(fight\w*|fought|punch\w*|kick(s|ed|ing)?\s+(him|her|them|at)|shoot\w*|shot\s+at|gun(fire|shots?|point)|(draw(s|n)?|drew|pull(s|ed)?|aim(s|ed)?|rais(e|es|ed))\s+(a|the|his|her|their)\s+(gun|pistol|rifle)|fires?\s+at|breach\w*|attack\w*|struggl\w*|grappl\w*|tackl\w*|swing(s|ing)?\s+at|blade|knife|stab\w*|explosion|explodes?|brawl\w*|ambush\w*)\b")
});

static STEALTH: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b(sneak\w*|snuck|creep\w*|crept|covert\w*|stealth\w*|tiptoe\w*|hid(e|es|ing|den)|shadows?|silently|infiltrat\w*|surveil\w*|eavesdrop\w*|lurk\w*)\b")
});

static SUIT_UP: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b((suit|gear|armou?r)(s|ed|ing)?\s+up|calibrat\w*|straps?\s+(on|into)|power\s+suit|exosuit|hud|boot(s|ing)?\s+up)\b")
});

static GHOST: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b(ghost\w*|anomal\w*|apparition\w*|spectral|spectre|specter|phantom\w*|glitch\w*|flicker\w*|haunt\w*|entity|entities|poltergeist)\b")
});

static ESTABLISHING: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b(establish\w*|reveal\w*|skyline|exterior|aerial|panoram\w*|wide\s+view|later|meanwhile|dawn|dusk|transition\w*|cut\s+to|montage)\b")
});

static DIALOGUE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"\b(says?|said|asks?|asked|repl(y|ies|ied)|whisper(s|ed)?|shout(s|ed)?|tells?|told|talk(s|ed|ing)?|speak(s|ing)?|spoke|argu\w*|conversation|mutter(s|ed)?|murmur(s|ed)?|explain(s|ed)?|insist(s|ed)?|confess\w*)\b|"[^"]+"|“[^”]+”"#)
});

/// A template decision with its justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub template: SceneTemplate,
    pub reason: String,
}

impl TemplateMatch {
    fn new(template: SceneTemplate, reason: String) -> Self {
        Self { template, reason }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SceneTemplateClassifier;

impl SceneTemplateClassifier {
    /// Classify one beat against the scene state as of that beat. Pure.
    pub fn classify(&self, beat: &Beat, state: &ScenePersistentState) -> TemplateMatch {
        let text = beat.script_excerpt.as_str();

        if let Some(vehicle) = state.vehicle.as_deref() {
            if state.vehicle_in_motion() {
                return TemplateMatch::new(
                    SceneTemplate::Vehicle,
                    format!("{} in motion", vehicle),
                );
            }
            if let Some(cue) = first_match(&RIDING, text) {
                return TemplateMatch::new(
                    SceneTemplate::Vehicle,
                    format!("'{}' with a {} in the scene", cue, vehicle),
                );
            }
        }

        let keyword_rules: [(&Regex, SceneTemplate, &str); 4] = [
            (&*COMBAT, SceneTemplate::Combat, "combat"),
            (&*STEALTH, SceneTemplate::Stealth, "stealth"),
            (&*SUIT_UP, SceneTemplate::SuitUp, "suit-up"),
            (&*GHOST, SceneTemplate::Ghost, "anomaly"),
        ];
        for (re, template, label) in keyword_rules {
            if let Some(cue) = first_match(re, text) {
                return TemplateMatch::new(template, format!("{} cue '{}'", label, cue));
            }
        }

        if beat.characters.is_empty() {
            return TemplateMatch::new(
                SceneTemplate::Establishing,
                "no characters in frame".to_string(),
            );
        }
        if let Some(cue) = first_match(&ESTABLISHING, text) {
            return TemplateMatch::new(
                SceneTemplate::Establishing,
                format!("establishing cue '{}'", cue),
            );
        }

        if let Some(cue) = first_match(&DIALOGUE, text) {
            return TemplateMatch::new(
                SceneTemplate::IndoorDialogue,
                format!("dialogue cue '{}'", cue),
            );
        }

        TemplateMatch::new(SceneTemplate::Generic, "no template cue".to_string())
    }
}
