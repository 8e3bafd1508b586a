/// Scene-wide continuity: vehicle motion, headgear, presence, appearance.
///
/// Every field carries forward until a beat contains an explicit cue for it.
/// A beat with no cue leaves the state exactly as it was.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::core::cues::{latest_effect, pattern, subjects_of};
use crate::schema::scene_state::{CastName, GearState, MotionState, ScenePersistentState};

static VEHICLE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"\b(motorcycle|motorbike|bike|scooter|car|sedan|truck|van|suv|jeep|taxi|cab)s?\b")
});

/// Two-wheelers seat a rider and a pillion; everything else a driver and passenger.
const TWO_WHEELERS: &[&str] = &["motorcycle", "motorbike", "bike", "scooter"];

static HEADGEAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b(helmet|visor)s?\b"));

static MOTION_TRIGGERS: LazyLock<Vec<(Regex, MotionState)>> = LazyLock::new(|| {
    vec![
        (
            pattern(
                r"\b(dismount\w*|park(s|ed|ing)?|pull(s|ed|ing)?\s+over|brak(e|es|ed|ing)|(kill|cut)(s|ed|ing)?\s+the\s+(engine|ignition)|engine\s+off|(comes|came|rolls|rolled)\s+to\s+a\s+(stop|halt))\b",
            ),
            MotionState::Parked,
        ),
        (
            pattern(
                r"\b(mount(s|ed|ing)?|rid(e|es|ing)|rode|accelerat\w*|depart\w*|speed(s|ing)?\s+(off|away)|sped\s+(off|away)|pull(s|ed|ing)?\s+away|roar(s|ed|ing)?\s+off|throttl\w*)\b",
            ),
            MotionState::InMotion,
        ),
    ]
});

static GEAR_TRIGGERS: LazyLock<Vec<(Regex, GearState)>> = LazyLock::new(|| {
    vec![
        (
            pattern(
                r"\b(remov\w*|tak(e|es|ing)\s+off|took\s+off|pull(s|ed|ing)?\s+off|yank(s|ed|ing)?\s+off|unstrap\w*)\s+(his\s+|her\s+|their\s+|the\s+)?helmet\b|\bhelmet\s+off\b",
            ),
            GearState::HelmetOff,
        ),
        (
            pattern(
                r"\b(rais\w*|lift\w*|flip\w*|push\w*)\s+(up\s+)?(his\s+|her\s+|their\s+|the\s+)?visor\b|\bvisor\s+up\b",
            ),
            GearState::HelmetVisorUp,
        ),
        (
            pattern(
                r"\b(lower\w*|(flip|snap|slam)\w*\s+down)\s+(his\s+|her\s+|their\s+|the\s+)?visor\b|\bvisor\s+down\b|\b(put(s|ting)?\s+on|pull(s|ed|ing)?\s+on|strap(s|ped|ping)?\s+on|don(s|ned|ning))\s+(his\s+|her\s+|their\s+|the\s+)?helmet\b",
            ),
            GearState::HelmetDown,
        ),
    ]
});

static DEPARTURE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"\b(leav(e|es|ing)|exit(s|ed|ing)?|depart(s|ed|ing)?|walk(s|ed)?\s+(away|out|off)|storm(s|ed)?\s+(out|off)|(step|slip)(s|ped)?\s+out|disappear(s|ed)?|vanish(es|ed)?|(rides|rode|drives|drove)\s+off)\b",
    )
});

static ARRIVAL: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"\b(arriv(e|es|ed|ing)|enter(s|ed|ing)?|(walk|step|burst)(s|ed|ped)?\s+in|return(s|ed|ing)?|join(s|ed)?|appear(s|ed)?|(pull|show)(s|ed)?\s+up)\b",
    )
});

static APPEARANCE_TRIGGERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            pattern(r"\b(suit|gear|armou?r)(s|ed|ing)?\s+up\b"),
            "suited",
        ),
        (
            pattern(r"\b(chang(e|es|ed|ing)\s+(into|clothes)|puts?\s+on\s+(a|the|his|her|their)\s+(disguise|uniform|dress|jacket|coat))\b"),
            "changed",
        ),
        (
            pattern(r"\b(strip(s|ped)?|peel(s|ed)?|shed(s)?)\s+(off\s+)?(the|his|her|their)\s+(suit|armou?r|gear)\b"),
            "civilian",
        ),
    ]
});

/// One field transition applied by [`ScenePersistentStateTracker::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateChange {
    Motion { from: MotionState, to: MotionState, cue: String },
    Gear { from: GearState, to: GearState, cue: String },
    Arrived { character: String },
    Departed { character: String },
    Appearance { character: String, phase: String },
    Pairing { positions: Vec<(String, String)> },
}

/// Result of folding one beat into the persistent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    pub state: ScenePersistentState,
    pub changes: Vec<StateChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenePersistentStateTracker {
    /// Leading beats whose text seeds the initial motion state.
    pub motion_scan_beats: usize,
}

impl Default for ScenePersistentStateTracker {
    fn default() -> Self {
        Self { motion_scan_beats: 5 }
    }
}

impl ScenePersistentStateTracker {
    pub fn new(motion_scan_beats: usize) -> Self {
        Self { motion_scan_beats }
    }

    /// Build the opening state from the whole scene before any beat is folded.
    /// `characters` are the names the state records, one per character.
    pub fn initialize(
        &self,
        beat_texts: &[&str],
        characters: &[String],
        location: Option<&str>,
    ) -> ScenePersistentState {
        let scene_text = beat_texts.join("\n");
        let mut state = ScenePersistentState {
            present: characters.to_vec(),
            location: location.map(str::to_string),
            ..Default::default()
        };

        if let Some(caps) = VEHICLE.captures(&scene_text) {
            state.vehicle = caps.get(1).map(|m| m.as_str().to_lowercase());
        }

        if state.vehicle.is_some() {
            // The scene opens in whatever state the earliest cue describes.
            if let Some(hit) = beat_texts
                .iter()
                .take(self.motion_scan_beats)
                .find_map(|text| latest_effect(&MOTION_TRIGGERS, text))
            {
                state.motion = hit.effect;
            }
            if state.motion == MotionState::InMotion {
                seat_pair(&mut state);
            }
        }

        if HEADGEAR.is_match(&scene_text) {
            state.gear = GearState::HelmetDown;
        }

        debug!(
            vehicle = ?state.vehicle,
            motion = ?state.motion,
            gear = state.gear.label(),
            present = state.present.len(),
            "scene state initialized"
        );
        state
    }

    /// Fold one beat's text into the state. `beat_characters` are the only
    /// characters that arrival/departure and appearance cues may apply to;
    /// any of their spellings in `text` counts, and changes are filed under
    /// their recorded name.
    pub fn update(
        &self,
        mut state: ScenePersistentState,
        text: &str,
        beat_characters: &[CastName],
    ) -> StateUpdate {
        let mut changes = Vec::new();

        if state.vehicle.is_some() {
            if let Some(hit) = latest_effect(&MOTION_TRIGGERS, text) {
                if hit.effect != state.motion {
                    changes.push(StateChange::Motion {
                        from: state.motion,
                        to: hit.effect,
                        cue: hit.cue,
                    });
                    state.motion = hit.effect;
                    if hit.effect == MotionState::InMotion && state.positions.is_empty() {
                        if let Some(pairing) = seat_pair(&mut state) {
                            changes.push(pairing);
                        }
                    }
                }
            }
        }

        if let Some(hit) = latest_effect(&GEAR_TRIGGERS, text) {
            if hit.effect != state.gear {
                changes.push(StateChange::Gear {
                    from: state.gear,
                    to: hit.effect,
                    cue: hit.cue,
                });
                state.gear = hit.effect;
            }
        }

        for name in subjects_of(&DEPARTURE, text, beat_characters) {
            if let Some(pos) = state.present.iter().position(|c| c.eq_ignore_ascii_case(name)) {
                let removed = state.present.remove(pos);
                state.positions.remove(&removed);
                changes.push(StateChange::Departed { character: removed });
            }
        }

        for name in subjects_of(&ARRIVAL, text, beat_characters) {
            if !state.is_present(name) {
                state.present.push(name.to_string());
                changes.push(StateChange::Arrived {
                    character: name.to_string(),
                });
            }
        }

        for (re, phase) in APPEARANCE_TRIGGERS.iter() {
            for name in subjects_of(re, text, beat_characters) {
                if state.appearance.get(name).map(String::as_str) != Some(*phase) {
                    state.appearance.insert(name.to_string(), phase.to_string());
                    changes.push(StateChange::Appearance {
                        character: name.to_string(),
                        phase: phase.to_string(),
                    });
                }
            }
        }

        for change in &changes {
            debug!(?change, "scene state changed");
        }
        StateUpdate { state, changes }
    }
}

/// Seat exactly two present characters on the vehicle, first listed in front.
fn seat_pair(state: &mut ScenePersistentState) -> Option<StateChange> {
    let vehicle = state.vehicle.as_deref()?;
    if state.present.len() != 2 {
        return None;
    }
    let (front, back) = if TWO_WHEELERS.contains(&vehicle) {
        ("rider", "pillion")
    } else {
        ("driver", "passenger")
    };
    let positions = vec![
        (state.present[0].clone(), front.to_string()),
        (state.present[1].clone(), back.to_string()),
    ];
    for (character, position) in &positions {
        state.positions.insert(character.clone(), position.clone());
    }
    Some(StateChange::Pairing { positions })
}
