/// Variety enforcement: blocks monotonous shot and angle runs.
///
/// State is a plain value: [`VarietyTracker::advance`] consumes the previous
/// [`SceneVarietyState`] and returns the next one, so a scene's history is
/// exactly the fold of its enforced beats.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::vocabulary::{VocabCategory, VocabularyLookup};

/// Rolling window length for shot and angle history.
pub const WINDOW: usize = 3;

/// Rolling shot/angle history for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneVarietyState {
    /// Newest last, never longer than [`WINDOW`].
    pub recent_shots: Vec<String>,
    pub recent_angles: Vec<String>,
    pub beat_count: u32,
    /// Length of the current run of identical shots (0 before the first beat).
    pub consecutive_same_shot: u32,
    pub consecutive_same_angle: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    ConsecutiveShot,
    ImmediateRepeat,
    AngleStagnation,
    Alternation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Forces a replacement when an alternative exists.
    Hard,
    /// Reported only.
    Soft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    /// The proposed value that triggered the violation.
    pub value: String,
    pub message: String,
}

impl Violation {
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

/// Outcome of enforcing variety on one proposed shot/angle pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enforcement {
    pub proposed_shot: String,
    pub proposed_angle: String,
    pub shot: String,
    pub angle: String,
    pub violations: Vec<Violation>,
    /// Hard violations left in place because no alternative was offered.
    pub unresolved: Vec<ViolationKind>,
    pub reason: Option<String>,
}

impl Enforcement {
    pub fn adjusted(&self) -> bool {
        self.shot != self.proposed_shot || self.angle != self.proposed_angle
    }

    pub fn shot_adjusted(&self) -> bool {
        self.shot != self.proposed_shot
    }

    pub fn angle_adjusted(&self) -> bool {
        self.angle != self.proposed_angle
    }
}

/// Applies the monotony rules. The limits count the proposed beat, so a
/// limit of 3 blocks the third identical value in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarietyTracker {
    pub shot_repeat_limit: usize,
    pub angle_stagnation_limit: usize,
}

impl Default for VarietyTracker {
    fn default() -> Self {
        Self {
            shot_repeat_limit: 3,
            angle_stagnation_limit: 3,
        }
    }
}

impl VarietyTracker {
    pub fn new(shot_repeat_limit: usize, angle_stagnation_limit: usize) -> Self {
        Self {
            shot_repeat_limit,
            angle_stagnation_limit,
        }
    }

    /// Every rule the proposal breaks, in rule priority order.
    pub fn check_violations(
        &self,
        state: &SceneVarietyState,
        shot: &str,
        angle: &str,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        let shot_run = trailing_run(&state.recent_shots, shot);
        if shot_run + 1 >= self.shot_repeat_limit {
            violations.push(Violation {
                kind: ViolationKind::ConsecutiveShot,
                severity: Severity::Hard,
                value: shot.to_string(),
                message: format!("'{}' would be used {} times in a row", shot, shot_run + 1),
            });
        } else if shot_run >= 1 {
            violations.push(Violation {
                kind: ViolationKind::ImmediateRepeat,
                severity: Severity::Soft,
                value: shot.to_string(),
                message: format!("'{}' repeats the previous shot", shot),
            });
        }

        let angle_run = trailing_run(&state.recent_angles, angle);
        if angle_run + 1 >= self.angle_stagnation_limit {
            violations.push(Violation {
                kind: ViolationKind::AngleStagnation,
                severity: Severity::Hard,
                value: angle.to_string(),
                message: format!("angle '{}' unchanged for {} beats", angle, angle_run + 1),
            });
        }

        let n = state.recent_shots.len();
        if n >= 2 && state.recent_shots[n - 2] == shot && state.recent_shots[n - 1] != shot {
            violations.push(Violation {
                kind: ViolationKind::Alternation,
                severity: Severity::Soft,
                value: shot.to_string(),
                message: format!(
                    "'{}' / '{}' / '{}' alternates",
                    shot,
                    state.recent_shots[n - 1],
                    shot
                ),
            });
        }

        violations
    }

    /// Replace values that break a hard rule with the first alternative the
    /// vocabulary offers. With no alternative the proposal stands.
    pub fn enforce(
        &self,
        state: &SceneVarietyState,
        shot: &str,
        angle: &str,
        vocab: &dyn VocabularyLookup,
    ) -> Enforcement {
        let violations = self.check_violations(state, shot, angle);
        let mut final_shot = shot.to_string();
        let mut final_angle = angle.to_string();
        let mut unresolved = Vec::new();
        let mut reasons = Vec::new();

        for violation in violations.iter().filter(|v| v.is_hard()) {
            let (category, window, target) = match violation.kind {
                ViolationKind::ConsecutiveShot => {
                    (VocabCategory::ShotType, &state.recent_shots, &mut final_shot)
                }
                ViolationKind::AngleStagnation => {
                    (VocabCategory::CameraAngle, &state.recent_angles, &mut final_angle)
                }
                _ => continue,
            };

            match vocab.alternatives(category, &violation.value, window).into_iter().next() {
                Some(replacement) => {
                    debug!(
                        from = %violation.value,
                        to = %replacement,
                        "variety: {}",
                        violation.message
                    );
                    reasons.push(format!("{}; using '{}'", violation.message, replacement));
                    *target = replacement;
                }
                None => {
                    warn!(
                        value = %violation.value,
                        "variety: no alternative available, keeping proposal ({})",
                        violation.message
                    );
                    unresolved.push(violation.kind);
                }
            }
        }

        Enforcement {
            proposed_shot: shot.to_string(),
            proposed_angle: angle.to_string(),
            shot: final_shot,
            angle: final_angle,
            violations,
            unresolved,
            reason: if reasons.is_empty() {
                None
            } else {
                Some(reasons.join("; "))
            },
        }
    }

    /// Record the final shot/angle of a beat.
    pub fn advance(&self, state: SceneVarietyState, shot: &str, angle: &str) -> SceneVarietyState {
        let SceneVarietyState {
            mut recent_shots,
            mut recent_angles,
            beat_count,
            consecutive_same_shot,
            consecutive_same_angle,
        } = state;

        let consecutive_same_shot = next_run(recent_shots.last(), shot, consecutive_same_shot);
        let consecutive_same_angle = next_run(recent_angles.last(), angle, consecutive_same_angle);

        push_window(&mut recent_shots, shot);
        push_window(&mut recent_angles, angle);

        SceneVarietyState {
            recent_shots,
            recent_angles,
            beat_count: beat_count + 1,
            consecutive_same_shot,
            consecutive_same_angle,
        }
    }
}

/// How many of the newest window entries equal `value`.
fn trailing_run(window: &[String], value: &str) -> usize {
    window.iter().rev().take_while(|v| *v == value).count()
}

fn next_run(previous: Option<&String>, value: &str, run: u32) -> u32 {
    match previous {
        Some(prev) if prev == value => run + 1,
        _ => 1,
    }
}

fn push_window(window: &mut Vec<String>, value: &str) {
    window.push(value.to_string());
    if window.len() > WINDOW {
        let overflow = window.len() - WINDOW;
        window.drain(..overflow);
    }
}
