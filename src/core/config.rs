/// Planner tuning, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::variety::WINDOW;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}

/// Knobs for the variety and scene-state trackers. Missing fields in a RON
/// file take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Identical shots allowed in a row, counting the proposed beat, before
    /// the next one is replaced.
    pub shot_repeat_limit: usize,
    /// Beats an angle may hold, counting the proposed beat, before it must change.
    pub angle_stagnation_limit: usize,
    /// Leading beats scanned to seed the vehicle's motion state.
    pub motion_scan_beats: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            shot_repeat_limit: 3,
            angle_stagnation_limit: 3,
            motion_scan_beats: 5,
        }
    }
}

impl PlannerConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Repeat limits are checked against a window of [`WINDOW`] beats, so
    /// they must lie in `2..=WINDOW + 1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("shot_repeat_limit", self.shot_repeat_limit, 2, WINDOW + 1)?;
        check_range("angle_stagnation_limit", self.angle_stagnation_limit, 2, WINDOW + 1)?;
        check_range("motion_scan_beats", self.motion_scan_beats, 1, usize::MAX)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
