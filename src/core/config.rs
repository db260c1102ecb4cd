//! Map configuration
//!
//! Everything here has a default, so a config file only needs the keys it
//! wants to change. Level limits left unset are taken from the tile source.

use crate::{
    core::constants::{DEFAULT_SELECTION_DELTA, DEFAULT_VIEW_SIZE},
    tiles::TileSource,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Level shown first; defaults to the lowest allowed level
    pub start_level: Option<u8>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    /// Initial view size in pixels, until the host reports a resize
    pub view_size: (u32, u32),
    /// Selection delta for layers that do not set one
    pub selection_delta: f64,
    /// Emit `LevelChange` events
    pub level_change_events: bool,
    /// Emit `PositionChange` events on pointer movement
    pub position_events: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            start_level: None,
            min_level: None,
            max_level: None,
            view_size: DEFAULT_VIEW_SIZE,
            selection_delta: DEFAULT_SELECTION_DELTA,
            level_change_events: true,
            position_events: true,
        }
    }
}

/// Level limits after merging a config with what a source serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    pub min: u8,
    pub max: u8,
    pub start: u8,
}

impl MapConfig {
    /// Parses a JSON config; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the config on its own terms
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_level, self.max_level) {
            if min > max {
                return Err(MapError::InvalidConfig(format!(
                    "min_level {} is above max_level {}",
                    min, max
                )));
            }
        }
        if !self.selection_delta.is_finite() || self.selection_delta < 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "selection_delta must be a non-negative number, got {}",
                self.selection_delta
            )));
        }
        Ok(())
    }

    /// Merges level limits with the levels `source` serves
    pub fn resolve_levels<S: TileSource + ?Sized>(&self, source: &S) -> Result<LevelRange> {
        self.validate()?;

        let levels = source.levels();
        let (first, last) = match (levels.first(), levels.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(MapError::InvalidConfig(
                    "tile source serves no levels".to_string(),
                ))
            }
        };

        let min = self.min_level.map_or(first, |l| l.max(first));
        let max = self.max_level.map_or(last, |l| l.min(last));
        if min > max {
            return Err(MapError::InvalidConfig(format!(
                "no level in [{:?}, {:?}] is served by the tile source",
                self.min_level, self.max_level
            )));
        }

        let start = self.start_level.unwrap_or(min);
        if start < min || start > max || !levels.contains(&start) {
            return Err(MapError::InvalidConfig(format!(
                "start level {} is not usable",
                start
            )));
        }

        Ok(LevelRange { min, max, start })
    }
}
