//! Map builder for fluent configuration
//!
//! Collects a tile source and a [`MapConfig`] and checks them together when
//! the map is built.

use crate::{
    core::{config::MapConfig, map::SlippyMap},
    tiles::TileSource,
    MapError, Result,
};

/// Builder for creating and configuring [`SlippyMap`] instances
pub struct MapBuilder<S: TileSource> {
    /// Tile source the map draws and projects with
    source: Option<S>,
    config: MapConfig,
}

impl<S: TileSource> MapBuilder<S> {
    /// Create a new MapBuilder with default settings
    pub fn new() -> Self {
        Self {
            source: None,
            config: MapConfig::default(),
        }
    }

    pub fn with_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// Replaces the whole configuration
    pub fn with_config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_view_size(mut self, width: u32, height: u32) -> Self {
        self.config.view_size = (width, height);
        self
    }

    /// Limit zooming to `min..=max`
    pub fn with_levels(mut self, min: u8, max: u8) -> Self {
        self.config.min_level = Some(min);
        self.config.max_level = Some(max);
        self
    }

    pub fn with_start_level(mut self, level: u8) -> Self {
        self.config.start_level = Some(level);
        self
    }

    /// Selection delta for layers that do not set their own
    pub fn with_selection_delta(mut self, delta: f64) -> Self {
        self.config.selection_delta = delta;
        self
    }

    pub fn with_level_change_events(mut self, enabled: bool) -> Self {
        self.config.level_change_events = enabled;
        self
    }

    pub fn with_position_events(mut self, enabled: bool) -> Self {
        self.config.position_events = enabled;
        self
    }

    /// Build the map
    pub fn build(self) -> Result<SlippyMap<S>> {
        let source = self
            .source
            .ok_or_else(|| MapError::InvalidConfig("no tile source given".to_string()))?;
        SlippyMap::new(source, self.config)
    }
}

impl<S: TileSource> Default for MapBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::LatLngBounds, tiles::GridTileSource};

    fn source() -> GridTileSource {
        GridTileSource::new(0, 5, LatLngBounds::from_extent(0.0, 10.0, 0.0, 10.0))
    }

    #[test]
    fn test_builder_applies_settings() {
        let map = MapBuilder::new()
            .with_source(source())
            .with_view_size(640, 480)
            .with_levels(1, 4)
            .with_start_level(3)
            .with_selection_delta(8.0)
            .with_position_events(false)
            .build()
            .unwrap();

        assert_eq!(map.level(), 3);
        assert_eq!(map.viewport().min_level, 1);
        assert_eq!(map.viewport().max_level, 4);
        assert_eq!(map.viewport().view_width, 640);
        assert!(!map.config().position_events);
    }

    #[test]
    fn test_builder_without_source_fails() {
        let result = MapBuilder::<GridTileSource>::new().build();
        assert!(matches!(result, Err(MapError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_bad_start_level() {
        let result = MapBuilder::new()
            .with_source(source())
            .with_levels(0, 2)
            .with_start_level(4)
            .build();
        assert!(result.is_err());
    }
}
