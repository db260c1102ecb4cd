use crate::{
    core::constants::DEFAULT_SELECTION_DELTA,
    layers::{entity::LayerEntities, placement::ReferenceFrame},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Registry-assigned layer identifier. Zero never names a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Point,
    Image,
    Polygon,
    Text,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Point => write!(f, "point"),
            LayerKind::Image => write!(f, "image"),
            LayerKind::Polygon => write!(f, "polygon"),
            LayerKind::Text => write!(f, "text"),
        }
    }
}

/// How a new layer behaves; everything except the entities.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptions {
    pub frame: ReferenceFrame,
    pub visible: bool,
    /// Levels the layer draws at; `None` means every allowed level
    pub show_levels: Option<BTreeSet<u8>>,
    pub selectable: bool,
    pub name: String,
    /// Selection distance in pixels; `None` takes the map default
    pub selection_delta: Option<f64>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            frame: ReferenceFrame::Map,
            visible: true,
            show_levels: None,
            selectable: false,
            name: "<no name given>".to_string(),
            selection_delta: None,
        }
    }
}

impl LayerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_relative() -> Self {
        Self::default()
    }

    pub fn view_relative() -> Self {
        Self::default().with_frame(ReferenceFrame::View)
    }

    pub fn with_frame(mut self, frame: ReferenceFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_show_levels(mut self, levels: impl IntoIterator<Item = u8>) -> Self {
        self.show_levels = Some(levels.into_iter().collect());
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_selection_delta(mut self, delta: f64) -> Self {
        self.selection_delta = Some(delta);
        self
    }
}

/// A registered layer
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub frame: ReferenceFrame,
    pub visible: bool,
    pub selectable: bool,
    pub show_levels: BTreeSet<u8>,
    pub selection_delta: f64,
    pub entities: LayerEntities,
}

impl Layer {
    /// Builds a layer, filling unset options from the allowed level range
    pub fn new(
        id: LayerId,
        entities: LayerEntities,
        options: LayerOptions,
        levels: (u8, u8),
    ) -> Self {
        let show_levels = options
            .show_levels
            .unwrap_or_else(|| (levels.0..=levels.1).collect());

        Self {
            id,
            name: options.name,
            frame: options.frame,
            visible: options.visible,
            selectable: options.selectable,
            show_levels,
            selection_delta: options.selection_delta.unwrap_or(DEFAULT_SELECTION_DELTA),
            entities,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.entities.kind()
    }

    pub fn shows_at(&self, level: u8) -> bool {
        self.show_levels.contains(&level)
    }

    /// Visible and selectable: the only layers hit-testing looks at
    pub fn is_hit_testable(&self) -> bool {
        self.visible && self.selectable
    }
}
