//! # Slippy
//!
//! A viewport, layer and hit-test engine for tiled "slippy" maps.
//!
//! The crate owns the coordinate machinery between geo, tile, map-pixel and
//! view-pixel space, a Z-ordered registry of point/image/polygon/text layers,
//! anchor-based placement of every drawn primitive, and the hit-testing that
//! turns clicks and drag boxes into selection events. Tile fetching and pixel
//! drawing stay with the host: tiles come from a [`TileSource`] and drawing is
//! described as a list of [`DrawCommand`]s.

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    builder::MapBuilder,
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::SlippyMap,
    viewport::Viewport,
};

pub use layers::{
    base::{LayerId, LayerKind, LayerOptions},
    entity::LayerEntities,
    manager::LayerRegistry,
    placement::{Placement, ReferenceFrame},
};

pub use input::{
    events::{InputEvent, MapEvent},
    handler::InputHandler,
};

pub use rendering::{commands::DrawCommand, context::RenderContext};

pub use tiles::{GridTileSource, TileSource, WebMercatorSource};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid layer data: {0}")]
    InvalidLayerData(String),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Invalid colour: {0}")]
    InvalidColour(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Error type alias for convenience
pub type Error = MapError;
