//! Prelude module for common slippy types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use slippy::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    builder::MapBuilder,
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{SlippyMap, ZoomDirection},
    viewport::{TileLayout, Viewport},
};

pub use crate::layers::{
    base::{Layer, LayerId, LayerKind, LayerOptions},
    entity::{ImageEntity, ImageHandle, LayerEntities, PointEntity, PolygonEntity, TextEntity},
    hit_test::Selection,
    manager::LayerRegistry,
    placement::{Placement, PlacementInput, PrimitiveFamily, ReferenceFrame},
    style::{Colour, FontSpec},
};

pub use crate::input::{
    events::{
        BoxSelect, EventKind, EventManager, InputEvent, KeyModifiers, MapEvent, MouseButton,
        PointSelect,
    },
    handler::{Action, InputHandler},
};

pub use crate::rendering::{
    commands::DrawCommand,
    context::{FixedWidthMeasurer, RenderContext, TextMeasurer},
};

pub use crate::tiles::{GridTileSource, TileAvailableCallback, TileSource, WebMercatorSource};

pub use crate::{Error as MapError, Result};

pub use std::{collections::VecDeque, sync::Arc};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
