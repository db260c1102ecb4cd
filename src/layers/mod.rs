pub mod base;
pub mod data;
pub mod entity;
pub mod hit_test;
pub mod manager;
pub mod placement;
pub mod style;

// Re-exports for convenience
pub use base::{Layer, LayerId, LayerKind, LayerOptions};
pub use entity::{
    ImageEntity, ImageHandle, LayerEntities, PointEntity, PolygonEntity, TextEntity, UserData,
};
pub use hit_test::{box_select, point_select, Selection};
pub use manager::LayerRegistry;
pub use placement::{Placement, PlacementInput, PrimitiveFamily, ReferenceFrame};
pub use style::{Colour, FontSpec};
