pub mod bounds;
pub mod builder;
pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod viewport;

pub use bounds::Bounds;
pub use builder::MapBuilder;
pub use config::{LevelRange, MapConfig};
pub use geo::{LatLng, LatLngBounds, Point, TileCoord};
pub use map::{SlippyMap, ZoomDirection};
pub use viewport::{TileLayout, Viewport};
