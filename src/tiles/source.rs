use crate::core::geo::{LatLng, LatLngBounds, Point};
use std::fmt::Debug;

/// Called with `(level, x, y)` once a tile that was not ready becomes drawable.
///
/// Sources may invoke it from any thread.
pub type TileAvailableCallback = Box<dyn Fn(u8, u32, u32) + Send + Sync>;

/// Everything the engine needs from a tile set.
///
/// Tile and world coordinates are related only through `geo_to_tile` and
/// `tile_to_geo`, so a source is free to use any projection. Tile coordinates
/// are fractional: `(2.5, 1.0)` is half way across the third column.
pub trait TileSource {
    /// Drawable handle handed back to the host in draw commands
    type Tile: Clone + Debug;

    /// Zoom levels the source can serve, ascending
    fn levels(&self) -> Vec<u8>;

    /// Tile width and height in pixels
    fn tile_size(&self) -> (u32, u32);

    /// Tile columns and rows at the current level
    fn num_tiles(&self) -> (u32, u32);

    /// World extent covered by the whole tile set
    fn extent(&self) -> LatLngBounds;

    /// Switches the current level. Returns false if the level is not served.
    fn use_level(&mut self, level: u8) -> bool;

    /// World coordinate to fractional tile coordinate at the current level
    fn geo_to_tile(&self, geo: LatLng) -> Point;

    /// Fractional tile coordinate at the current level to world coordinate
    fn tile_to_geo(&self, tile: Point) -> LatLng;

    /// Installs the tile-available notification
    fn set_available_callback(&mut self, callback: TileAvailableCallback);

    /// Drawable tile at column `x`, row `y` of the current level, if ready
    fn tile(&mut self, x: u32, y: u32) -> Option<Self::Tile>;
}
