use crate::{
    core::{
        constants::TILE_SIZE,
        geo::{LatLng, LatLngBounds, Point, TileCoord},
    },
    prelude::HashSet,
    tiles::source::{TileAvailableCallback, TileSource},
};

/// Linear cartesian tile grid.
///
/// Level `n` holds `base_tiles << n` columns and rows spread evenly over the
/// extent, with row 0 at the top. The transform is exactly invertible, which
/// makes this source handy for non-geographic maps and for tests.
pub struct GridTileSource {
    min_level: u8,
    max_level: u8,
    level: u8,
    tile_size: (u32, u32),
    base_tiles: (u32, u32),
    extent: LatLngBounds,
    deferred: bool,
    loaded: HashSet<TileCoord>,
    pending: Vec<TileCoord>,
    callback: Option<TileAvailableCallback>,
}

impl GridTileSource {
    /// One base tile of `TILE_SIZE` pixels covering the whole extent
    pub fn new(min_level: u8, max_level: u8, extent: LatLngBounds) -> Self {
        Self {
            min_level,
            max_level: max_level.max(min_level),
            level: min_level,
            tile_size: (TILE_SIZE, TILE_SIZE),
            base_tiles: (1, 1),
            extent,
            deferred: false,
            loaded: HashSet::default(),
            pending: Vec::new(),
            callback: None,
        }
    }

    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_size = (width.max(1), height.max(1));
        self
    }

    /// Columns and rows at level 0
    pub fn with_base_tiles(mut self, columns: u32, rows: u32) -> Self {
        self.base_tiles = (columns.max(1), rows.max(1));
        self
    }

    /// Tiles become drawable only after [`GridTileSource::flush_pending`]
    pub fn with_deferred_loading(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Number of requested tiles still waiting to load
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Completes every outstanding request and fires the callback for each
    pub fn flush_pending(&mut self) {
        for coord in std::mem::take(&mut self.pending) {
            self.loaded.insert(coord);
            self.notify_available(coord.z, coord.x, coord.y);
        }
    }

    /// Fires the tile-available callback
    pub fn notify_available(&self, level: u8, x: u32, y: u32) {
        if let Some(callback) = &self.callback {
            callback(level, x, y);
        }
    }

    fn tiles_at(&self, level: u8) -> (u32, u32) {
        let scale = 1u32 << level.min(16);
        (
            self.base_tiles.0.saturating_mul(scale),
            self.base_tiles.1.saturating_mul(scale),
        )
    }
}

impl TileSource for GridTileSource {
    type Tile = TileCoord;

    fn levels(&self) -> Vec<u8> {
        (self.min_level..=self.max_level).collect()
    }

    fn tile_size(&self) -> (u32, u32) {
        self.tile_size
    }

    fn num_tiles(&self) -> (u32, u32) {
        self.tiles_at(self.level)
    }

    fn extent(&self) -> LatLngBounds {
        self.extent.clone()
    }

    fn use_level(&mut self, level: u8) -> bool {
        if level < self.min_level || level > self.max_level {
            return false;
        }
        self.level = level;
        true
    }

    fn geo_to_tile(&self, geo: LatLng) -> Point {
        let (columns, rows) = self.num_tiles();
        let span = self.extent.span();
        Point::new(
            (geo.lng - self.extent.left()) / span.lng * columns as f64,
            (self.extent.top() - geo.lat) / span.lat * rows as f64,
        )
    }

    fn tile_to_geo(&self, tile: Point) -> LatLng {
        let (columns, rows) = self.num_tiles();
        let span = self.extent.span();
        LatLng::new(
            self.extent.top() - tile.y / rows as f64 * span.lat,
            self.extent.left() + tile.x / columns as f64 * span.lng,
        )
    }

    fn set_available_callback(&mut self, callback: TileAvailableCallback) {
        self.callback = Some(callback);
    }

    fn tile(&mut self, x: u32, y: u32) -> Option<TileCoord> {
        let (columns, rows) = self.num_tiles();
        if x >= columns || y >= rows {
            return None;
        }

        let coord = TileCoord::new(x, y, self.level);
        if !self.deferred || self.loaded.contains(&coord) {
            return Some(coord);
        }

        if !self.pending.contains(&coord) {
            log::trace!("tile {:?} requested", coord);
            self.pending.push(coord);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn source() -> GridTileSource {
        GridTileSource::new(0, 3, LatLngBounds::from_extent(0.0, 100.0, 0.0, 100.0))
            .with_tile_size(100, 100)
    }

    #[test]
    fn test_levels_and_tile_counts() {
        let mut grid = source();
        assert_eq!(grid.levels(), vec![0, 1, 2, 3]);
        assert_eq!(grid.num_tiles(), (1, 1));
        assert!(grid.use_level(2));
        assert_eq!(grid.num_tiles(), (4, 4));
        assert!(!grid.use_level(4));
        assert_eq!(grid.level(), 2);
    }

    #[test]
    fn test_geo_tile_inverse() {
        let mut grid = source();
        grid.use_level(1);

        let tile = grid.geo_to_tile(LatLng::from_xy(25.0, 75.0));
        assert_eq!(tile, Point::new(0.5, 0.5));
        assert_eq!(grid.tile_to_geo(tile), LatLng::from_xy(25.0, 75.0));
        assert_eq!(grid.tile_to_geo(Point::new(0.0, 0.0)), LatLng::from_xy(0.0, 100.0));
    }

    #[test]
    fn test_deferred_tiles_notify() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut grid = source().with_deferred_loading(true);
        grid.set_available_callback(Box::new(move |level, x, y| {
            sink.lock().unwrap().push((level, x, y));
        }));

        assert_eq!(grid.tile(0, 0), None);
        assert_eq!(grid.tile(0, 0), None);
        assert_eq!(grid.pending(), 1);

        grid.flush_pending();
        assert_eq!(*seen.lock().unwrap(), vec![(0, 0, 0)]);
        assert_eq!(grid.tile(0, 0), Some(TileCoord::new(0, 0, 0)));
        assert_eq!(grid.tile(1, 0), None);
    }
}
