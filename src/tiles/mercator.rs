use crate::{
    core::{
        constants::TILE_SIZE,
        geo::{LatLng, LatLngBounds, Point, TileCoord},
    },
    tiles::source::{TileAvailableCallback, TileSource},
};

const MAX_LATITUDE: f64 = 85.0511287798;

/// OSM-style XYZ tile set in Web Mercator.
///
/// Tiles are plain [`TileCoord`] handles; fetching and decoding the images
/// behind [`WebMercatorSource::url`] is the host's job.
pub struct WebMercatorSource {
    min_level: u8,
    max_level: u8,
    level: u8,
    subdomains: Vec<&'static str>,
    callback: Option<TileAvailableCallback>,
}

impl WebMercatorSource {
    pub fn new(min_level: u8, max_level: u8) -> Self {
        Self {
            min_level,
            max_level: max_level.max(min_level),
            level: min_level,
            subdomains: vec!["a", "b", "c"],
            callback: None,
        }
    }

    /// Build a URL for the requested `coord`.
    pub fn url(&self, coord: TileCoord) -> String {
        if self.subdomains.is_empty() {
            return format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                coord.z, coord.x, coord.y
            );
        }

        let idx = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            self.subdomains[idx], coord.z, coord.x, coord.y
        )
    }

    /// Fires the tile-available callback once the host has the image
    pub fn notify_available(&self, level: u8, x: u32, y: u32) {
        if let Some(callback) = &self.callback {
            callback(level, x, y);
        }
    }
}

impl Default for WebMercatorSource {
    fn default() -> Self {
        Self::new(0, 18)
    }
}

impl TileSource for WebMercatorSource {
    type Tile = TileCoord;

    fn levels(&self) -> Vec<u8> {
        (self.min_level..=self.max_level).collect()
    }

    fn tile_size(&self) -> (u32, u32) {
        (TILE_SIZE, TILE_SIZE)
    }

    fn num_tiles(&self) -> (u32, u32) {
        let n = 1u32 << self.level.min(31);
        (n, n)
    }

    fn extent(&self) -> LatLngBounds {
        LatLngBounds::from_extent(-180.0, 180.0, -MAX_LATITUDE, MAX_LATITUDE)
    }

    fn use_level(&mut self, level: u8) -> bool {
        if level < self.min_level || level > self.max_level {
            return false;
        }
        self.level = level;
        true
    }

    fn geo_to_tile(&self, geo: LatLng) -> Point {
        TileCoord::fractional(&geo, self.level)
    }

    fn tile_to_geo(&self, tile: Point) -> LatLng {
        TileCoord::fractional_to_lat_lng(tile, self.level)
    }

    fn set_available_callback(&mut self, callback: TileAvailableCallback) {
        self.callback = Some(callback);
    }

    fn tile(&mut self, x: u32, y: u32) -> Option<TileCoord> {
        let coord = TileCoord::new(x, y, self.level);
        coord.is_valid().then_some(coord)
    }
}
