use crate::{
    core::{
        constants::{MAX_MAP_PIXELS, ZOOM_TO_AREA_FILL},
        geo::{LatLng, LatLngBounds, Point},
    },
    tiles::TileSource,
};
use serde::{Deserialize, Serialize};

/// Pixel state of the view over the tiled map.
///
/// Map pixels count from the top-left corner of the whole map at the current
/// level; view pixels count from the top-left corner of the view. The two are
/// related by `view_offset_*`, the map pixel shown at view `(0, 0)`. When the
/// map is narrower (or shorter) than the view the offset goes negative and the
/// map is centred, leaving a margin on both sides.
///
/// The viewport does not own the tile source; every operation that needs the
/// projection borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub view_width: i32,
    pub view_height: i32,
    pub map_width: i32,
    pub map_height: i32,
    pub view_offset_x: i32,
    pub view_offset_y: i32,
    pub max_x_offset: i32,
    pub max_y_offset: i32,
    pub tile_width: i32,
    pub tile_height: i32,
    pub num_tiles_x: u32,
    pub num_tiles_y: u32,
    /// World extent of the whole map
    pub map_extent: LatLngBounds,
    /// World extent currently in view, padded by one tile at the bottom-right
    pub view_extent: LatLngBounds,
}

/// Which tiles are visible and where the first one lands in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub col_start: u32,
    pub col_stop: u32,
    pub row_start: u32,
    pub row_stop: u32,
    /// View pixel of the top-left corner of tile `(col_start, row_start)`
    pub origin_x: i32,
    pub origin_y: i32,
    pub tile_width: i32,
    pub tile_height: i32,
}

impl TileLayout {
    /// Visible tiles as `(column, row, view position of top-left corner)`
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32, Point)> + '_ {
        (self.col_start..self.col_stop).flat_map(move |x| {
            (self.row_start..self.row_stop).map(move |y| {
                let px = self.origin_x + (x - self.col_start) as i32 * self.tile_width;
                let py = self.origin_y + (y - self.row_start) as i32 * self.tile_height;
                (x, y, Point::new(px as f64, py as f64))
            })
        })
    }

    pub fn len(&self) -> usize {
        (self.col_stop.saturating_sub(self.col_start) * self.row_stop.saturating_sub(self.row_start))
            as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Viewport {
    /// Creates a viewport showing `level` of `source`, centred on the map.
    ///
    /// The caller is responsible for `level` being a level the source serves
    /// within [`MAX_MAP_PIXELS`]; larger maps are cut to that size.
    pub fn new<S: TileSource + ?Sized>(
        source: &mut S,
        view_size: (u32, u32),
        min_level: u8,
        max_level: u8,
        level: u8,
    ) -> Self {
        let extent = source.extent();
        let mut viewport = Self {
            level,
            min_level,
            max_level,
            view_width: view_size.0.max(1) as i32,
            view_height: view_size.1.max(1) as i32,
            map_width: 0,
            map_height: 0,
            view_offset_x: 0,
            view_offset_y: 0,
            max_x_offset: 0,
            max_y_offset: 0,
            tile_width: 1,
            tile_height: 1,
            num_tiles_x: 0,
            num_tiles_y: 0,
            map_extent: extent.clone(),
            view_extent: extent,
        };

        source.use_level(level);
        let limit = MAX_MAP_PIXELS as i32;
        let size = Self::map_size(source).unwrap_or((limit, limit));
        viewport.apply_level(source, level, size);
        viewport.view_offset_x = (viewport.map_width - viewport.view_width) / 2;
        viewport.view_offset_y = (viewport.map_height - viewport.view_height) / 2;
        viewport.clamp_offsets();
        viewport.recompute_view_extent(source);
        viewport
    }

    /// Map size in pixels at the source's current level, or `None` when it
    /// is larger than [`MAX_MAP_PIXELS`] in either direction
    pub fn map_size<S: TileSource + ?Sized>(source: &S) -> Option<(i32, i32)> {
        let (tile_width, tile_height) = source.tile_size();
        let (num_tiles_x, num_tiles_y) = source.num_tiles();
        let width = u64::from(num_tiles_x) * u64::from(tile_width.max(1));
        let height = u64::from(num_tiles_y) * u64::from(tile_height.max(1));
        (width <= MAX_MAP_PIXELS && height <= MAX_MAP_PIXELS)
            .then(|| (width as i32, height as i32))
    }

    fn apply_level<S: TileSource + ?Sized>(&mut self, source: &S, level: u8, size: (i32, i32)) {
        let (tile_width, tile_height) = source.tile_size();
        let (num_tiles_x, num_tiles_y) = source.num_tiles();

        self.level = level;
        self.tile_width = tile_width.max(1) as i32;
        self.tile_height = tile_height.max(1) as i32;
        self.num_tiles_x = num_tiles_x;
        self.num_tiles_y = num_tiles_y;
        (self.map_width, self.map_height) = size;
        self.map_extent = source.extent();
    }

    pub fn view_offset(&self) -> Point {
        Point::new(self.view_offset_x as f64, self.view_offset_y as f64)
    }

    pub fn view_center(&self) -> Point {
        Point::new(
            (self.view_width / 2) as f64,
            (self.view_height / 2) as f64,
        )
    }

    // Conversions

    pub fn geo_to_map_pixel<S: TileSource + ?Sized>(&self, source: &S, geo: LatLng) -> Point {
        let tile = source.geo_to_tile(geo);
        Point::new(
            tile.x * self.tile_width as f64,
            tile.y * self.tile_height as f64,
        )
    }

    pub fn map_pixel_to_geo<S: TileSource + ?Sized>(&self, source: &S, map: Point) -> LatLng {
        source.tile_to_geo(Point::new(
            map.x / self.tile_width as f64,
            map.y / self.tile_height as f64,
        ))
    }

    pub fn map_pixel_to_view(&self, map: Point) -> Point {
        map.subtract(&self.view_offset())
    }

    pub fn view_to_map_pixel(&self, view: Point) -> Point {
        view.add(&self.view_offset())
    }

    pub fn view_to_geo<S: TileSource + ?Sized>(&self, source: &S, view: Point) -> LatLng {
        self.map_pixel_to_geo(source, self.view_to_map_pixel(view))
    }

    pub fn geo_to_view<S: TileSource + ?Sized>(&self, source: &S, geo: LatLng) -> Point {
        self.map_pixel_to_view(self.geo_to_map_pixel(source, geo))
    }

    /// Like [`Viewport::geo_to_view`], but `None` outside the view extent
    pub fn geo_to_view_masked<S: TileSource + ?Sized>(
        &self,
        source: &S,
        geo: LatLng,
    ) -> Option<Point> {
        self.view_extent
            .contains(&geo)
            .then(|| self.geo_to_view(source, geo))
    }

    /// Recomputes `view_extent` from the current offsets and view size.
    pub fn recompute_view_extent<S: TileSource + ?Sized>(&mut self, source: &S) {
        let top_left = self.map_pixel_to_geo(source, self.view_offset());
        let bottom_right = self.map_pixel_to_geo(
            source,
            Point::new(
                (self.view_offset_x + self.view_width + self.tile_width) as f64,
                (self.view_offset_y + self.view_height + self.tile_height) as f64,
            ),
        );
        self.view_extent = LatLngBounds::from_corners(top_left, bottom_right);
    }

    // State changes

    /// Re-establishes the offset invariant for the current map and view size.
    pub fn clamp_offsets(&mut self) {
        self.max_x_offset = self.map_width - self.view_width;
        self.view_offset_x = if self.map_width > self.view_width {
            self.view_offset_x.clamp(0, self.max_x_offset)
        } else {
            self.max_x_offset / 2
        };

        self.max_y_offset = self.map_height - self.view_height;
        self.view_offset_y = if self.map_height > self.view_height {
            self.view_offset_y.clamp(0, self.max_y_offset)
        } else {
            self.max_y_offset / 2
        };
    }

    /// Switches level keeping the map point at the view centre in place.
    ///
    /// Returns false, leaving everything untouched, if `level` is outside the
    /// allowed range or the source refuses it.
    pub fn zoom_to<S: TileSource + ?Sized>(&mut self, source: &mut S, level: u8) -> bool {
        let anchor = self.view_center();
        self.zoom_about(source, level, anchor)
    }

    /// Switches level so the map point under `anchor` becomes the new view centre.
    pub fn zoom_about<S: TileSource + ?Sized>(
        &mut self,
        source: &mut S,
        level: u8,
        anchor: Point,
    ) -> bool {
        if level < self.min_level || level > self.max_level {
            log::debug!(
                "level {} outside [{}, {}]",
                level,
                self.min_level,
                self.max_level
            );
            return false;
        }
        if !source.use_level(level) {
            log::warn!("tile source refused level {}", level);
            return false;
        }
        let Some(size) = Self::map_size(source) else {
            log::warn!("level {} is too large to show", level);
            source.use_level(self.level);
            return false;
        };

        let anchor_x = self.view_offset_x as i64 + anchor.x as i64;
        let anchor_y = self.view_offset_y as i64 + anchor.y as i64;
        let (old_width, old_height) = (self.map_width.max(1) as i64, self.map_height.max(1) as i64);

        self.apply_level(source, level, size);

        let centre_x = anchor_x * self.map_width as i64 / old_width;
        let centre_y = anchor_y * self.map_height as i64 / old_height;
        self.view_offset_x = (centre_x - (self.view_width / 2) as i64) as i32;
        self.view_offset_y = (centre_y - (self.view_height / 2) as i64) as i32;

        self.clamp_offsets();
        self.recompute_view_extent(source);
        log::debug!(
            "level {} map {}x{} offset ({}, {})",
            level,
            self.map_width,
            self.map_height,
            self.view_offset_x,
            self.view_offset_y
        );
        true
    }

    /// New view size in pixels; zero sizes are treated as one pixel.
    pub fn resize<S: TileSource + ?Sized>(&mut self, source: &S, width: u32, height: u32) {
        self.view_width = width.max(1) as i32;
        self.view_height = height.max(1) as i32;
        self.clamp_offsets();
        self.recompute_view_extent(source);
    }

    /// Moves the view over the map by `(dx, dy)` map pixels.
    pub fn pan<S: TileSource + ?Sized>(&mut self, source: &S, dx: f64, dy: f64) {
        self.view_offset_x = self.view_offset_x.saturating_add(dx.round() as i32);
        self.view_offset_y = self.view_offset_y.saturating_add(dy.round() as i32);
        self.clamp_offsets();
        self.recompute_view_extent(source);
    }

    /// Centres the view on `geo` at the current level.
    pub fn goto_position<S: TileSource + ?Sized>(&mut self, source: &S, geo: LatLng) {
        let tile = source.geo_to_tile(geo);
        let centre_x = (tile.x * self.tile_width as f64) as i32;
        let centre_y = (tile.y * self.tile_height as f64) as i32;
        self.view_offset_x = centre_x - self.view_width / 2;
        self.view_offset_y = centre_y - self.view_height / 2;
        self.clamp_offsets();
        self.recompute_view_extent(source);
    }

    /// Zooms to `level` and centres on `geo`; false if the level is refused.
    pub fn goto_level_and_position<S: TileSource + ?Sized>(
        &mut self,
        source: &mut S,
        level: u8,
        geo: LatLng,
    ) -> bool {
        if !self.zoom_to(source, level) {
            return false;
        }
        self.goto_position(source, geo);
        true
    }

    /// Lowest allowed level at which an area of `size` world units fills at
    /// least half the view width or height. Falls back to the highest level.
    pub fn level_for_area<S: TileSource + ?Sized>(&self, source: &mut S, size: (f64, f64)) -> u8 {
        let (area_width, area_height) = size;
        let span = source.extent().span();
        let (tile_width, tile_height) = source.tile_size();

        let levels: Vec<u8> = source
            .levels()
            .into_iter()
            .filter(|l| *l >= self.min_level && *l <= self.max_level)
            .collect();

        let mut chosen = self.level;
        for level in levels {
            if !source.use_level(level) || Self::map_size(source).is_none() {
                continue;
            }
            chosen = level;
            let (num_x, num_y) = source.num_tiles();
            let ppd_x = num_x as f64 * tile_width as f64 / span.lng.abs();
            let ppd_y = num_y as f64 * tile_height as f64 / span.lat.abs();
            let view_span_x = self.view_width as f64 / ppd_x;
            let view_span_y = self.view_height as f64 / ppd_y;

            if area_width >= view_span_x * ZOOM_TO_AREA_FILL
                || area_height >= view_span_y * ZOOM_TO_AREA_FILL
            {
                break;
            }
        }

        source.use_level(self.level);
        chosen
    }

    /// False when `view` falls in the margin around a map smaller than the view.
    ///
    /// The map covers view pixels `[-offset, map_size - offset)` on each axis.
    pub fn position_is_on_map(&self, view: Point) -> bool {
        if self.view_offset_x < 0 {
            let left = -self.view_offset_x as f64;
            let right = (self.map_width - self.view_offset_x) as f64;
            if view.x < left || view.x >= right {
                return false;
            }
        }
        if self.view_offset_y < 0 {
            let top = -self.view_offset_y as f64;
            let bottom = (self.map_height - self.view_offset_y) as f64;
            if view.y < top || view.y >= bottom {
                return false;
            }
        }
        true
    }

    /// Tiles needed to cover the view at the current offsets
    pub fn tile_layout(&self) -> TileLayout {
        let (col_start, col_stop, origin_x) = Self::axis_layout(
            self.view_offset_x,
            self.view_width,
            self.tile_width,
            self.num_tiles_x,
        );
        let (row_start, row_stop, origin_y) = Self::axis_layout(
            self.view_offset_y,
            self.view_height,
            self.tile_height,
            self.num_tiles_y,
        );

        TileLayout {
            col_start,
            col_stop,
            row_start,
            row_stop,
            origin_x,
            origin_y,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
        }
    }

    fn axis_layout(offset: i32, view: i32, tile: i32, count: u32) -> (u32, u32, i32) {
        if offset < 0 {
            return (0, count, -offset);
        }
        let start = (offset / tile) as u32;
        let stop = ((offset + view + tile - 1) / tile) as u32;
        let stop = stop.min(count);
        (start.min(stop), stop, start as i32 * tile - offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{GridTileSource, WebMercatorSource};

    // 100px tiles over a 0..1000 square world: at level 1, 1 map pixel = 5 units.
    fn fixture(view: (u32, u32), level: u8) -> (GridTileSource, Viewport) {
        let mut source =
            GridTileSource::new(0, 4, LatLngBounds::from_extent(0.0, 1000.0, 0.0, 1000.0))
                .with_tile_size(100, 100);
        let viewport = Viewport::new(&mut source, view, 0, 4, level);
        (source, viewport)
    }

    #[test]
    fn test_map_smaller_than_view_is_centred() {
        let (_, viewport) = fixture((300, 200), 0);
        assert_eq!(viewport.map_width, 100);
        assert_eq!(viewport.view_offset_x, -100);
        assert_eq!(viewport.view_offset_y, -50);
        assert!(!viewport.position_is_on_map(Point::new(50.0, 100.0)));
        assert!(viewport.position_is_on_map(Point::new(150.0, 100.0)));
        assert!(!viewport.position_is_on_map(Point::new(150.0, 160.0)));
    }

    #[test]
    fn test_odd_margin_right_edge_is_off_map() {
        let (_, viewport) = fixture((301, 200), 0);
        assert_eq!(viewport.view_offset_x, -100);

        assert!(viewport.position_is_on_map(Point::new(100.0, 100.0)));
        assert!(viewport.position_is_on_map(Point::new(199.5, 149.5)));
        for x in [99.5, 200.0, 200.5, 201.0] {
            assert!(!viewport.position_is_on_map(Point::new(x, 100.0)), "x = {}", x);
        }
        assert!(!viewport.position_is_on_map(Point::new(150.0, 150.0)));
    }

    #[test]
    fn test_levels_beyond_pixel_limit_are_refused() {
        let mut source = WebMercatorSource::new(0, 23);
        let mut viewport = Viewport::new(&mut source, (256, 256), 0, 23, 0);

        assert!(viewport.zoom_to(&mut source, 22));
        assert_eq!(viewport.map_width, 1 << 30);
        let before = viewport.clone();

        assert!(!viewport.zoom_to(&mut source, 23));
        assert_eq!(viewport, before);
        assert_eq!(source.num_tiles(), (1 << 22, 1 << 22));
        assert_eq!(viewport.level_for_area(&mut source, (1e-9, 1e-9)), 22);
    }

    #[test]
    fn test_round_trip_geo_view() {
        let (source, mut viewport) = fixture((150, 150), 2);
        viewport.pan(&source, 37.0, 91.0);

        let geo = LatLng::from_xy(432.0, 611.0);
        let view = viewport.geo_to_view(&source, geo);
        let map = viewport.view_to_map_pixel(view);
        let back = viewport.map_pixel_to_geo(&source, map);

        // one map pixel is 2.5 units at level 2
        assert!((back.lng - geo.lng).abs() <= 2.5);
        assert!((back.lat - geo.lat).abs() <= 2.5);
    }

    #[test]
    fn test_pan_clamps_every_step() {
        let (source, mut viewport) = fixture((150, 120), 2);
        let deltas = [
            (500.0, 0.0),
            (-1000.0, 40.0),
            (30.0, 30.0),
            (0.0, 900.0),
            (-12.0, -7.0),
        ];
        for (dx, dy) in deltas {
            viewport.pan(&source, dx, dy);
            assert!(viewport.view_offset_x >= 0);
            assert!(viewport.view_offset_x <= viewport.max_x_offset);
            assert!(viewport.view_offset_y >= 0);
            assert!(viewport.view_offset_y <= viewport.max_y_offset);
        }
        assert_eq!(viewport.max_x_offset, 400 - 150);
    }

    #[test]
    fn test_zoom_out_of_range_is_noop() {
        let (mut source, mut viewport) = fixture((150, 150), 2);
        let before = viewport.clone();
        assert!(!viewport.zoom_to(&mut source, 5));
        assert_eq!(viewport, before);
        assert_eq!(source.level(), 2);
    }

    #[test]
    fn test_zoom_keeps_centre() {
        let (mut source, mut viewport) = fixture((100, 100), 2);
        viewport.goto_position(&source, LatLng::from_xy(500.0, 500.0));
        assert_eq!(viewport.view_offset_x, 150);

        assert!(viewport.zoom_to(&mut source, 3));
        assert_eq!(viewport.map_width, 800);
        assert_eq!(viewport.view_offset_x, 350);
        let centre = viewport.view_to_geo(&source, viewport.view_center());
        assert_eq!(centre, LatLng::from_xy(500.0, 500.0));
    }

    #[test]
    fn test_zoom_about_anchor_becomes_centre() {
        let (mut source, mut viewport) = fixture((100, 100), 2);
        viewport.pan(&source, 100.0, 100.0);
        let anchor = Point::new(20.0, 80.0);
        let geo = viewport.view_to_geo(&source, anchor);

        assert!(viewport.zoom_about(&mut source, 3, anchor));
        let centre = viewport.view_to_geo(&source, viewport.view_center());
        assert_eq!(centre, geo);
    }

    #[test]
    fn test_view_extent_and_mask() {
        let (source, mut viewport) = fixture((100, 100), 2);
        viewport.goto_position(&source, LatLng::from_xy(500.0, 500.0));

        // view covers map pixels 150..250, padded by one 100px tile
        assert_eq!(viewport.view_extent.left(), 375.0);
        assert_eq!(viewport.view_extent.right(), 375.0 + 200.0 * 2.5);
        assert_eq!(viewport.view_extent.top(), 625.0);

        assert!(viewport
            .geo_to_view_masked(&source, LatLng::from_xy(500.0, 500.0))
            .is_some());
        assert!(viewport
            .geo_to_view_masked(&source, LatLng::from_xy(100.0, 500.0))
            .is_none());
    }

    #[test]
    fn test_tile_layout() {
        let (source, mut viewport) = fixture((150, 150), 2);
        // starts centred at (125, 125)
        viewport.pan(&source, 5.0, -125.0);
        let layout = viewport.tile_layout();
        assert_eq!((layout.col_start, layout.col_stop), (1, 3));
        assert_eq!(layout.origin_x, -30);
        assert_eq!((layout.row_start, layout.row_stop), (0, 2));

        let first = layout.tiles().next().unwrap();
        assert_eq!(first, (1, 0, Point::new(-30.0, 0.0)));
        assert_eq!(layout.len(), 4);

        let (_, small) = fixture((300, 200), 0);
        let layout = small.tile_layout();
        assert_eq!(layout.len(), 1);
        assert_eq!((layout.origin_x, layout.origin_y), (100, 50));
    }

    #[test]
    fn test_resize_recentres_small_map() {
        let (source, mut viewport) = fixture((100, 100), 1);
        viewport.pan(&source, 50.0, 50.0);
        viewport.resize(&source, 400, 0);
        assert_eq!(viewport.view_height, 1);
        assert_eq!(viewport.view_offset_x, -100);
        assert!(viewport.view_offset_y >= 0);
    }

    #[test]
    fn test_level_for_area() {
        let (mut source, viewport) = fixture((100, 100), 0);
        // level 0 view spans 1000 units, level 2 spans 250
        assert_eq!(viewport.level_for_area(&mut source, (500.0, 10.0)), 0);
        assert_eq!(viewport.level_for_area(&mut source, (130.0, 0.0)), 2);
        assert_eq!(viewport.level_for_area(&mut source, (1.0, 1.0)), 4);
        assert_eq!(source.level(), 0);
    }
}
