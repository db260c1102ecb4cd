//! Engine-wide defaults.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Pixel distance within which a click selects a point, text or image.
pub const DEFAULT_SELECTION_DELTA: f64 = 5.0;

/// First identifier handed out by the layer registry. Zero is never a layer.
pub const FIRST_LAYER_ID: u32 = 1;

/// Events kept for `take_events`; older ones are dropped first.
pub const MAX_QUEUED_EVENTS: usize = 1024;

/// Largest map width or height in pixels; deeper levels are refused.
pub const MAX_MAP_PIXELS: u64 = 1 << 30;

/// Initial view size used until the host reports a real one.
pub const DEFAULT_VIEW_SIZE: (u32, u32) = (400, 300);

/// Fraction of the view an area must fill before `zoom_to_area` stops.
pub const ZOOM_TO_AREA_FILL: f64 = 0.5;

/// Point marker defaults.
pub const POINT_RADIUS: f64 = 3.0;

/// Hotspot circle radius drawn under map-relative text.
pub const TEXT_MAP_RADIUS: f64 = 2.0;

/// Map-relative text sits slightly right of and below its hotspot.
pub const TEXT_MAP_OFFSET: (f64, f64) = (5.0, 1.0);

/// Default text font.
pub const DEFAULT_FONT: &str = "Arial";
pub const DEFAULT_FONT_SIZE: u32 = 9;

/// Polygon outline width.
pub const POLYGON_WIDTH: f64 = 1.0;
