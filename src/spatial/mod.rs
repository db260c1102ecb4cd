pub mod nearest;
pub mod polygon;

pub use nearest::{nearest_within, within_bounds};
pub use polygon::{point_in_ring, ring_from_points};
