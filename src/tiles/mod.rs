pub mod grid;
pub mod mercator;
pub mod source;

// Re-exports for convenience
pub use grid::GridTileSource;
pub use mercator::WebMercatorSource;
pub use source::{TileAvailableCallback, TileSource};
