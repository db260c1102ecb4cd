use crate::{
    core::{bounds::Bounds, geo::Point},
    layers::{
        entity::ImageHandle,
        style::{Colour, FontSpec},
    },
};

/// One drawing instruction in view pixels.
///
/// `T` is the tile source's drawable handle.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand<T> {
    /// Blit a tile with its top-left corner at `origin`
    Tile { tile: T, origin: Point },
    Circle {
        center: Point,
        radius: f64,
        colour: Colour,
    },
    /// Blit a host bitmap with its top-left corner at `origin`
    Bitmap { image: ImageHandle, origin: Point },
    /// Open outline
    Polyline {
        points: Vec<Point>,
        width: f64,
        colour: Colour,
    },
    /// Closed outline, optionally filled
    Polygon {
        points: Vec<Point>,
        width: f64,
        colour: Colour,
        fill: Option<Colour>,
    },
    /// Text with its top-left corner at `origin`
    Text {
        text: String,
        origin: Point,
        colour: Colour,
        font: FontSpec,
    },
    /// Rubber-band selection rectangle
    SelectionBox { bounds: Bounds },
}

impl<T> DrawCommand<T> {
    pub fn is_tile(&self) -> bool {
        matches!(self, DrawCommand::Tile { .. })
    }
}
