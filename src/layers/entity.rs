//! Per-kind entity records held by layers.
//!
//! Hotspots are world coordinates (x = longitude, y = latitude) in map-frame
//! layers and view pixels in view-frame layers.

use crate::{
    core::{
        constants::{POINT_RADIUS, POLYGON_WIDTH, TEXT_MAP_OFFSET, TEXT_MAP_RADIUS},
        geo::{LatLng, Point},
    },
    layers::{
        base::LayerKind,
        placement::{Placement, ReferenceFrame},
        style::{Colour, FontSpec},
    },
    MapError, Result,
};
use geo_types::LineString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Caller payload carried through to selection events untouched
pub type UserData = Option<Arc<serde_json::Value>>;

/// Opaque identifier of a host-side bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PointEntity {
    pub position: Point,
    pub placement: Placement,
    pub radius: f64,
    pub colour: Colour,
    pub offset: Point,
    pub data: UserData,
}

impl PointEntity {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            placement: Placement::Nw,
            radius: POINT_RADIUS,
            colour: Colour::RED,
            offset: Point::default(),
            data: None,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_offset(mut self, x_off: f64, y_off: f64) -> Self {
        self.offset = Point::new(x_off, y_off);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(Arc::new(data));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntity {
    pub position: Point,
    pub image: ImageHandle,
    pub width: f64,
    pub height: f64,
    pub placement: Placement,
    pub offset: Point,
    pub data: UserData,
}

impl ImageEntity {
    pub fn new(x: f64, y: f64, image: ImageHandle, width: f64, height: f64) -> Self {
        Self {
            position: Point::new(x, y),
            image,
            width,
            height,
            placement: Placement::Cc,
            offset: Point::default(),
            data: None,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_offset(mut self, x_off: f64, y_off: f64) -> Self {
        self.offset = Point::new(x_off, y_off);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(Arc::new(data));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonEntity {
    pub outline: LineString<f64>,
    pub placement: Placement,
    pub width: f64,
    pub colour: Colour,
    pub closed: bool,
    pub filled: bool,
    pub fill_colour: Colour,
    pub offset: Point,
    pub data: UserData,
}

impl PolygonEntity {
    pub fn new(outline: impl Into<LineString<f64>>) -> Self {
        Self {
            outline: outline.into(),
            placement: Placement::Cc,
            width: POLYGON_WIDTH,
            colour: Colour::RED,
            closed: false,
            filled: false,
            fill_colour: Colour::BLUE,
            offset: Point::default(),
            data: None,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    pub fn with_fill(mut self, fill_colour: Colour) -> Self {
        self.filled = true;
        self.fill_colour = fill_colour;
        self
    }

    pub fn with_offset(mut self, x_off: f64, y_off: f64) -> Self {
        self.offset = Point::new(x_off, y_off);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Filling a polygon closes it
    pub fn is_closed(&self) -> bool {
        self.closed || self.filled
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.outline.coords().map(|c| Point::new(c.x, c.y))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEntity {
    pub position: Point,
    pub text: String,
    pub placement: Placement,
    /// Radius of the hotspot marker; zero hides it
    pub radius: f64,
    /// Hotspot marker colour
    pub colour: Colour,
    pub text_colour: Colour,
    pub font: FontSpec,
    pub offset: Point,
    pub data: UserData,
}

impl TextEntity {
    /// Map-frame text: south-east of a small dot, nudged clear of it
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            position: Point::new(x, y),
            text: text.into(),
            placement: Placement::Se,
            radius: TEXT_MAP_RADIUS,
            colour: Colour::BLACK,
            text_colour: Colour::BLACK,
            font: FontSpec::default(),
            offset: Point::new(TEXT_MAP_OFFSET.0, TEXT_MAP_OFFSET.1),
            data: None,
        }
    }

    /// Text with the defaults of the given frame
    pub fn for_frame(x: f64, y: f64, text: impl Into<String>, frame: ReferenceFrame) -> Self {
        let entity = Self::new(x, y, text);
        match frame {
            ReferenceFrame::Map => entity,
            ReferenceFrame::View => entity.with_radius(0.0).with_offset(0.0, 0.0),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_text_colour(mut self, colour: Colour) -> Self {
        self.text_colour = colour;
        self
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    pub fn with_offset(mut self, x_off: f64, y_off: f64) -> Self {
        self.offset = Point::new(x_off, y_off);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(Arc::new(data));
        self
    }
}

/// A layer's entities; the variant fixes the layer kind
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEntities {
    Point(Vec<PointEntity>),
    Image(Vec<ImageEntity>),
    Polygon(Vec<PolygonEntity>),
    Text(Vec<TextEntity>),
}

impl LayerEntities {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerEntities::Point(_) => LayerKind::Point,
            LayerEntities::Image(_) => LayerKind::Image,
            LayerEntities::Polygon(_) => LayerKind::Polygon,
            LayerEntities::Text(_) => LayerKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LayerEntities::Point(v) => v.len(),
            LayerEntities::Image(v) => v.len(),
            LayerEntities::Polygon(v) => v.len(),
            LayerEntities::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rejects records the engine could not place or hit-test.
    pub fn validate(&self) -> Result<()> {
        match self {
            LayerEntities::Point(points) => {
                for (i, p) in points.iter().enumerate() {
                    check_position(i, p.position)?;
                    check_offset(i, p.offset)?;
                    check_non_negative(i, "radius", p.radius)?;
                }
            }
            LayerEntities::Image(images) => {
                for (i, image) in images.iter().enumerate() {
                    check_position(i, image.position)?;
                    check_offset(i, image.offset)?;
                    check_non_negative(i, "width", image.width)?;
                    check_non_negative(i, "height", image.height)?;
                }
            }
            LayerEntities::Polygon(polygons) => {
                for (i, polygon) in polygons.iter().enumerate() {
                    if polygon.outline.0.len() < 2 {
                        return Err(MapError::InvalidLayerData(format!(
                            "polygon {} needs at least two vertices",
                            i
                        )));
                    }
                    for vertex in polygon.vertices() {
                        check_position(i, vertex)?;
                    }
                    check_offset(i, polygon.offset)?;
                    check_non_negative(i, "width", polygon.width)?;
                }
            }
            LayerEntities::Text(texts) => {
                for (i, text) in texts.iter().enumerate() {
                    check_position(i, text.position)?;
                    check_offset(i, text.offset)?;
                    check_non_negative(i, "radius", text.radius)?;
                }
            }
        }
        Ok(())
    }
}

/// World coordinate of a map-frame hotspot
pub fn hotspot_geo(position: Point) -> LatLng {
    LatLng::from_xy(position.x, position.y)
}

fn check_position(index: usize, position: Point) -> Result<()> {
    if position.x.is_finite() && position.y.is_finite() {
        Ok(())
    } else {
        Err(MapError::InvalidLayerData(format!(
            "entity {} has a non-finite position ({}, {})",
            index, position.x, position.y
        )))
    }
}

fn check_offset(index: usize, offset: Point) -> Result<()> {
    if offset.x.is_finite() && offset.y.is_finite() {
        Ok(())
    } else {
        Err(MapError::InvalidLayerData(format!(
            "entity {} has a non-finite offset",
            index
        )))
    }
}

fn check_non_negative(index: usize, what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MapError::InvalidLayerData(format!(
            "entity {} has invalid {} {}",
            index, what, value
        )))
    }
}
