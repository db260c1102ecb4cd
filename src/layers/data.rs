//! Building layer entities from loosely-typed JSON tuples.
//!
//! Each kind takes an array of tuples:
//!
//! | kind    | tuple                                                   |
//! |---------|---------------------------------------------------------|
//! | point   | `[x, y]` or `[x, y, {attrs}]`                            |
//! | image   | `[x, y, {"handle", "width", "height"}]` (+ `{attrs}`)    |
//! | polygon | `[[[x, y], ...]]` or `[[[x, y], ...], {attrs}]`          |
//! | text    | `[x, y, "text"]` or `[x, y, "text", {attrs}]`            |
//!
//! Attributes are looked up on the tuple first, then on the layer-wide
//! attribute object, then fall back to the built-in default. Colour keys
//! take either spelling (`colour`/`color`).

use crate::{
    core::geo::Point,
    layers::{
        base::LayerKind,
        entity::{
            ImageEntity, ImageHandle, LayerEntities, PointEntity, PolygonEntity, TextEntity,
            UserData,
        },
        placement::{Placement, ReferenceFrame},
        style::{Colour, FontSpec},
    },
    MapError, Result,
};
use serde_json::{Map, Value};
use std::sync::Arc;

type Object = Map<String, Value>;

fn invalid(msg: String) -> MapError {
    MapError::InvalidLayerData(msg)
}

/// Attribute lookup: tuple attributes, then layer attributes
#[derive(Clone, Copy)]
struct Attrs<'a> {
    entity: Option<&'a Object>,
    layer: Option<&'a Object>,
}

impl<'a> Attrs<'a> {
    fn get(&self, keys: &[&str]) -> Option<&'a Value> {
        [self.entity, self.layer]
            .into_iter()
            .flatten()
            .find_map(|object| keys.iter().find_map(|key| object.get(*key)))
    }

    fn f64(&self, keys: &[&str], default: f64) -> Result<f64> {
        match self.get(keys) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| invalid(format!("'{}' must be a number, got {}", keys[0], value))),
        }
    }

    fn bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(&[key]) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| invalid(format!("'{}' must be a boolean, got {}", key, value))),
        }
    }

    fn string(&self, key: &str) -> Result<Option<&'a str>> {
        match self.get(&[key]) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| invalid(format!("'{}' must be a string, got {}", key, value))),
        }
    }

    fn colour(&self, keys: &[&str], default: Colour) -> Result<Colour> {
        match self.get(keys) {
            None => Ok(default),
            Some(Value::String(text)) => text.parse(),
            Some(Value::Array(channels)) => colour_from_channels(channels),
            Some(other) => Err(MapError::InvalidColour(other.to_string())),
        }
    }

    fn placement(&self, default: Placement) -> Result<Placement> {
        match self.string("placement")? {
            None => Ok(default),
            Some(code) => code.parse(),
        }
    }

    fn offset(&self, default: Point) -> Result<Point> {
        Ok(Point::new(
            self.f64(&["offset_x"], default.x)?,
            self.f64(&["offset_y"], default.y)?,
        ))
    }

    fn data(&self) -> UserData {
        self.get(&["data"]).cloned().map(Arc::new)
    }
}

fn colour_from_channels(channels: &[Value]) -> Result<Colour> {
    let bad = || MapError::InvalidColour(Value::Array(channels.to_vec()).to_string());
    let values = channels
        .iter()
        .map(|c| c.as_u64().filter(|v| *v <= 255).map(|v| v as u8))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(bad)?;
    match values.as_slice() {
        [r, g, b] => Ok(Colour::rgb(*r, *g, *b)),
        [r, g, b, a] => Ok(Colour::new(*r, *g, *b, *a)),
        _ => Err(bad()),
    }
}

fn tuples<'a>(data: &'a Value, kind: LayerKind) -> Result<&'a Vec<Value>> {
    data.as_array()
        .ok_or_else(|| invalid(format!("{} layer data must be an array", kind)))
}

fn tuple<'a>(value: &'a Value, index: usize, kind: LayerKind) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| invalid(format!("{} {} must be an array, got {}", kind, index, value)))
}

fn number(value: &Value, what: &str, index: usize) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| invalid(format!("{} of entity {} must be a number", what, index)))
}

fn object<'a>(value: &'a Value, index: usize) -> Result<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| invalid(format!("attributes of entity {} must be an object", index)))
}

fn arity_error(kind: LayerKind, index: usize, len: usize, expected: &str) -> MapError {
    invalid(format!(
        "{} {} has {} elements, expected {}",
        kind, index, len, expected
    ))
}

/// Builds a layer's entities from JSON.
///
/// `layer_attributes`, when given, must be an object; its keys supply
/// defaults for every tuple. Text defaults depend on `frame`.
pub fn entities_from_json(
    kind: LayerKind,
    data: &Value,
    layer_attributes: Option<&Value>,
    frame: ReferenceFrame,
) -> Result<LayerEntities> {
    let layer = match layer_attributes {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_object()
                .ok_or_else(|| invalid("layer attributes must be an object".to_string()))?,
        ),
    };

    let entities = match kind {
        LayerKind::Point => LayerEntities::Point(points_from_json(data, layer)?),
        LayerKind::Image => LayerEntities::Image(images_from_json(data, layer)?),
        LayerKind::Polygon => LayerEntities::Polygon(polygons_from_json(data, layer)?),
        LayerKind::Text => LayerEntities::Text(texts_from_json(data, layer, frame)?),
    };
    entities.validate()?;
    Ok(entities)
}

fn points_from_json(data: &Value, layer: Option<&Object>) -> Result<Vec<PointEntity>> {
    let kind = LayerKind::Point;
    let defaults = PointEntity::new(0.0, 0.0);

    tuples(data, kind)?
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let items = tuple(value, i, kind)?;
            let entity = match items.as_slice() {
                [_, _] => None,
                [_, _, attributes] => Some(object(attributes, i)?),
                _ => return Err(arity_error(kind, i, items.len(), "2 or 3")),
            };
            let attrs = Attrs { entity, layer };

            Ok(PointEntity {
                position: Point::new(number(&items[0], "x", i)?, number(&items[1], "y", i)?),
                placement: attrs.placement(defaults.placement)?,
                radius: attrs.f64(&["radius"], defaults.radius)?,
                colour: attrs.colour(&["colour", "color"], defaults.colour)?,
                offset: attrs.offset(defaults.offset)?,
                data: attrs.data(),
            })
        })
        .collect()
}

fn images_from_json(data: &Value, layer: Option<&Object>) -> Result<Vec<ImageEntity>> {
    let kind = LayerKind::Image;

    tuples(data, kind)?
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let items = tuple(value, i, kind)?;
            let entity = match items.as_slice() {
                [_, _, _] => None,
                [_, _, _, attributes] => Some(object(attributes, i)?),
                _ => return Err(arity_error(kind, i, items.len(), "3 or 4")),
            };
            let attrs = Attrs { entity, layer };

            let image = object(&items[2], i)?;
            let handle = image
                .get("handle")
                .and_then(Value::as_u64)
                .ok_or_else(|| invalid(format!("image {} needs an integer 'handle'", i)))?;
            let size = |key: &str| {
                image
                    .get(key)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| invalid(format!("image {} needs a numeric '{}'", i, key)))
            };

            Ok(ImageEntity {
                position: Point::new(number(&items[0], "x", i)?, number(&items[1], "y", i)?),
                image: ImageHandle(handle),
                width: size("width")?,
                height: size("height")?,
                placement: attrs.placement(Placement::Cc)?,
                offset: attrs.offset(Point::default())?,
                data: attrs.data(),
            })
        })
        .collect()
}

fn polygons_from_json(data: &Value, layer: Option<&Object>) -> Result<Vec<PolygonEntity>> {
    let kind = LayerKind::Polygon;

    tuples(data, kind)?
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let items = tuple(value, i, kind)?;
            let (ring, entity) = match items.as_slice() {
                [ring] => (ring, None),
                [ring, attributes] => (ring, Some(object(attributes, i)?)),
                _ => return Err(arity_error(kind, i, items.len(), "1 or 2")),
            };
            let attrs = Attrs { entity, layer };

            let vertices = ring
                .as_array()
                .ok_or_else(|| invalid(format!("polygon {} outline must be an array", i)))?
                .iter()
                .map(|vertex| match vertex.as_array().map(Vec::as_slice) {
                    Some([x, y]) => Ok((number(x, "x", i)?, number(y, "y", i)?)),
                    _ => Err(invalid(format!("polygon {} has a malformed vertex {}", i, vertex))),
                })
                .collect::<Result<Vec<(f64, f64)>>>()?;

            let defaults = PolygonEntity::new(Vec::<(f64, f64)>::new());
            Ok(PolygonEntity {
                outline: vertices.into(),
                placement: attrs.placement(defaults.placement)?,
                width: attrs.f64(&["width"], defaults.width)?,
                colour: attrs.colour(&["colour", "color"], defaults.colour)?,
                closed: attrs.bool("closed", defaults.closed)?,
                filled: attrs.bool("filled", defaults.filled)?,
                fill_colour: attrs.colour(&["fillcolour", "fillcolor"], defaults.fill_colour)?,
                offset: attrs.offset(defaults.offset)?,
                data: attrs.data(),
            })
        })
        .collect()
}

fn texts_from_json(
    data: &Value,
    layer: Option<&Object>,
    frame: ReferenceFrame,
) -> Result<Vec<TextEntity>> {
    let kind = LayerKind::Text;
    let defaults = TextEntity::for_frame(0.0, 0.0, "", frame);

    tuples(data, kind)?
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let items = tuple(value, i, kind)?;
            let entity = match items.as_slice() {
                [_, _, _] => None,
                [_, _, _, attributes] => Some(object(attributes, i)?),
                _ => return Err(arity_error(kind, i, items.len(), "3 or 4")),
            };
            let attrs = Attrs { entity, layer };

            let text = items[2]
                .as_str()
                .ok_or_else(|| invalid(format!("text {} must have a string label", i)))?;
            let font = FontSpec::new(
                attrs.string("fontname")?.unwrap_or(&defaults.font.name),
                attrs.f64(&["fontsize"], defaults.font.size as f64)? as u32,
            );

            Ok(TextEntity {
                position: Point::new(number(&items[0], "x", i)?, number(&items[1], "y", i)?),
                text: text.to_string(),
                placement: attrs.placement(defaults.placement)?,
                radius: attrs.f64(&["radius"], defaults.radius)?,
                colour: attrs.colour(&["colour", "color"], defaults.colour)?,
                text_colour: attrs.colour(&["textcolour", "textcolor"], defaults.text_colour)?,
                font,
                offset: attrs.offset(defaults.offset)?,
                data: attrs.data(),
            })
        })
        .collect()
}
