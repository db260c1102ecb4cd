//! Anchor-based placement of drawn primitives.
//!
//! Every primitive is positioned relative to its hotspot by one of nine
//! anchors. The arithmetic differs per primitive family and per reference
//! frame, so each (family, frame) pair has its own table of nine closed-form
//! functions indexed by [`Placement`].
//!
//! Map-frame functions get the hotspot already converted to view pixels and
//! position the primitive around it. View-frame functions treat the hotspot
//! as an offset from the anchor's point on the view (corner, edge middle or
//! centre).

use crate::{core::geo::Point, MapError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Where a primitive sits relative to its hotspot.
///
/// `Cc` is centred; the others name the compass point of the primitive's box
/// that touches the hotspot (map frame) or the view edge it hugs (view frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Cc,
    Nw,
    Cn,
    Ne,
    Ce,
    Se,
    Cs,
    Sw,
    Cw,
}

impl Placement {
    pub const ALL: [Placement; 9] = [
        Placement::Cc,
        Placement::Nw,
        Placement::Cn,
        Placement::Ne,
        Placement::Ce,
        Placement::Se,
        Placement::Cs,
        Placement::Sw,
        Placement::Cw,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Placement::Cc => "cc",
            Placement::Nw => "nw",
            Placement::Cn => "cn",
            Placement::Ne => "ne",
            Placement::Ce => "ce",
            Placement::Se => "se",
            Placement::Cs => "cs",
            Placement::Sw => "sw",
            Placement::Cw => "cw",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Placement {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Placement::ALL
            .iter()
            .copied()
            .find(|p| p.code() == code)
            .ok_or_else(|| MapError::InvalidPlacement(s.to_string()))
    }
}

/// Coordinate space a layer's hotspots live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceFrame {
    /// Hotspots are world coordinates and move with the map
    #[default]
    Map,
    /// Hotspots are view pixels and stay put while the map pans
    View,
}

/// Which table a primitive is placed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveFamily {
    Point,
    Image,
    Text,
    Polygon,
}

/// Arguments to a placement function.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlacementInput {
    /// Hotspot, or one polygon vertex
    pub x: f64,
    pub y: f64,
    /// Primitive box size; zero for points and polygons
    pub w: f64,
    pub h: f64,
    pub x_off: f64,
    pub y_off: f64,
    pub view_w: f64,
    pub view_h: f64,
}

impl PlacementInput {
    pub fn at(position: Point) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.w = w;
        self.h = h;
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.x_off = offset.x;
        self.y_off = offset.y;
        self
    }

    pub fn with_view(mut self, view_w: f64, view_h: f64) -> Self {
        self.view_w = view_w;
        self.view_h = view_h;
        self
    }
}

pub type PlaceFn = fn(PlacementInput) -> Point;

type Table = [PlaceFn; 9];

fn at(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// Map frame. Hotspot is in view pixels, result is the primitive's anchor
// point (circle centre or vertex) or its box's top-left corner.

static POINT_MAP: Table = [
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
];

static IMAGE_MAP: Table = [
    |i| at(i.x - i.w / 2.0 + i.x_off, i.y - i.h / 2.0 + i.y_off),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x - i.w / 2.0 + i.x_off, i.y + i.y_off),
    |i| at(i.x - i.w + i.x_off, i.y + i.y_off),
    |i| at(i.x - i.w + i.x_off, i.y - i.h / 2.0 + i.y_off),
    |i| at(i.x - i.w + i.x_off, i.y - i.h + i.y_off),
    |i| at(i.x - i.w / 2.0 + i.x_off, i.y - i.h + i.y_off),
    |i| at(i.x + i.x_off, i.y - i.h + i.y_off),
    |i| at(i.x + i.x_off, i.y - i.h / 2.0 + i.y_off),
];

static TEXT_MAP: Table = [
    |i| at(i.x - i.w / 2.0, i.y - i.h / 2.0),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x - i.w / 2.0, i.y + i.y_off),
    |i| at(i.x - i.w - i.x_off, i.y + i.y_off),
    |i| at(i.x - i.w - i.x_off, i.y - i.h / 2.0),
    |i| at(i.x - i.w - i.x_off, i.y - i.h - i.y_off),
    |i| at(i.x - i.w / 2.0, i.y - i.h - i.y_off),
    |i| at(i.x + i.x_off, i.y - i.h - i.y_off),
    |i| at(i.x + i.x_off, i.y - i.h / 2.0),
];

// View frame. Hotspot is a displacement from the anchor's point on the view.
// Edges are the last pixel row/column except for images, which use the full
// view size.

static POINT_VIEW: Table = [
    |i| at(i.x + i.view_w / 2.0, i.y + i.view_h / 2.0),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.view_w / 2.0, i.y + i.y_off),
    |i| at(i.x + i.view_w - 1.0 - i.x_off, i.y + i.y_off),
    |i| at(i.x + i.view_w - 1.0 - i.x_off, i.y + i.view_h / 2.0),
    |i| at(i.x + i.view_w - 1.0 - i.x_off, i.y + i.view_h - 1.0 - i.y_off),
    |i| at(i.x + i.view_w / 2.0, i.y + i.view_h - 1.0 - i.y_off),
    |i| at(i.x + i.x_off, i.y + i.view_h - 1.0 - i.y_off),
    |i| at(i.x + i.x_off, i.y + i.view_h / 2.0),
];

static POLYGON_VIEW: Table = [
    |i| at(i.x + i.view_w / 2.0, i.y + i.view_h / 2.0),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + i.view_w / 2.0, i.y + i.y_off),
    |i| at(i.x + i.view_w - 1.0 - i.x_off, i.y + i.y_off),
    |i| at(i.x + i.view_w - 1.0 - i.x_off, i.y + i.view_h / 2.0 - i.y_off),
    |i| at(i.x + i.view_w - 1.0 - i.x_off, i.y + i.view_h - 1.0 - i.y_off),
    |i| at(i.x + i.view_w / 2.0, i.y + i.view_h - 1.0 - i.y_off),
    |i| at(i.x + i.x_off, i.y + i.view_h - 1.0 - i.y_off),
    |i| at(i.x + i.x_off, i.y + i.view_h / 2.0),
];

static IMAGE_VIEW: Table = [
    |i| at(i.x + (i.view_w - i.w) / 2.0, i.y + (i.view_h - i.h) / 2.0),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + (i.view_w - i.w) / 2.0, i.y + i.y_off),
    |i| at(i.x + i.view_w - i.w - i.x_off, i.y + i.y_off),
    |i| at(i.x + i.view_w - i.w - i.x_off, i.y + (i.view_h - i.h) / 2.0),
    |i| at(i.x + i.view_w - i.w - i.x_off, i.y + i.view_h - i.h - i.y_off),
    |i| at(i.x + (i.view_w - i.w) / 2.0, i.y + i.view_h - i.h - i.y_off),
    |i| at(i.x + i.x_off, i.y + i.view_h - i.h - i.y_off),
    |i| at(i.x + i.x_off, i.y + (i.view_h - i.h) / 2.0),
];

static TEXT_VIEW: Table = [
    |i| at(i.x + (i.view_w - i.w) / 2.0, i.y + (i.view_h - i.h) / 2.0),
    |i| at(i.x + i.x_off, i.y + i.y_off),
    |i| at(i.x + (i.view_w - i.w) / 2.0, i.y + i.y_off),
    |i| at(i.x + i.view_w - 1.0 - i.w - i.x_off, i.y + i.y_off),
    |i| at(i.x + i.view_w - 1.0 - i.w - i.x_off, i.y + (i.view_h - i.h) / 2.0),
    |i| at(i.x + i.view_w - 1.0 - i.w - i.x_off, i.y + i.view_h - 1.0 - i.h - i.y_off),
    |i| at(i.x + (i.view_w - i.w) / 2.0, i.y + i.view_h - 1.0 - i.h - i.y_off),
    |i| at(i.x + i.x_off, i.y + i.view_h - 1.0 - i.h - i.y_off),
    |i| at(i.x + i.x_off, i.y + (i.view_h - i.h) / 2.0),
];

/// Placement function for a primitive family in a reference frame
pub fn place_fn(family: PrimitiveFamily, frame: ReferenceFrame, anchor: Placement) -> PlaceFn {
    let table = match (family, frame) {
        (PrimitiveFamily::Point, ReferenceFrame::Map) => &POINT_MAP,
        (PrimitiveFamily::Point, ReferenceFrame::View) => &POINT_VIEW,
        (PrimitiveFamily::Image, ReferenceFrame::Map) => &IMAGE_MAP,
        (PrimitiveFamily::Image, ReferenceFrame::View) => &IMAGE_VIEW,
        (PrimitiveFamily::Text, ReferenceFrame::Map) => &TEXT_MAP,
        (PrimitiveFamily::Text, ReferenceFrame::View) => &TEXT_VIEW,
        // vertices are already in view pixels, only the offset applies
        (PrimitiveFamily::Polygon, ReferenceFrame::Map) => &POINT_MAP,
        (PrimitiveFamily::Polygon, ReferenceFrame::View) => &POLYGON_VIEW,
    };
    table[anchor as usize]
}

/// Resolves where a primitive is drawn.
pub fn resolve(
    family: PrimitiveFamily,
    frame: ReferenceFrame,
    anchor: Placement,
    input: PlacementInput,
) -> Point {
    place_fn(family, frame, anchor)(input)
}
