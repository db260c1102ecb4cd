//! Resolving clicks and drag boxes into layer entities.
//!
//! Map-frame layers are compared in map pixels, so the selection distance
//! means the same thing at every level. View-frame layers are compared in
//! view pixels after placement.

use crate::{
    core::{bounds::Bounds, geo::Point, viewport::Viewport},
    layers::{
        base::Layer,
        entity::{hotspot_geo, LayerEntities, UserData},
        placement::{resolve, Placement, PlacementInput, PrimitiveFamily, ReferenceFrame},
    },
    spatial::{nearest_within, point_in_ring, ring_from_points, within_bounds},
    tiles::TileSource,
};

/// One selected entity
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index into the layer's entity list
    pub entity_index: usize,
    /// The entity's stored hotspot; for polygons, the selecting position in
    /// the layer's frame
    pub position: Point,
    pub data: UserData,
}

struct Frame<'a, S: TileSource + ?Sized> {
    viewport: &'a Viewport,
    source: &'a S,
    frame: ReferenceFrame,
}

impl<'a, S: TileSource + ?Sized> Frame<'a, S> {
    /// Query position in the comparison space
    fn query(&self, view: Point) -> Point {
        match self.frame {
            ReferenceFrame::Map => self.viewport.view_to_map_pixel(view),
            ReferenceFrame::View => view,
        }
    }

    /// Hotspot in the comparison space, without placement
    fn hotspot(&self, position: Point) -> Point {
        match self.frame {
            ReferenceFrame::Map => self
                .viewport
                .geo_to_map_pixel(self.source, hotspot_geo(position)),
            ReferenceFrame::View => position,
        }
    }

    /// Hotspot in the comparison space; view-frame hotspots go through the
    /// placement table with a zero-size box
    fn placed(
        &self,
        family: PrimitiveFamily,
        placement: Placement,
        position: Point,
        offset: Point,
    ) -> Point {
        match self.frame {
            ReferenceFrame::Map => self.hotspot(position),
            ReferenceFrame::View => resolve(
                family,
                ReferenceFrame::View,
                placement,
                self.view_input(position, offset),
            ),
        }
    }

    fn view_input(&self, position: Point, offset: Point) -> PlacementInput {
        PlacementInput::at(position)
            .with_offset(offset)
            .with_view(self.viewport.view_width as f64, self.viewport.view_height as f64)
    }

    /// Polygon vertices in the comparison space
    fn polygon_vertices(
        &self,
        vertices: impl Iterator<Item = Point>,
        placement: Placement,
        offset: Point,
    ) -> Vec<Point> {
        vertices
            .map(|vertex| match self.frame {
                ReferenceFrame::Map => self.hotspot(vertex).add(&offset),
                ReferenceFrame::View => resolve(
                    PrimitiveFamily::Polygon,
                    ReferenceFrame::View,
                    placement,
                    self.view_input(vertex, offset),
                ),
            })
            .collect()
    }

    /// Selecting position reported for polygons
    fn layer_position(&self, view: Point) -> Point {
        match self.frame {
            ReferenceFrame::Map => self.viewport.view_to_geo(self.source, view).to_xy(),
            ReferenceFrame::View => view,
        }
    }

    /// Positions of every point-like entity in the comparison space
    fn candidates(&self, entities: &LayerEntities) -> Vec<Point> {
        match entities {
            LayerEntities::Point(points) => points
                .iter()
                .map(|p| self.placed(PrimitiveFamily::Point, p.placement, p.position, p.offset))
                .collect(),
            LayerEntities::Text(texts) => texts
                .iter()
                .map(|t| self.placed(PrimitiveFamily::Text, t.placement, t.position, t.offset))
                .collect(),
            LayerEntities::Image(images) => {
                images.iter().map(|i| self.hotspot(i.position)).collect()
            }
            LayerEntities::Polygon(_) => Vec::new(),
        }
    }
}

fn selection(entities: &LayerEntities, index: usize) -> Option<Selection> {
    let (position, data) = match entities {
        LayerEntities::Point(v) => v.get(index).map(|e| (e.position, e.data.clone()))?,
        LayerEntities::Image(v) => v.get(index).map(|e| (e.position, e.data.clone()))?,
        LayerEntities::Text(v) => v.get(index).map(|e| (e.position, e.data.clone()))?,
        LayerEntities::Polygon(v) => v.get(index).map(|e| (Point::default(), e.data.clone()))?,
    };
    Some(Selection {
        entity_index: index,
        position,
        data,
    })
}

/// Entity of `layer` under the view position `view`, if any.
///
/// Points, text and images select the nearest hotspot within the layer's
/// selection delta; polygons select the first polygon containing the click.
pub fn point_select<S: TileSource + ?Sized>(
    layer: &Layer,
    viewport: &Viewport,
    source: &S,
    view: Point,
) -> Option<Selection> {
    let frame = Frame {
        viewport,
        source,
        frame: layer.frame,
    };
    let query = frame.query(view);

    if let LayerEntities::Polygon(polygons) = &layer.entities {
        let index = polygons.iter().position(|polygon| {
            let vertices = frame.polygon_vertices(polygon.vertices(), polygon.placement, polygon.offset);
            point_in_ring(query, &ring_from_points(&vertices))
        })?;
        return Some(Selection {
            entity_index: index,
            position: frame.layer_position(view),
            data: polygons[index].data.clone(),
        });
    }

    let candidates = frame.candidates(&layer.entities);
    let index = nearest_within(
        query,
        candidates.into_iter().enumerate(),
        layer.selection_delta,
    )?;
    selection(&layer.entities, index)
}

/// Entities of `layer` inside the box spanned by two view positions.
///
/// Edges count as inside. Polygon layers never report box selections.
pub fn box_select<S: TileSource + ?Sized>(
    layer: &Layer,
    viewport: &Viewport,
    source: &S,
    corner_a: Point,
    corner_b: Point,
) -> Vec<Selection> {
    if matches!(layer.entities, LayerEntities::Polygon(_)) {
        return Vec::new();
    }

    let frame = Frame {
        viewport,
        source,
        frame: layer.frame,
    };
    let bounds = Bounds::from_corners(frame.query(corner_a), frame.query(corner_b));
    let candidates = frame.candidates(&layer.entities);

    within_bounds(&bounds, candidates.into_iter().enumerate())
        .into_iter()
        .filter_map(|index| selection(&layer.entities, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLngBounds,
        layers::{
            base::{LayerId, LayerOptions},
            entity::{ImageEntity, ImageHandle, PointEntity, PolygonEntity, TextEntity},
        },
        tiles::GridTileSource,
    };

    // Level 0, one 1000px tile over a 0..1000 world: world units are map pixels
    // with y flipped. The view shows the whole map at offset 0.
    fn fixture() -> (GridTileSource, Viewport) {
        let mut source =
            GridTileSource::new(0, 2, LatLngBounds::from_extent(0.0, 1000.0, 0.0, 1000.0))
                .with_tile_size(1000, 1000);
        let viewport = Viewport::new(&mut source, (1000, 1000), 0, 2, 0);
        (source, viewport)
    }

    fn layer(entities: LayerEntities, options: LayerOptions) -> Layer {
        Layer::new(LayerId(1), entities, options.with_selectable(true), (0, 2))
    }

    #[test]
    fn test_nearest_point_within_delta() {
        let (source, viewport) = fixture();
        let points = layer(
            LayerEntities::Point(vec![
                PointEntity::new(109.0, 900.0),
                PointEntity::new(100.0, 897.0).with_data(serde_json::json!("near")),
            ]),
            LayerOptions::new(),
        );

        // world (100, 900) is map pixel (100, 100)
        let hit = point_select(&points, &viewport, &source, Point::new(100.0, 100.0)).unwrap();
        assert_eq!(hit.entity_index, 1);
        assert_eq!(hit.position, Point::new(100.0, 897.0));
        assert_eq!(hit.data.as_deref(), Some(&serde_json::json!("near")));

        let far = layer(
            LayerEntities::Point(vec![PointEntity::new(109.0, 900.0)]),
            LayerOptions::new(),
        );
        assert!(point_select(&far, &viewport, &source, Point::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_view_frame_points_use_placement() {
        let (source, viewport) = fixture();
        let points = layer(
            LayerEntities::Point(vec![PointEntity::new(0.0, 0.0).with_placement(Placement::Se)]),
            LayerOptions::view_relative(),
        );
        assert!(point_select(&points, &viewport, &source, Point::new(998.0, 998.0)).is_some());
        assert!(point_select(&points, &viewport, &source, Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_text_selects_on_hotspot() {
        let (source, viewport) = fixture();
        let texts = layer(
            LayerEntities::Text(vec![TextEntity::new(500.0, 500.0, "label")]),
            LayerOptions::new(),
        );
        assert!(point_select(&texts, &viewport, &source, Point::new(502.0, 501.0)).is_some());
        assert!(point_select(&texts, &viewport, &source, Point::new(530.0, 510.0)).is_none());
    }

    #[test]
    fn test_image_selects_on_raw_hotspot() {
        let (source, viewport) = fixture();
        let images = layer(
            LayerEntities::Image(vec![ImageEntity::new(
                50.0,
                60.0,
                ImageHandle(3),
                40.0,
                40.0,
            )
            .with_placement(Placement::Se)]),
            LayerOptions::view_relative(),
        );
        let hit = point_select(&images, &viewport, &source, Point::new(52.0, 58.0)).unwrap();
        assert_eq!(hit.entity_index, 0);
    }

    #[test]
    fn test_polygon_first_containing_wins() {
        let (source, viewport) = fixture();
        let square = |x0: f64, y0: f64, size: f64| {
            PolygonEntity::new(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
            ])
        };
        let polygons = layer(
            LayerEntities::Polygon(vec![
                square(800.0, 800.0, 50.0),
                square(100.0, 100.0, 400.0),
                square(200.0, 200.0, 100.0),
            ]),
            LayerOptions::new(),
        );

        // world (250, 250) is view (250, 750)
        let hit = point_select(&polygons, &viewport, &source, Point::new(250.0, 750.0)).unwrap();
        assert_eq!(hit.entity_index, 1);
        assert_eq!(hit.position, Point::new(250.0, 250.0));

        assert!(point_select(&polygons, &viewport, &source, Point::new(50.0, 50.0)).is_none());
        assert!(box_select(
            &polygons,
            &viewport,
            &source,
            Point::new(0.0, 0.0),
            Point::new(1000.0, 1000.0)
        )
        .is_empty());
    }

    #[test]
    fn test_box_select_either_corner_order() {
        let (source, viewport) = fixture();
        let points = layer(
            LayerEntities::Point(vec![
                PointEntity::new(100.0, 900.0),
                PointEntity::new(300.0, 700.0),
                PointEntity::new(301.0, 700.0),
            ]),
            LayerOptions::new(),
        );

        let a = Point::new(100.0, 100.0);
        let b = Point::new(300.0, 300.0);
        let forward = box_select(&points, &viewport, &source, a, b);
        let backward = box_select(&points, &viewport, &source, b, a);
        let indices: Vec<_> = forward.iter().map(|s| s.entity_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(forward, backward);
    }
}
