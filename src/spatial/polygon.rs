//! Even-odd point-in-polygon test.

use crate::core::geo::Point;
use geo_types::LineString;

/// True if `point` is inside the ring, by crossing count.
///
/// The ring is treated as closed whether or not its last vertex repeats the
/// first. Points exactly on an edge or vertex may land on either side
/// depending on the edge orientation; callers must not rely on boundary
/// results.
pub fn point_in_ring(point: Point, ring: &LineString<f64>) -> bool {
    let vertices = &ring.0;
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];
    for current in vertices.iter().copied() {
        let (p1, p2) = (previous, current);
        previous = current;

        if point.y <= p1.y.min(p2.y) || point.y > p1.y.max(p2.y) {
            continue;
        }
        if point.x > p1.x.max(p2.x) {
            continue;
        }
        // p1.y != p2.y is implied by the half-open y test above
        let crossing = (point.y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y) + p1.x;
        if p1.x == p2.x || point.x <= crossing {
            inside = !inside;
        }
    }
    inside
}

/// Ring built from placed vertices
pub fn ring_from_points(points: &[Point]) -> LineString<f64> {
    LineString::from(points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>())
}
