use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Represents a bounding box in pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from two opposite corners given in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_coords(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Checks if the bounds contain a point, edges included
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Translates both corners by `delta`
    pub fn translated(&self, delta: &Point) -> Bounds {
        Bounds::new(self.min.add(delta), self.max.add(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_canonical() {
        let a = Bounds::from_corners(Point::new(10.0, 0.0), Point::new(0.0, 10.0));
        let b = Bounds::from_corners(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        assert_eq!(a, b);
        assert_eq!(a.min, Point::new(0.0, 0.0));
        assert_eq!(a.max, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bounds = Bounds::from_coords(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(&Point::new(0.0, 0.0)));
        assert!(bounds.contains(&Point::new(10.0, 10.0)));
        assert!(bounds.contains(&Point::new(5.0, 10.0)));
        assert!(!bounds.contains(&Point::new(10.01, 5.0)));
    }

    #[test]
    fn test_extend_and_translate() {
        let mut bounds = Bounds::from_coords(0.0, 0.0, 1.0, 1.0);
        bounds.extend(&Point::new(-2.0, 3.0));
        assert_eq!(bounds, Bounds::from_coords(-2.0, 0.0, 1.0, 3.0));

        let moved = bounds.translated(&Point::new(2.0, -1.0));
        assert_eq!(moved, Bounds::from_coords(0.0, -1.0, 3.0, 2.0));
        assert_eq!(moved.width(), 3.0);
        assert_eq!(moved.center(), Point::new(1.5, 0.5));
    }
}
