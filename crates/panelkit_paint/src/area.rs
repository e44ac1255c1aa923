//! Covered regions used for touch hit-testing and dirty-region computation

use crate::path::{Path, Point};
use crate::primitives::Rect;

/// A flattened outline in device or panel coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
    closed: bool,
}

impl Polygon {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.points.iter().copied())
    }

    /// Even-odd containment; open polylines are treated as implicitly closed
    pub fn contains(&self, point: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > point.y) != (b.y > point.y) {
                let x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    fn map(&self, f: &impl Fn(Point) -> Point) -> Polygon {
        Polygon {
            points: self.points.iter().map(|p| f(*p)).collect(),
            closed: self.closed,
        }
    }
}

/// Tolerance used when flattening paths for hit-testing
const HIT_TEST_TOLERANCE: f32 = 0.5;

/// The exact region covered by a geometry
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Area {
    /// Covers nothing (missing resource, zero-size geometry)
    #[default]
    Empty,
    /// Axis-aligned rectangle
    Rect(Rect),
    /// Set of polygons combined with the even-odd rule
    Polygons(Vec<Polygon>),
}

impl Area {
    /// Area covered by a path in its own units
    pub fn from_path(path: &Path) -> Self {
        let polygons = path.flatten(1.0, HIT_TEST_TOLERANCE);
        if polygons.is_empty() {
            Area::Empty
        } else {
            Area::Polygons(polygons)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Area::Empty => true,
            Area::Rect(rect) => rect.is_empty(),
            Area::Polygons(polygons) => polygons.iter().all(|p| p.points().len() < 2),
        }
    }

    /// Bounding rectangle, `Rect::ZERO` for an empty area
    pub fn bounds(&self) -> Rect {
        match self {
            Area::Empty => Rect::ZERO,
            Area::Rect(rect) => *rect,
            Area::Polygons(polygons) => Rect::bounding(
                polygons.iter().flat_map(|p| p.points().iter().copied()),
            )
            .unwrap_or(Rect::ZERO),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            Area::Empty => false,
            Area::Rect(rect) => !rect.is_empty() && rect.contains(point),
            Area::Polygons(polygons) => {
                polygons.iter().filter(|p| p.contains(point)).count() % 2 == 1
            }
        }
    }

    /// Map every vertex through `f`. Rectangles become polygons unless the
    /// mapping is a pure translation/scale, which callers express via
    /// [`Area::translate`] instead.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Area {
        match self {
            Area::Empty => Area::Empty,
            Area::Rect(rect) => Area::Polygons(vec![Polygon::new(
                rect.corners().iter().map(|p| f(*p)).collect(),
                true,
            )]),
            Area::Polygons(polygons) => {
                Area::Polygons(polygons.iter().map(|p| p.map(&f)).collect())
            }
        }
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Area {
        match self {
            Area::Rect(rect) => Area::Rect(rect.translate(dx, dy)),
            other => other.map_points(|p| Point::new(p.x + dx, p.y + dy)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathBuilder;

    #[test]
    fn test_triangle_contains() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(0.0, 10.0)
            .close()
            .build();
        let area = Area::from_path(&path);
        assert!(area.contains(Point::new(2.0, 2.0)));
        assert!(!area.contains(Point::new(8.0, 8.0)));
        assert_eq!(area.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_even_odd_hole() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(10.0, 10.0)
            .line_to(0.0, 10.0)
            .close()
            .move_to(3.0, 3.0)
            .line_to(7.0, 3.0)
            .line_to(7.0, 7.0)
            .line_to(3.0, 7.0)
            .close()
            .build();
        let area = Area::from_path(&path);
        assert!(area.contains(Point::new(1.0, 1.0)));
        assert!(!area.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_empty_area() {
        assert!(Area::Empty.is_empty());
        assert!(!Area::Empty.contains(Point::ZERO));
        assert_eq!(Area::Empty.bounds(), Rect::ZERO);
        assert!(Area::Rect(Rect::new(1.0, 1.0, 0.0, 4.0)).is_empty());
    }

    #[test]
    fn test_translate_keeps_rect() {
        let area = Area::Rect(Rect::new(0.0, 0.0, 4.0, 4.0)).translate(2.0, 3.0);
        assert_eq!(area, Area::Rect(Rect::new(2.0, 3.0, 4.0, 4.0)));
    }
}
