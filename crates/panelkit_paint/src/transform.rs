//! Affine and projective transforms

use crate::path::Point;
use crate::primitives::Rect;

/// 2D affine transform
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: x,
            f: y,
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn rotate(angle: f32) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// `self` applied after `first`
    pub fn then(&self, first: &Transform2D) -> Transform2D {
        Transform2D {
            a: self.a * first.a + self.c * first.b,
            b: self.b * first.a + self.d * first.b,
            c: self.a * first.c + self.c * first.d,
            d: self.b * first.c + self.d * first.d,
            e: self.a * first.e + self.c * first.f + self.e,
            f: self.b * first.e + self.d * first.f + self.f,
        }
    }

    /// True when the transform keeps rectangles axis-aligned
    pub fn is_axis_aligned(&self) -> bool {
        self.b == 0.0 && self.c == 0.0
    }
}

const DEGENERATE_EPSILON: f32 = 1e-9;

/// A projective (perspective) transform stored as a row-major 3x3 matrix.
///
/// Used to display a flat panel region on a tilted surface: the source
/// rectangle is mapped onto an arbitrary convex quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perspective {
    m: [[f32; 3]; 3],
}

impl Default for Perspective {
    fn default() -> Self {
        Self::identity()
    }
}

impl Perspective {
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn matrix(&self) -> [[f32; 3]; 3] {
        self.m
    }

    /// Transform mapping the unit square corners (0,0),(1,0),(1,1),(0,1)
    /// onto `quad` in the same order. `None` when the quad is degenerate.
    pub fn square_to_quad(quad: [Point; 4]) -> Option<Self> {
        let [p0, p1, p2, p3] = quad;
        let dx1 = p1.x - p2.x;
        let dx2 = p3.x - p2.x;
        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy1 = p1.y - p2.y;
        let dy2 = p3.y - p2.y;
        let dy3 = p0.y - p1.y + p2.y - p3.y;

        let (g, h) = if dx3.abs() < DEGENERATE_EPSILON && dy3.abs() < DEGENERATE_EPSILON {
            (0.0, 0.0)
        } else {
            let det = dx1 * dy2 - dx2 * dy1;
            if det.abs() < DEGENERATE_EPSILON {
                return None;
            }
            (
                (dx3 * dy2 - dx2 * dy3) / det,
                (dx1 * dy3 - dx3 * dy1) / det,
            )
        };

        let perspective = Self {
            m: [
                [p1.x - p0.x + g * p1.x, p3.x - p0.x + h * p3.x, p0.x],
                [p1.y - p0.y + g * p1.y, p3.y - p0.y + h * p3.y, p0.y],
                [g, h, 1.0],
            ],
        };
        if perspective.determinant().abs() < DEGENERATE_EPSILON {
            return None;
        }
        Some(perspective)
    }

    fn determinant(&self) -> f32 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Transform mapping the corners of `rect` (clockwise from top-left)
    /// onto `quad`.
    pub fn rect_to_quad(rect: Rect, quad: [Point; 4]) -> Option<Self> {
        if rect.is_empty() {
            return None;
        }
        let to_unit = Self {
            m: [
                [1.0 / rect.width, 0.0, -rect.x / rect.width],
                [0.0, 1.0 / rect.height, -rect.y / rect.height],
                [0.0, 0.0, 1.0],
            ],
        };
        Some(Self::square_to_quad(quad)?.then(&to_unit))
    }

    /// `self` applied after `first`
    pub fn then(&self, first: &Perspective) -> Perspective {
        let mut m = [[0.0; 3]; 3];
        for (r, row) in m.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[r][k] * first.m[k][c]).sum();
            }
        }
        Perspective { m }
    }

    /// Map a point; `None` when it lands on the line at infinity
    pub fn map_point(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if w.abs() < DEGENERATE_EPSILON {
            return None;
        }
        Some(Point::new(
            (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w,
            (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w,
        ))
    }

    pub fn invert(&self) -> Option<Perspective> {
        let m = &self.m;
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        let adj = [
            [cof(1, 2, 1, 2), -cof(0, 2, 1, 2), cof(0, 1, 1, 2)],
            [-cof(1, 2, 0, 2), cof(0, 2, 0, 2), -cof(0, 1, 0, 2)],
            [cof(1, 2, 0, 1), -cof(0, 2, 0, 1), cof(0, 1, 0, 1)],
        ];
        let det = m[0][0] * adj[0][0] + m[0][1] * adj[1][0] + m[0][2] * adj[2][0];
        if det.abs() < DEGENERATE_EPSILON {
            return None;
        }
        let mut out = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                out[r][c] = adj[r][c] / det;
            }
        }
        Some(Perspective { m: out })
    }

    /// Bounding box of the mapped rectangle corners
    pub fn map_rect_bounds(&self, rect: Rect) -> Option<Rect> {
        let corners = rect.corners();
        let mut mapped = [Point::ZERO; 4];
        for (slot, corner) in mapped.iter_mut().zip(corners) {
            *slot = self.map_point(corner)?;
        }
        Rect::bounding(mapped)
    }
}

impl From<Transform2D> for Perspective {
    fn from(t: Transform2D) -> Self {
        Perspective {
            m: [[t.a, t.c, t.e], [t.b, t.d, t.f], [0.0, 0.0, 1.0]],
        }
    }
}
