//! Path building and representation

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::area::Polygon;
use crate::primitives::Rect;

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo {
        control: Point,
        end: Point,
    },
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    ArcTo {
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    },
    Close,
}

/// Upper bound on segments emitted for one curve
const MAX_CURVE_SEGMENTS: usize = 64;

/// A 2D path composed of commands
///
/// Paths are resolution independent; `flatten` produces the device-specific
/// polygon representation for a given scale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: SmallVec<[PathCommand; 16]>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed rectangle outline
    pub fn rect(rect: Rect) -> Self {
        PathBuilder::new()
            .move_to(rect.x, rect.y)
            .line_to(rect.right(), rect.y)
            .line_to(rect.right(), rect.bottom())
            .line_to(rect.x, rect.bottom())
            .close()
            .build()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Approximate the path by polygons in device space.
    ///
    /// `scale` maps path units to device pixels and `tolerance` is the
    /// maximum segment length in device pixels used for curves.
    pub fn flatten(&self, scale: f32, tolerance: f32) -> Vec<Polygon> {
        let tolerance = tolerance.max(0.01);
        let mut polygons = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let mut cursor = Point::ZERO;
        let mut start = Point::ZERO;

        let scaled = |p: Point| Point::new(p.x * scale, p.y * scale);
        let segments = |length: f32| {
            ((length * scale / tolerance).ceil() as usize).clamp(1, MAX_CURVE_SEGMENTS)
        };

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        polygons.push(Polygon::new(std::mem::take(&mut current), false));
                    }
                    current.clear();
                    current.push(scaled(p));
                    cursor = p;
                    start = p;
                }
                PathCommand::LineTo(p) => {
                    if current.is_empty() {
                        current.push(scaled(cursor));
                    }
                    current.push(scaled(p));
                    cursor = p;
                }
                PathCommand::QuadTo { control, end } => {
                    if current.is_empty() {
                        current.push(scaled(cursor));
                    }
                    let n = segments(cursor.distance(control) + control.distance(end));
                    for i in 1..=n {
                        let t = i as f32 / n as f32;
                        let a = cursor.lerp(control, t);
                        let b = control.lerp(end, t);
                        current.push(scaled(a.lerp(b, t)));
                    }
                    cursor = end;
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    if current.is_empty() {
                        current.push(scaled(cursor));
                    }
                    let n = segments(
                        cursor.distance(control1)
                            + control1.distance(control2)
                            + control2.distance(end),
                    );
                    for i in 1..=n {
                        let t = i as f32 / n as f32;
                        let ab = cursor.lerp(control1, t);
                        let bc = control1.lerp(control2, t);
                        let cd = control2.lerp(end, t);
                        let abc = ab.lerp(bc, t);
                        let bcd = bc.lerp(cd, t);
                        current.push(scaled(abc.lerp(bcd, t)));
                    }
                    cursor = end;
                }
                PathCommand::ArcTo {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    let sweep = end_angle - start_angle;
                    let n = segments((sweep * radius).abs());
                    for i in 0..=n {
                        let angle = start_angle + sweep * (i as f32 / n as f32);
                        let p = Point::new(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        );
                        current.push(scaled(p));
                        cursor = p;
                    }
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        polygons.push(Polygon::new(std::mem::take(&mut current), true));
                    }
                    current.clear();
                    cursor = start;
                }
            }
        }

        if current.len() > 1 {
            polygons.push(Polygon::new(current, false));
        }
        polygons
    }

    /// Bounds of the path's control polygon
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.commands.iter().flat_map(|command| {
            let points: SmallVec<[Point; 3]> = match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => smallvec::smallvec![p],
                PathCommand::QuadTo { control, end } => smallvec::smallvec![control, end],
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => smallvec::smallvec![control1, control2, end],
                PathCommand::ArcTo { center, radius, .. } => smallvec::smallvec![
                    Point::new(center.x - radius, center.y - radius),
                    Point::new(center.x + radius, center.y + radius),
                ],
                PathCommand::Close => SmallVec::new(),
            };
            points
        }))
    }
}

/// Builder for constructing paths
pub struct PathBuilder {
    path: Path,
    current: Point,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            path: Path::new(),
            current: Point::ZERO,
        }
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        let point = Point::new(x, y);
        self.path.commands.push(PathCommand::MoveTo(point));
        self.current = point;
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        let point = Point::new(x, y);
        self.path.commands.push(PathCommand::LineTo(point));
        self.current = point;
        self
    }

    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        let end = Point::new(x, y);
        self.path.commands.push(PathCommand::QuadTo {
            control: Point::new(cx, cy),
            end,
        });
        self.current = end;
        self
    }

    pub fn cubic_to(mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> Self {
        let end = Point::new(x, y);
        self.path.commands.push(PathCommand::CubicTo {
            control1: Point::new(c1x, c1y),
            control2: Point::new(c2x, c2y),
            end,
        });
        self.current = end;
        self
    }

    pub fn arc_to(mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) -> Self {
        self.path.commands.push(PathCommand::ArcTo {
            center: Point::new(cx, cy),
            radius,
            start_angle: start,
            end_angle: end,
        });
        self.current = Point::new(cx + radius * end.cos(), cy + radius * end.sin());
        self
    }

    pub fn close(mut self) -> Self {
        self.path.commands.push(PathCommand::Close);
        self
    }

    pub fn build(self) -> Path {
        self.path
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}
