//! Geometry modifiers: translate, scale or perspective-map another geometry

use std::cell::Cell;

use panelkit_paint::{Area, Perspective, Point, Rect, Transform2D};
use tracing::debug;

use crate::geometry::{Geometry, Surface};

/// How a wrapped geometry is mapped into its element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modifier {
    Translate { dx: f32, dy: f32 },
    /// Scale about the panel origin
    Scale { sx: f32, sy: f32 },
    Affine(Transform2D),
    Perspective(Perspective),
}

impl Modifier {
    /// Perspective mapping `rect` onto the convex quad `quad` (clockwise from
    /// top-left). `None` for a degenerate quad.
    pub fn perspective(rect: Rect, quad: [Point; 4]) -> Option<Self> {
        Perspective::rect_to_quad(rect, quad).map(Modifier::Perspective)
    }

    fn affine(&self) -> Option<Transform2D> {
        match *self {
            Modifier::Translate { dx, dy } => Some(Transform2D::translate(dx, dy)),
            Modifier::Scale { sx, sy } => Some(Transform2D::scale(sx, sy)),
            Modifier::Affine(transform) => Some(transform),
            Modifier::Perspective(_) => None,
        }
    }

    /// Map a point; `None` when a perspective sends it to infinity
    pub fn map_point(&self, p: Point) -> Option<Point> {
        match self {
            Modifier::Perspective(perspective) => perspective.map_point(p),
            other => other.affine().map(|t| t.map_point(p)),
        }
    }

    /// Map an area. A perspective that sends a vertex to infinity yields an
    /// empty area.
    pub fn map_area(&self, area: &Area) -> Area {
        if let Modifier::Translate { dx, dy } = *self {
            return area.translate(dx, dy);
        }
        let degenerate = Cell::new(false);
        let mapped = area.map_points(|p| {
            self.map_point(p).unwrap_or_else(|| {
                degenerate.set(true);
                p
            })
        });
        if degenerate.get() {
            debug!("modifier maps area through infinity");
            Area::Empty
        } else {
            mapped
        }
    }
}

/// A geometry drawn through a [`Modifier`]
pub struct Modified<G> {
    inner: G,
    modifier: Modifier,
}

impl<G: Geometry> Modified<G> {
    pub fn new(inner: G, modifier: Modifier) -> Self {
        Self { inner, modifier }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut G {
        &mut self.inner
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier
    }

    pub fn set_modifier(&mut self, modifier: Modifier) {
        self.modifier = modifier;
    }
}

impl<G: Geometry> Geometry for Modified<G> {
    fn area(&self) -> Area {
        self.modifier.map_area(&self.inner.area())
    }

    fn bounds(&self) -> Rect {
        match self.modifier {
            Modifier::Translate { dx, dy } => self.inner.bounds().translate(dx, dy),
            Modifier::Perspective(perspective) => perspective
                .map_rect_bounds(self.inner.bounds())
                .unwrap_or(Rect::ZERO),
            _ => self.area().bounds(),
        }
    }

    fn is_foreground(&self) -> bool {
        self.inner.is_foreground()
    }

    fn paint(&self, surface: &mut Surface<'_>) {
        match self.modifier.affine() {
            Some(transform) => {
                surface.push_transform(transform);
                self.inner.paint(surface);
                surface.pop_transform();
            }
            None => {
                if let Modifier::Perspective(perspective) = self.modifier {
                    surface.push_perspective(perspective);
                    self.inner.paint(surface);
                    surface.pop_perspective();
                }
            }
        }
    }

    fn release(&self) {
        self.inner.release();
    }
}

/// Wrap geometries with modifiers
pub trait GeometryExt: Geometry + Sized {
    fn translated(self, dx: f32, dy: f32) -> Modified<Self> {
        Modified::new(self, Modifier::Translate { dx, dy })
    }

    fn scaled(self, sx: f32, sy: f32) -> Modified<Self> {
        Modified::new(self, Modifier::Scale { sx, sy })
    }

    fn with_modifier(self, modifier: Modifier) -> Modified<Self> {
        Modified::new(self, modifier)
    }
}

impl<G: Geometry> GeometryExt for G {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::AreaGeometry;
    use crate::test_support::surface_commands;
    use panelkit_paint::{DeviceId, PaintCommand, PaintContext};

    fn unit_square() -> AreaGeometry {
        AreaGeometry::rect(Rect::new(0.0, 0.0, 10.0, 10.0), false)
    }

    #[test]
    fn test_translate_moves_area() {
        let moved = unit_square().translated(5.0, -2.0);
        assert_eq!(moved.bounds(), Rect::new(5.0, -2.0, 10.0, 10.0));
        assert!(moved.area().contains(Point::new(14.0, 7.0)));
        assert!(!moved.area().contains(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_scale_maps_area() {
        let scaled = unit_square().scaled(2.0, 0.5);
        let bounds = scaled.bounds();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 20.0, 5.0));
    }

    #[test]
    fn test_perspective_area_follows_quad() {
        let quad = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(15.0, 10.0),
            Point::new(5.0, 10.0),
        ];
        let modifier = Modifier::perspective(Rect::new(0.0, 0.0, 10.0, 10.0), quad).unwrap();
        let keystone = unit_square().with_modifier(modifier);

        let bounds = keystone.bounds();
        assert!((bounds.width - 20.0).abs() < 1e-3);
        assert!((bounds.height - 10.0).abs() < 1e-3);
        assert!(keystone.area().contains(Point::new(10.0, 5.0)));
        assert!(!keystone.area().contains(Point::new(1.0, 9.0)));
    }

    #[test]
    fn test_paint_wraps_inner_in_transform() {
        let moved = unit_square().translated(1.0, 1.0);
        let mut ctx = PaintContext::new(DeviceId::next(), 1.0);
        let commands = surface_commands(&mut ctx, |s| moved.paint(s));

        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], PaintCommand::PushTransform { .. }));
        assert!(matches!(commands[1], PaintCommand::FillPolygons { .. }));
        assert!(matches!(commands[2], PaintCommand::PopTransform));
        assert_eq!(ctx.transform_depth(), 0);
    }
}
