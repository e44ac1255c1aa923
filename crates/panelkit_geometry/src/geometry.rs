//! The geometry contract and the surface geometries paint into
//!
//! A geometry is one drawable primitive of an element. Paint coordinates are
//! panel units; the [`Surface`] converts them to device pixels using the
//! paint context's scale.

use std::sync::Arc;

use panelkit_paint::{
    Area, Color, DeviceId, Font, GlyphPosition, PaintContext, Perspective, Point, Polygon, Raster,
    Rect, Transform2D,
};

use crate::render::RenderContext;

/// One drawable primitive
pub trait Geometry: Send + Sync {
    /// Exact covered region in panel units, for hit testing and dirty regions
    fn area(&self) -> Area;

    /// Bounding rectangle in panel units
    fn bounds(&self) -> Rect {
        self.area().bounds()
    }

    /// Foreground geometries paint with the surface ink, background ones with
    /// the element's background color. Fixed at construction.
    fn is_foreground(&self) -> bool;

    /// Draw into `surface`. Must be idempotent and cheap when nothing changed.
    fn paint(&self, surface: &mut Surface<'_>);

    /// Drop cached device resources
    fn release(&self) {}
}

/// Where geometries paint: a paint context plus the colors and services of
/// the element being drawn.
///
/// Colors are read-only; a geometry may only change the font.
pub struct Surface<'a> {
    ctx: &'a mut PaintContext,
    render: Option<&'a RenderContext>,
    ink: Color,
    background: Color,
    opacity: f32,
}

impl<'a> Surface<'a> {
    pub fn new(ctx: &'a mut PaintContext) -> Self {
        Self {
            ctx,
            render: None,
            ink: Color::BLACK,
            background: Color::WHITE,
            opacity: 1.0,
        }
    }

    /// Attach the registry async geometries read their buffers from
    pub fn with_render_context(mut self, render: &'a RenderContext) -> Self {
        self.render = Some(render);
        self
    }

    /// Set the element colors for the geometries painted next
    pub fn with_colors(mut self, ink: Color, background: Color, opacity: f32) -> Self {
        self.ink = ink;
        self.background = background;
        self.opacity = opacity;
        self
    }

    pub(crate) fn set_colors(&mut self, ink: Color, background: Color, opacity: f32) {
        self.ink = ink;
        self.background = background;
        self.opacity = opacity;
    }

    pub fn ink(&self) -> Color {
        self.ink
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Background opacity, already clamped
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Color for a geometry of the given kind; background colors are faded
    /// by the element opacity
    pub fn color_for(&self, foreground: bool) -> Color {
        if foreground {
            self.ink
        } else {
            self.background.fade(self.opacity)
        }
    }

    /// Opacity for a geometry of the given kind
    pub fn opacity_for(&self, foreground: bool) -> f32 {
        if foreground {
            1.0
        } else {
            self.opacity
        }
    }

    pub fn render_context(&self) -> Option<&'a RenderContext> {
        self.render
    }

    pub fn device(&self) -> DeviceId {
        self.ctx.device()
    }

    pub fn scale(&self) -> f32 {
        self.ctx.scale()
    }

    pub fn font(&self) -> &Font {
        self.ctx.font()
    }

    pub fn set_font(&mut self, font: Font) {
        self.ctx.set_font(font);
    }

    pub fn to_device_point(&self, p: Point) -> Point {
        let scale = self.scale();
        Point::new(p.x * scale, p.y * scale)
    }

    pub fn to_device_rect(&self, rect: Rect) -> Rect {
        let scale = self.scale();
        Rect::new(rect.x * scale, rect.y * scale, rect.width * scale, rect.height * scale)
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = self.to_device_rect(rect);
        self.ctx.fill_rect(rect, color);
    }

    pub(crate) fn fill_polygons(&mut self, polygons: Arc<[Polygon]>, color: Color) {
        self.ctx.fill_polygons(polygons, color);
    }

    pub(crate) fn stroke_polygons(&mut self, polygons: Arc<[Polygon]>, color: Color, width: f32) {
        let width = width * self.scale();
        self.ctx.stroke_polygons(polygons, color, width);
    }

    pub(crate) fn draw_glyphs(&mut self, glyphs: Arc<[GlyphPosition]>, color: Color) {
        self.ctx.draw_glyphs(glyphs, color);
    }

    pub(crate) fn draw_raster(&mut self, raster: Arc<Raster>, position: Point, opacity: f32) {
        let position = self.to_device_point(position);
        self.ctx.draw_raster(raster, position, opacity);
    }

    /// Push a transform given in panel units
    pub(crate) fn push_transform(&mut self, transform: Transform2D) {
        let scale = self.scale();
        let device = Transform2D::scale(scale, scale)
            .then(&transform)
            .then(&Transform2D::scale(1.0 / scale, 1.0 / scale));
        self.ctx.push_transform(device);
    }

    pub(crate) fn pop_transform(&mut self) {
        self.ctx.pop_transform();
    }

    /// Push a perspective given in panel units
    pub(crate) fn push_perspective(&mut self, perspective: Perspective) {
        let scale = self.scale();
        let to_device = Perspective::from(Transform2D::scale(scale, scale));
        let to_panel = Perspective::from(Transform2D::scale(1.0 / scale, 1.0 / scale));
        self.ctx
            .push_perspective(to_device.then(&perspective.then(&to_panel)));
    }

    pub(crate) fn pop_perspective(&mut self) {
        self.ctx.pop_perspective();
    }
}
