//! Paint context - the recording drawing API
//!
//! A `PaintContext` belongs to one paint device (a screen or an offscreen
//! target). Geometries record commands into it; the screen backend replays
//! them. Device-specific caches held by geometries are keyed by
//! [`DeviceId`] so a geometry painted on two devices keeps two caches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::area::Polygon;
use crate::color::Color;
use crate::path::Point;
use crate::primitives::*;
use crate::raster::Raster;
use crate::transform::{Perspective, Transform2D};

/// Identity of a paint device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeviceId(u64);

static NEXT_DEVICE_ID: AtomicU64 = AtomicU64::new(1);

impl DeviceId {
    /// Allocate a fresh, process-unique device id
    pub fn next() -> Self {
        Self(NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// Font descriptor. Changing the font is color-neutral, so geometries may
/// do it freely while painting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    #[serde(default)]
    pub bold: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 14.0)
    }
}

/// Fill style for shapes
#[derive(Clone, Debug, PartialEq)]
pub enum FillStyle {
    Color(Color),
}

impl From<Color> for FillStyle {
    fn from(color: Color) -> Self {
        FillStyle::Color(color)
    }
}

/// Stroke style
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// One positioned glyph of a laid-out text run, in device pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPosition {
    pub ch: char,
    pub origin: Point,
}

/// A paint command for the renderer
#[derive(Clone, Debug)]
pub enum PaintCommand {
    FillRect {
        rect: Rect,
        style: FillStyle,
    },
    StrokeRect {
        rect: Rect,
        style: StrokeStyle,
    },
    FillPolygons {
        polygons: Arc<[Polygon]>,
        style: FillStyle,
    },
    StrokePolygons {
        polygons: Arc<[Polygon]>,
        style: StrokeStyle,
    },
    DrawGlyphs {
        glyphs: Arc<[GlyphPosition]>,
        font: Font,
        color: Color,
    },
    DrawRaster {
        raster: Arc<Raster>,
        position: Point,
        opacity: f32,
    },
    PushClip {
        rect: Rect,
    },
    PopClip,
    PushTransform {
        transform: Transform2D,
    },
    PopTransform,
    PushPerspective {
        perspective: Perspective,
    },
    PopPerspective,
}

/// The paint context used for drawing into one device
pub struct PaintContext {
    device: DeviceId,
    scale: f32,
    commands: Vec<PaintCommand>,
    font: Font,
    transform_depth: usize,
    clip_stack: Vec<Rect>,
}

impl PaintContext {
    /// Create a context for `device` where one panel unit is `scale` pixels
    pub fn new(device: DeviceId, scale: f32) -> Self {
        Self {
            device,
            scale,
            commands: Vec::new(),
            font: Font::default(),
            transform_depth: 0,
            clip_stack: Vec::new(),
        }
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    // === State ===

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    // === Shape drawing ===

    pub fn fill_rect(&mut self, rect: Rect, style: impl Into<FillStyle>) {
        self.commands.push(PaintCommand::FillRect {
            rect,
            style: style.into(),
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands.push(PaintCommand::StrokeRect {
            rect,
            style: StrokeStyle { color, width },
        });
    }

    pub fn fill_polygons(&mut self, polygons: Arc<[Polygon]>, style: impl Into<FillStyle>) {
        self.commands.push(PaintCommand::FillPolygons {
            polygons,
            style: style.into(),
        });
    }

    pub fn stroke_polygons(&mut self, polygons: Arc<[Polygon]>, color: Color, width: f32) {
        self.commands.push(PaintCommand::StrokePolygons {
            polygons,
            style: StrokeStyle { color, width },
        });
    }

    // === Text ===

    pub fn draw_glyphs(&mut self, glyphs: Arc<[GlyphPosition]>, color: Color) {
        self.commands.push(PaintCommand::DrawGlyphs {
            glyphs,
            font: self.font.clone(),
            color,
        });
    }

    // === Images ===

    pub fn draw_raster(&mut self, raster: Arc<Raster>, position: Point, opacity: f32) {
        if raster.is_empty() {
            return;
        }
        self.commands.push(PaintCommand::DrawRaster {
            raster,
            position,
            opacity,
        });
    }

    // === Clipping ===

    pub fn push_clip(&mut self, rect: Rect) {
        self.clip_stack.push(rect);
        self.commands.push(PaintCommand::PushClip { rect });
    }

    pub fn pop_clip(&mut self) {
        if self.clip_stack.pop().is_some() {
            self.commands.push(PaintCommand::PopClip);
        } else {
            tracing::warn!("pop_clip called with an empty clip stack");
        }
    }

    // === Transforms ===

    pub fn push_transform(&mut self, transform: Transform2D) {
        self.transform_depth += 1;
        self.commands
            .push(PaintCommand::PushTransform { transform });
    }

    pub fn pop_transform(&mut self) {
        self.transform_depth = self.transform_depth.saturating_sub(1);
        self.commands.push(PaintCommand::PopTransform);
    }

    pub fn push_perspective(&mut self, perspective: Perspective) {
        self.transform_depth += 1;
        self.commands
            .push(PaintCommand::PushPerspective { perspective });
    }

    pub fn pop_perspective(&mut self) {
        self.transform_depth = self.transform_depth.saturating_sub(1);
        self.commands.push(PaintCommand::PopPerspective);
    }

    /// Number of transforms currently pushed
    pub fn transform_depth(&self) -> usize {
        self.transform_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_ids_are_unique() {
        assert_ne!(DeviceId::next(), DeviceId::next());
    }

    #[test]
    fn test_empty_raster_is_skipped() {
        let mut ctx = PaintContext::new(DeviceId::next(), 1.0);
        ctx.draw_raster(Arc::new(Raster::new(0, 5)), Point::ZERO, 1.0);
        assert!(ctx.commands().is_empty());
        ctx.draw_raster(Arc::new(Raster::new(1, 1)), Point::ZERO, 1.0);
        assert_eq!(ctx.commands().len(), 1);
    }

    #[test]
    fn test_unbalanced_pop_clip_is_ignored() {
        let mut ctx = PaintContext::new(DeviceId::next(), 1.0);
        ctx.pop_clip();
        assert!(ctx.commands().is_empty());
        ctx.push_clip(Rect::new(0.0, 0.0, 1.0, 1.0));
        ctx.pop_clip();
        assert_eq!(ctx.commands().len(), 2);
    }

    #[test]
    fn test_font_roundtrip_defaults() {
        let font: Font = serde_json::from_str(r#"{"family":"mono","size":12.0}"#).unwrap();
        assert_eq!(font, Font::new("mono", 12.0));
    }
}
