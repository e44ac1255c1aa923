//! Single-line text

use std::sync::Arc;

use panelkit_paint::{Area, DeviceId, Font, GlyphPosition, Point, Rect};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::geometry::{Geometry, Surface};

/// Average advance as a fraction of the font size
const ADVANCE_RATIO: f32 = 0.6;
const BOLD_ADVANCE_RATIO: f32 = 0.65;

/// A line of text.
///
/// `origin` is where the baseline starts; `hit_bounds` is the touchable
/// region, which usually extends beyond the glyphs.
pub struct TextGeometry {
    text: String,
    font: Font,
    origin: Point,
    descent: f32,
    hit_bounds: Rect,
    foreground: bool,
    layouts: Mutex<FxHashMap<DeviceId, Arc<[GlyphPosition]>>>,
}

impl TextGeometry {
    pub fn new(text: impl Into<String>, font: Font, origin: Point, hit_bounds: Rect) -> Self {
        let descent = font.size * 0.2;
        Self {
            text: text.into(),
            font,
            origin,
            descent,
            hit_bounds,
            foreground: true,
            layouts: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn with_descent(mut self, descent: f32) -> Self {
        self.descent = descent;
        self
    }

    /// Paint with the background color instead of the ink
    pub fn as_background(mut self) -> Self {
        self.foreground = false;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn descent(&self) -> f32 {
        self.descent
    }

    fn advance(&self) -> f32 {
        let ratio = if self.font.bold {
            BOLD_ADVANCE_RATIO
        } else {
            ADVANCE_RATIO
        };
        self.font.size * ratio
    }

    /// Approximate box covered by the glyphs, in panel units
    pub fn ink_bounds(&self) -> Rect {
        let width = self.advance() * self.text.chars().count() as f32;
        let ascent = self.font.size - self.descent;
        Rect::new(self.origin.x, self.origin.y - ascent, width, self.font.size)
    }

    /// Whether a glyph layout is cached for `device`
    pub fn has_layout_for(&self, device: DeviceId) -> bool {
        self.layouts.lock().contains_key(&device)
    }

    fn layout(&self, scale: f32) -> Arc<[GlyphPosition]> {
        let advance = self.advance();
        self.text
            .chars()
            .enumerate()
            .filter(|(_, ch)| !ch.is_whitespace())
            .map(|(i, ch)| GlyphPosition {
                ch,
                origin: Point::new(
                    (self.origin.x + advance * i as f32) * scale,
                    self.origin.y * scale,
                ),
            })
            .collect()
    }
}

impl Geometry for TextGeometry {
    fn area(&self) -> Area {
        Area::Rect(self.hit_bounds)
    }

    fn bounds(&self) -> Rect {
        self.hit_bounds
    }

    fn is_foreground(&self) -> bool {
        self.foreground
    }

    fn paint(&self, surface: &mut Surface<'_>) {
        let glyphs = {
            let mut layouts = self.layouts.lock();
            let scale = surface.scale();
            Arc::clone(
                layouts
                    .entry(surface.device())
                    .or_insert_with(|| self.layout(scale)),
            )
        };
        if glyphs.is_empty() {
            return;
        }
        let mut font = self.font.clone();
        font.size *= surface.scale();
        surface.set_font(font);
        let color = surface.color_for(self.foreground);
        surface.draw_glyphs(glyphs, color);
    }

    fn release(&self) {
        self.layouts.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::surface_commands;
    use panelkit_paint::{Color, PaintCommand, PaintContext};

    fn label() -> TextGeometry {
        TextGeometry::new(
            "OK GO",
            Font::new("mono", 10.0),
            Point::new(2.0, 12.0),
            Rect::new(0.0, 0.0, 40.0, 16.0),
        )
    }

    #[test]
    fn test_hit_bounds_differ_from_origin() {
        let text = label();
        assert_eq!(text.bounds(), Rect::new(0.0, 0.0, 40.0, 16.0));
        assert!(text.area().contains(Point::new(39.0, 15.0)));
        let ink = text.ink_bounds();
        assert_eq!(ink.origin(), Point::new(2.0, 4.0));
        assert!((ink.width - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_layout_built_lazily_and_released() {
        let text = label();
        let mut ctx = PaintContext::new(DeviceId::next(), 2.0);
        assert!(!text.has_layout_for(ctx.device()));

        let commands = surface_commands(&mut ctx, |s| text.paint(s));
        match &commands[0] {
            PaintCommand::DrawGlyphs { glyphs, font, color } => {
                assert_eq!(glyphs.len(), 4);
                assert_eq!(glyphs[0].origin, Point::new(4.0, 24.0));
                assert_eq!(font.size, 20.0);
                assert_eq!(*color, Color::BLACK);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(text.has_layout_for(ctx.device()));

        text.release();
        assert!(!text.has_layout_for(ctx.device()));
    }
}
