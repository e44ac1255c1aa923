//! Filled or outlined vector shapes

use std::sync::Arc;

use panelkit_paint::{Area, DeviceId, Path, Polygon, Rect};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::geometry::{Geometry, Surface};

/// Maximum device-pixel segment length when flattening curves for paint
const PAINT_TOLERANCE: f32 = 0.25;

/// A region described by a resolution-independent path
pub struct AreaGeometry {
    path: Path,
    filled: bool,
    foreground: bool,
    stroke_width: f32,
    /// Flattened device paths, one per device painted on
    device_paths: Mutex<FxHashMap<DeviceId, Arc<[Polygon]>>>,
}

impl AreaGeometry {
    pub fn new(path: Path, filled: bool, foreground: bool) -> Self {
        Self {
            path,
            filled,
            foreground,
            stroke_width: 1.0,
            device_paths: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn filled(path: Path, foreground: bool) -> Self {
        Self::new(path, true, foreground)
    }

    pub fn outline(path: Path, foreground: bool) -> Self {
        Self::new(path, false, foreground)
    }

    /// Filled rectangle, the usual element background
    pub fn rect(rect: Rect, foreground: bool) -> Self {
        Self::filled(Path::rect(rect), foreground)
    }

    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Replace the shape; the only operation that drops cached device paths
    pub fn set_shape(&mut self, path: Path) {
        self.path = path;
        self.device_paths.get_mut().clear();
    }

    /// Whether a flattened path is cached for `device`
    pub fn is_cached_for(&self, device: DeviceId) -> bool {
        self.device_paths.lock().contains_key(&device)
    }
}

impl Geometry for AreaGeometry {
    fn area(&self) -> Area {
        Area::from_path(&self.path)
    }

    fn bounds(&self) -> Rect {
        self.path.bounds().unwrap_or(Rect::ZERO)
    }

    fn is_foreground(&self) -> bool {
        self.foreground
    }

    fn paint(&self, surface: &mut Surface<'_>) {
        let polygons = {
            let mut cache = self.device_paths.lock();
            let scale = surface.scale();
            Arc::clone(
                cache
                    .entry(surface.device())
                    .or_insert_with(|| self.path.flatten(scale, PAINT_TOLERANCE).into()),
            )
        };
        if polygons.is_empty() {
            return;
        }

        let color = surface.color_for(self.foreground);
        if self.filled {
            surface.fill_polygons(polygons, color);
        } else {
            surface.stroke_polygons(polygons, color, self.stroke_width);
        }
    }

    fn release(&self) {
        self.device_paths.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::surface_commands;
    use panelkit_paint::{PaintCommand, PaintContext, PathBuilder, Point};

    fn triangle() -> Path {
        PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(0.0, 10.0)
            .close()
            .build()
    }

    #[test]
    fn test_area_hit_test() {
        let shape = AreaGeometry::filled(triangle(), false);
        let area = shape.area();
        assert!(area.contains(Point::new(2.0, 2.0)));
        assert!(!area.contains(Point::new(9.0, 9.0)));
        assert_eq!(shape.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_device_path_cached_until_shape_changes() {
        let mut shape = AreaGeometry::filled(triangle(), false);
        let mut ctx = PaintContext::new(panelkit_paint::DeviceId::next(), 2.0);

        let first = surface_commands(&mut ctx, |s| shape.paint(s));
        let second = surface_commands(&mut ctx, |s| shape.paint(s));
        match (&first[0], &second[0]) {
            (
                PaintCommand::FillPolygons { polygons: a, .. },
                PaintCommand::FillPolygons { polygons: b, .. },
            ) => assert!(Arc::ptr_eq(a, b)),
            other => panic!("unexpected commands {other:?}"),
        }
        assert!(shape.is_cached_for(ctx.device()));

        shape.set_shape(Path::rect(Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(!shape.is_cached_for(ctx.device()));
    }

    #[test]
    fn test_outline_strokes_in_device_units() {
        let shape = AreaGeometry::outline(triangle(), true).with_stroke_width(1.5);
        let mut ctx = PaintContext::new(panelkit_paint::DeviceId::next(), 2.0);
        let commands = surface_commands(&mut ctx, |s| shape.paint(s));
        match &commands[0] {
            PaintCommand::StrokePolygons { style, .. } => assert_eq!(style.width, 3.0),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_release_drops_cache() {
        let shape = AreaGeometry::rect(Rect::new(0.0, 0.0, 4.0, 4.0), false);
        let mut ctx = PaintContext::new(panelkit_paint::DeviceId::next(), 1.0);
        surface_commands(&mut ctx, |s| shape.paint(s));
        shape.release();
        assert!(!shape.is_cached_for(ctx.device()));
    }
}
