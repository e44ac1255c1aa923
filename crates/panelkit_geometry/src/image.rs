//! Resource images resolved through the shared image cache

use std::sync::Arc;

use panelkit_image::ImageCache;
use panelkit_paint::{Area, Point, Raster, Rect};
use parking_lot::Mutex;
use tracing::debug;

use crate::geometry::{Geometry, Surface};

#[derive(Debug, Clone)]
enum Resolution {
    Unresolved,
    /// Lookup failed; never retried by this geometry
    Missing,
    Ready(Arc<Raster>),
}

/// A cached raster drawn at a fixed position, one raster pixel per panel unit.
///
/// The geometry keeps a handle to the cache it resolves through, so its area
/// is known before the first paint.
pub struct ImageGeometry {
    name: String,
    position: Point,
    foreground: bool,
    images: Arc<ImageCache>,
    resolution: Mutex<Resolution>,
}

impl ImageGeometry {
    /// Geometry that resolves `name` through `images` when first needed
    pub fn new(
        name: impl Into<String>,
        position: Point,
        foreground: bool,
        images: Arc<ImageCache>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            foreground,
            images,
            resolution: Mutex::new(Resolution::Unresolved),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Look the resource up unless that already happened. Returns the raster
    /// when it is available.
    ///
    /// Call it while a panel layout is rebuilt inside a cache run to mark the
    /// entry as used ahead of the first paint.
    pub fn resolve(&self) -> Option<Arc<Raster>> {
        let mut resolution = self.resolution.lock();
        if let Resolution::Unresolved = *resolution {
            *resolution = match self.images.lookup(&self.name) {
                Some(raster) => Resolution::Ready(raster),
                None => {
                    debug!(name = %self.name, "image geometry degrades to empty");
                    Resolution::Missing
                }
            };
        }
        match &*resolution {
            Resolution::Ready(raster) => Some(Arc::clone(raster)),
            _ => None,
        }
    }

    /// True once a lookup failed
    pub fn is_missing(&self) -> bool {
        matches!(*self.resolution.lock(), Resolution::Missing)
    }
}

impl Geometry for ImageGeometry {
    fn area(&self) -> Area {
        match self.resolve() {
            Some(raster) if !raster.is_empty() => Area::Rect(Rect::new(
                self.position.x,
                self.position.y,
                raster.width() as f32,
                raster.height() as f32,
            )),
            _ => Area::Empty,
        }
    }

    fn is_foreground(&self) -> bool {
        self.foreground
    }

    fn paint(&self, surface: &mut Surface<'_>) {
        let first_lookup = matches!(*self.resolution.lock(), Resolution::Unresolved);
        let Some(raster) = self.resolve() else {
            return;
        };
        if !first_lookup {
            // Keep the entry alive through the current cache run
            self.images.touch(&self.name);
        }
        let opacity = surface.opacity_for(self.foreground);
        surface.draw_raster(raster, self.position, opacity);
    }

    fn release(&self) {
        let mut resolution = self.resolution.lock();
        if let Resolution::Ready(_) = *resolution {
            *resolution = Resolution::Unresolved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::surface_commands;
    use panelkit_image::ImageError;
    use panelkit_paint::{DeviceId, PaintCommand, PaintContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(loads: Arc<AtomicUsize>) -> Arc<ImageCache> {
        Arc::new(ImageCache::new(move |name: &str| {
            loads.fetch_add(1, Ordering::SeqCst);
            if name == "missing" {
                Err(ImageError::NotFound(name.to_owned()))
            } else {
                Ok(Raster::new(4, 3))
            }
        }))
    }

    #[test]
    fn test_missing_image_is_empty_and_not_retried() {
        let loads = Arc::new(AtomicUsize::new(0));
        let images = cache(Arc::clone(&loads));
        let image = ImageGeometry::new("missing", Point::ZERO, false, Arc::clone(&images));
        let mut ctx = PaintContext::new(DeviceId::next(), 1.0);

        for _ in 0..3 {
            let commands = surface_commands(&mut ctx, |s| image.paint(s));
            assert!(commands.is_empty());
        }
        images.clear();
        surface_commands(&mut ctx, |s| image.paint(s));

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(image.is_missing());
        assert!(image.area().is_empty());
        assert_eq!(image.bounds(), Rect::ZERO);
    }

    #[test]
    fn test_area_known_before_first_paint() {
        let loads = Arc::new(AtomicUsize::new(0));
        let image = ImageGeometry::new("icon", Point::ZERO, false, cache(Arc::clone(&loads)));
        assert!(image.area().contains(Point::new(1.0, 1.0)));
        assert!(!image.is_missing());

        let image = ImageGeometry::new("icon", Point::new(5.0, 6.0), true, cache(loads));
        assert_eq!(image.bounds(), Rect::new(5.0, 6.0, 4.0, 3.0));
    }

    #[test]
    fn test_released_image_resolves_again() {
        let loads = Arc::new(AtomicUsize::new(0));
        let images = cache(Arc::clone(&loads));
        let image = ImageGeometry::new("icon", Point::ZERO, false, Arc::clone(&images));
        assert!(image.resolve().is_some());

        image.release();
        images.clear();
        assert!(!image.area().is_empty());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_repaint_touches_entry_during_cache_run() {
        let images = cache(Arc::new(AtomicUsize::new(0)));
        let image = ImageGeometry::new("icon", Point::ZERO, false, Arc::clone(&images));
        assert!(image.resolve().is_some());
        let mut ctx = PaintContext::new(DeviceId::next(), 1.0);

        images.begin_cache_run();
        let commands = surface_commands(&mut ctx, |s| image.paint(s));
        assert!(matches!(commands[0], PaintCommand::DrawRaster { .. }));
        assert_eq!(images.end_cache_run(), 0);
        assert!(images.contains("icon"));
    }
}
