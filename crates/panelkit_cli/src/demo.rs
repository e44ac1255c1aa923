//! Synthetic panel driven headlessly
//!
//! The host side mutates a grid of buttons and syncs them every frame. The
//! screen side decodes each batch into a mirror, rebuilds element views from
//! it and paints them next to an async radar sweep.

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use panelkit_core::{
    decode_batch, encode_batch, ColorScheme, ElementId, ElementState, PanelState, ScreenMirror,
    Style, StyleCategory, StyleFlags, SyncSession, TouchState, UpdateFlags,
};
use panelkit_geometry::{
    AreaGeometry, AsyncGeometry, ElementView, Geometry, ImageGeometry, Producer, RenderContext,
    RenderError, Surface, TextGeometry,
};
use panelkit_image::{FileLoader, ImageCache};
use panelkit_paint::{DeviceId, Font, Path, PaintContext, Point, Raster, Rect};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PanelkitConfig;

const CELL: f32 = 48.0;
const COLUMNS: usize = 4;
const STATUS_ICON: &str = "icons/status.png";

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub frames: u64,
    pub elements: usize,
    /// Root for resource images; names resolve as given when absent
    pub assets: Option<PathBuf>,
    /// Drop the screen mirror every N frames; 0 never
    pub reconnect_every: u64,
    /// Device scale of the paint context
    pub scale: f32,
    /// Longest wait for the last radar frame after the loop
    pub settle: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            frames: 120,
            elements: 12,
            assets: None,
            reconnect_every: 0,
            scale: 1.0,
            settle: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DemoReport {
    pub cycles: u64,
    pub updates_sent: usize,
    pub bytes_sent: usize,
    pub repaints: usize,
    pub resyncs: usize,
    pub reconnects: u64,
    pub paint_commands: usize,
    pub images_evicted: usize,
    pub frames_published: u64,
    pub renders_failed: u64,
    pub renders_dropped: u64,
}

/// Radar sweep: a fading wedge behind the current angle
struct Sweep;

/// Angle of every pixel around the raster center
struct SweepField {
    width: u32,
    height: u32,
    angles: Vec<f32>,
}

impl SweepField {
    fn new(width: u32, height: u32) -> Self {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        let angles = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| (y as f32 + 0.5 - cy).atan2(x as f32 + 0.5 - cx).rem_euclid(TAU))
            .collect();
        Self {
            width,
            height,
            angles,
        }
    }
}

impl Producer for Sweep {
    type Input = f32;
    type Workspace = SweepField;

    fn initialize(&self, width: u32, height: u32) -> SweepField {
        SweepField::new(width, height)
    }

    fn apply(
        &self,
        field: &mut SweepField,
        target: &mut Raster,
        angle: &f32,
    ) -> Result<(), RenderError> {
        if !angle.is_finite() {
            return Err(RenderError::producer(format!("sweep angle {angle}")));
        }
        if (field.width, field.height) != (target.width(), target.height()) {
            *field = SweepField::new(target.width(), target.height());
        }
        const TRAIL: f32 = 1.2;
        for (px, pixel_angle) in target.pixels_mut().chunks_exact_mut(4).zip(&field.angles) {
            let behind = (angle - pixel_angle).rem_euclid(TAU);
            let glow = (1.0 - behind / TRAIL).max(0.0);
            px.copy_from_slice(&[0, (glow * 255.0) as u8, 0, 255]);
        }
        Ok(())
    }
}

/// Host side: authoritative element states
struct Host {
    elements: Vec<(ElementId, ElementState)>,
    session: SyncSession,
}

impl Host {
    fn new(count: usize, full_every: u64) -> Self {
        let elements = (0..count)
            .map(|i| {
                let style = match i % 5 {
                    3 => Style::new(StyleCategory::Warning).with(StyleFlags::BLINKING),
                    4 => Style::new(StyleCategory::Display),
                    _ => Style::new(StyleCategory::Button),
                };
                (ElementId(i as u64), ElementState::new(cell(i), style))
            })
            .collect();
        Self {
            elements,
            session: SyncSession::new(full_every),
        }
    }

    /// Scripted edits: a rolling touch, a fading display and a drifting tile
    fn step(&mut self, frame: u64) {
        let count = self.elements.len() as u64;
        if count == 0 {
            return;
        }
        let pressed = (frame % count) as usize;
        for (i, (_, state)) in self.elements.iter_mut().enumerate() {
            state.set_touch(if i == pressed {
                TouchState::PRESSED
            } else {
                TouchState::UNTOUCHED
            });
            if i % 5 == 4 {
                state.set_alpha(0.25 + 0.75 * ((frame % 8) as f32 / 7.0));
            }
        }
        if let Some((_, state)) = self.elements.last_mut() {
            let base = cell(count as usize - 1);
            state.set_bounds(Some(base.translate((frame % 6) as f32, 0.0)));
        }
    }

    fn sync(&mut self) -> Result<Vec<u8>> {
        let batch = self
            .session
            .collect_cycle(self.elements.iter_mut().map(|(id, state)| (*id, state)));
        debug!(cycle = batch.cycle, updates = batch.len(), "sync cycle");
        Ok(encode_batch(&batch)?)
    }
}

/// Screen side: mirrored states and the views painted from them
struct Screen {
    mirror: ScreenMirror,
    views: BTreeMap<ElementId, ElementView>,
    images: Arc<ImageCache>,
}

impl Screen {
    fn new(images: Arc<ImageCache>) -> Self {
        Self {
            mirror: ScreenMirror::new(),
            views: BTreeMap::new(),
            images,
        }
    }

    /// Apply a received batch, returning elements to resync and repaints
    fn receive(&mut self, bytes: &[u8]) -> Result<(Vec<ElementId>, usize)> {
        let batch = decode_batch(bytes).context("Failed to decode update batch")?;
        let outcome = self.mirror.apply_batch(batch);
        for (id, flags) in &outcome.repaint {
            let Some(state) = self.mirror.get(*id) else {
                self.views.remove(id);
                continue;
            };
            match self.views.get_mut(id) {
                Some(view) if !flags.contains(UpdateFlags::BOUNDS) => {
                    view.replace_state(state.clone());
                }
                // Geometries are laid out from the bounds, so a move rebuilds them
                _ => {
                    let view = build_view(*id, state.clone(), &self.images);
                    self.views.insert(*id, view);
                }
            }
        }
        Ok((outcome.resync, outcome.repaint.len()))
    }
}

fn cell(index: usize) -> Rect {
    let col = (index % COLUMNS) as f32;
    let row = (index / COLUMNS) as f32;
    Rect::new(col * (CELL + 4.0), row * (CELL + 4.0), CELL, CELL)
}

fn build_view(id: ElementId, state: ElementState, images: &Arc<ImageCache>) -> ElementView {
    let bounds = state.bounds().unwrap_or(Rect::ZERO);
    let label = TextGeometry::new(
        format!("E{}", id.0),
        Font::new("sans", 12.0),
        Point::new(bounds.x + 6.0, bounds.y + bounds.height / 2.0),
        bounds,
    );
    let mut view = ElementView::new(state)
        .with_geometry(AreaGeometry::rect(bounds, false))
        .with_geometry(AreaGeometry::outline(Path::rect(bounds), true).with_stroke_width(1.0))
        .with_geometry(label);
    if id.0 % 3 == 0 {
        let icon = ImageGeometry::new(
            STATUS_ICON,
            Point::new(bounds.right() - 16.0, bounds.y + 4.0),
            true,
            Arc::clone(images),
        );
        view.push_geometry(Box::new(icon));
    }
    view
}

/// Run the scripted panel for `options.frames` frames
pub fn run(config: &PanelkitConfig, options: &DemoOptions) -> Result<DemoReport> {
    let images = Arc::new(match &options.assets {
        Some(root) => ImageCache::new(FileLoader::new(root)),
        None => ImageCache::new(FileLoader::unrooted()),
    });
    let render = RenderContext::new(&config.render).context("Failed to start render lanes")?;
    info!(
        lanes = render.lane_count(),
        elements = options.elements,
        frames = options.frames,
        "starting panel"
    );

    let mut host = Host::new(options.elements, config.sync.full_every);
    let mut screen = Screen::new(Arc::clone(&images));
    let mut panel = PanelState::new(Arc::new(ColorScheme::night()));
    let rows = options.elements.div_ceil(COLUMNS) as f32;
    let mut radar = AsyncGeometry::new(Rect::new(
        COLUMNS as f32 * (CELL + 4.0),
        0.0,
        CELL * 2.0,
        (rows * (CELL + 4.0)).max(CELL * 2.0),
    ));
    radar.set_producer(Sweep);

    let device = DeviceId::next();
    let mut report = DemoReport::default();

    for frame in 0..options.frames {
        if options.reconnect_every > 0 && frame > 0 && frame % options.reconnect_every == 0 {
            warn!(frame, "screen reconnected, resyncing");
            screen = Screen::new(Arc::clone(&images));
            host.session.reset();
            report.reconnects += 1;
        }
        if frame % 15 == 0 {
            panel.toggle_blink();
        }

        host.step(frame);
        let bytes = host.sync()?;
        report.cycles += 1;
        report.bytes_sent += bytes.len();
        report.updates_sent += decode_batch(&bytes)?.len();

        let (resync, repaints) = screen.receive(&bytes)?;
        report.repaints += repaints;
        if !resync.is_empty() {
            warn!(count = resync.len(), "screen missed elements, forcing full sync");
            report.resyncs += resync.len();
            host.session.force_full();
        }

        radar.set_input(frame as f32 * 0.15);
        radar.invalidate(&render)?;

        let refresh = config.cache.refresh_frames > 0 && frame % config.cache.refresh_frames == 0;
        if refresh {
            images.begin_cache_run();
        }
        let mut ctx = PaintContext::new(device, options.scale);
        {
            let mut surface = Surface::new(&mut ctx).with_render_context(&render);
            for view in screen.views.values() {
                view.paint(&mut surface, &panel);
            }
            radar.paint(&mut surface);
        }
        report.paint_commands += ctx.commands().len();
        if refresh {
            report.images_evicted += images.end_cache_run();
        }
    }

    let deadline = Instant::now() + options.settle;
    let expected = options.frames.min(1);
    while render.stats().published < expected && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    let stats = render.stats();
    report.frames_published = stats.published;
    report.renders_failed = stats.failed;
    report.renders_dropped = stats.dropped;
    info!(?stats, "panel finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelkit_image::ImageError;

    fn blank_screen() -> Screen {
        Screen::new(Arc::new(ImageCache::new(|name: &str| -> panelkit_image::Result<Raster> {
            Err(ImageError::NotFound(name.to_owned()))
        })))
    }

    fn quick(frames: u64) -> DemoOptions {
        DemoOptions {
            frames,
            elements: 6,
            ..DemoOptions::default()
        }
    }

    #[test]
    fn test_first_cycle_sends_every_element() {
        let mut host = Host::new(5, 0);
        let mut screen = blank_screen();
        let bytes = host.sync().unwrap();
        let (resync, repaints) = screen.receive(&bytes).unwrap();
        assert!(resync.is_empty());
        assert_eq!(repaints, 5);
        assert_eq!(screen.views.len(), 5);

        let bytes = host.sync().unwrap();
        assert!(decode_batch(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_reconnected_screen_asks_for_resync() {
        let mut host = Host::new(3, 0);
        let mut screen = blank_screen();
        screen.receive(&host.sync().unwrap()).unwrap();

        let mut fresh = blank_screen();
        host.step(1);
        let (resync, _) = fresh.receive(&host.sync().unwrap()).unwrap();
        assert!(!resync.is_empty());

        host.session.force_full();
        let (resync, repaints) = fresh.receive(&host.sync().unwrap()).unwrap();
        assert!(resync.is_empty());
        assert_eq!(repaints, 3);
    }

    #[test]
    fn test_sweep_lights_pixels_behind_angle() {
        let mut field = Sweep.initialize(8, 8);
        let mut raster = Raster::new(8, 8);
        Sweep.apply(&mut field, &mut raster, &0.3).unwrap();
        // Right of center at angle 0 sits just behind the sweep
        assert!(raster.pixel(7, 4).unwrap()[1] > 0);
        assert!(Sweep.apply(&mut field, &mut raster, &f32::NAN).is_err());
    }

    #[test]
    fn test_run_reports_activity() {
        let report = run(&PanelkitConfig::default(), &quick(10)).unwrap();
        assert_eq!(report.cycles, 10);
        assert!(report.updates_sent >= 6);
        assert!(report.paint_commands > 0);
        assert_eq!(report.renders_failed, 0);
    }

    #[test]
    fn test_reconnects_are_recovered() {
        let options = DemoOptions {
            reconnect_every: 4,
            ..quick(12)
        };
        let report = run(&PanelkitConfig::default(), &options).unwrap();
        assert_eq!(report.reconnects, 2);
    }
}
