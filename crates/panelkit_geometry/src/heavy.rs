//! Async-rendered ("heavy") geometries
//!
//! An [`AsyncGeometry`] is a lightweight descriptor: bounds, an id, and the
//! latest input and producer with dirty flags. Rendering happens on the
//! [`RenderContext`] lane owning its id; painting only draws whichever frame
//! was last published.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use panelkit_paint::{Area, Rect};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{GeometryError, RenderError};
use crate::geometry::{Geometry, Surface};
use crate::pool::Submission;
use crate::producer::Producer;
use crate::render::{RenderContext, RenderTask};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an async geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryId(u64);

impl GeometryId {
    /// Allocate the next id; ids increase monotonically
    pub fn next() -> Self {
        Self(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Serializable part of an async geometry, enough to reattach to its worker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsyncDescriptor {
    pub id: GeometryId,
    pub bounds: Rect,
    #[serde(default)]
    pub foreground: bool,
}

fn check_dimensions(bounds: &Rect) -> Result<(), GeometryError> {
    let (width, height) = (bounds.width, bounds.height);
    if width < 0.0 || height < 0.0 {
        return Err(GeometryError::NegativeDimension { width, height });
    }
    if !width.is_finite() || !height.is_finite() {
        return Err(GeometryError::NonFiniteDimension { width, height });
    }
    Ok(())
}

fn assert_dimensions(bounds: &Rect) {
    if let Err(err) = check_dimensions(bounds) {
        panic!("{err}");
    }
}

/// A geometry whose pixels come from a [`Producer`] on a worker lane
pub struct AsyncGeometry<P: Producer> {
    id: GeometryId,
    bounds: Rect,
    foreground: bool,
    input: Option<Arc<P::Input>>,
    input_dirty: bool,
    producer: Option<Arc<P>>,
    producer_dirty: bool,
}

impl<P: Producer> AsyncGeometry<P> {
    /// New geometry with a fresh id.
    ///
    /// # Panics
    ///
    /// Panics if `bounds` has a negative or non-finite width or height.
    pub fn new(bounds: Rect) -> Self {
        Self::with_id(GeometryId::next(), bounds)
    }

    /// Fallible [`new`](Self::new)
    pub fn try_new(bounds: Rect) -> Result<Self, GeometryError> {
        check_dimensions(&bounds)?;
        Ok(Self::with_id(GeometryId::next(), bounds))
    }

    /// Geometry reusing `id`, so it reattaches to an existing worker.
    ///
    /// # Panics
    ///
    /// Panics if `bounds` has a negative or non-finite width or height.
    pub fn with_id(id: GeometryId, bounds: Rect) -> Self {
        assert_dimensions(&bounds);
        Self {
            id,
            bounds,
            foreground: false,
            input: None,
            input_dirty: false,
            producer: None,
            producer_dirty: false,
        }
    }

    pub fn from_descriptor(descriptor: AsyncDescriptor) -> Self {
        let mut geometry = Self::with_id(descriptor.id, descriptor.bounds);
        geometry.foreground = descriptor.foreground;
        geometry
    }

    pub fn descriptor(&self) -> AsyncDescriptor {
        AsyncDescriptor {
            id: self.id,
            bounds: self.bounds,
            foreground: self.foreground,
        }
    }

    pub fn as_foreground(mut self) -> Self {
        self.foreground = true;
        self
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn input(&self) -> Option<&Arc<P::Input>> {
        self.input.as_ref()
    }

    pub fn producer(&self) -> Option<&Arc<P>> {
        self.producer.as_ref()
    }

    pub fn set_input(&mut self, input: P::Input) {
        self.set_shared_input(Arc::new(input));
    }

    pub fn set_shared_input(&mut self, input: Arc<P::Input>) {
        self.input = Some(input);
        self.input_dirty = true;
    }

    pub fn set_producer(&mut self, producer: P) {
        self.set_shared_producer(Arc::new(producer));
    }

    pub fn set_shared_producer(&mut self, producer: Arc<P>) {
        self.producer = Some(producer);
        self.producer_dirty = true;
    }

    /// Move or resize. Takes effect on the next [`invalidate`](Self::invalidate).
    ///
    /// # Panics
    ///
    /// Panics if `bounds` has a negative or non-finite width or height.
    pub fn set_bounds(&mut self, bounds: Rect) {
        assert_dimensions(&bounds);
        self.bounds = bounds;
    }

    /// Whether input or producer changed since the last queued invalidate
    pub fn is_dirty(&self) -> bool {
        self.input_dirty || self.producer_dirty
    }

    /// Queue a render task carrying the current position and whatever
    /// changed since the last queued task.
    ///
    /// On [`Submission::Dropped`] the dirty flags stay set, so the next call
    /// still carries the latest state.
    pub fn invalidate(&mut self, render: &RenderContext) -> Result<Submission, RenderError> {
        let (width, height) = self.bounds.size().to_pixels();
        let task = RenderTask {
            position: self.bounds.origin(),
            width,
            height,
            producer: self
                .producer_dirty
                .then(|| self.producer.clone())
                .flatten(),
            input: self.input_dirty.then(|| self.input.clone()).flatten(),
        };
        let submission = render.submit(self.id, task)?;
        if submission == Submission::Queued {
            self.input_dirty = false;
            self.producer_dirty = false;
        }
        trace!(geometry = %self.id, ?submission, "invalidate");
        Ok(submission)
    }

    /// Remove this geometry's worker from `render`.
    ///
    /// The next [`invalidate`](Self::invalidate) starts a fresh worker, so the
    /// held producer and input are marked dirty to be handed to it again.
    pub fn detach(&mut self, render: &RenderContext) -> bool {
        self.producer_dirty |= self.producer.is_some();
        self.input_dirty |= self.input.is_some();
        render.detach(self.id)
    }
}

impl<P: Producer> Geometry for AsyncGeometry<P> {
    fn area(&self) -> Area {
        if self.bounds.is_empty() {
            Area::Empty
        } else {
            Area::Rect(self.bounds)
        }
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn is_foreground(&self) -> bool {
        self.foreground
    }

    fn paint(&self, surface: &mut Surface<'_>) {
        if self.bounds.is_empty() {
            return;
        }
        let Some(render) = surface.render_context() else {
            return;
        };
        let Some((raster, position)) = render.current_frame(self.id) else {
            return;
        };
        let opacity = surface.opacity_for(self.foreground);
        surface.draw_raster(raster, position, opacity);
    }
}

impl<P: Producer> fmt::Debug for AsyncGeometry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncGeometry")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("input_dirty", &self.input_dirty)
            .field("producer_dirty", &self.producer_dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use panelkit_paint::Raster;

    struct Noop;

    impl Producer for Noop {
        type Input = ();
        type Workspace = ();

        fn initialize(&self, _width: u32, _height: u32) {}

        fn apply(&self, _: &mut (), _: &mut Raster, _: &()) -> Result<(), RenderError> {
            Ok(())
        }
    }

    #[test]
    fn test_ids_increase() {
        let a = AsyncGeometry::<Noop>::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        let b = AsyncGeometry::<Noop>::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_try_new_rejects_negative() {
        let err = AsyncGeometry::<Noop>::try_new(Rect::new(0.0, 0.0, 5.0, -2.0)).unwrap_err();
        assert_eq!(
            err,
            GeometryError::NegativeDimension {
                width: 5.0,
                height: -2.0
            }
        );
    }

    #[test]
    fn test_try_new_rejects_non_finite() {
        for bounds in [
            Rect::new(0.0, 0.0, f32::INFINITY, 1.0),
            Rect::new(0.0, 0.0, 1.0, f32::NAN),
        ] {
            let err = AsyncGeometry::<Noop>::try_new(bounds).unwrap_err();
            assert!(matches!(err, GeometryError::NonFiniteDimension { .. }), "{err}");
        }
    }

    #[test]
    #[should_panic(expected = "Non-finite geometry dimension")]
    fn test_new_infinite_width_panics() {
        AsyncGeometry::<Noop>::new(Rect::new(0.0, 0.0, f32::INFINITY, 1.0));
    }

    #[test]
    fn test_detach_marks_held_state_dirty() {
        let render = RenderContext::new(&RenderConfig::default().with_lanes(1)).unwrap();
        let mut geometry = AsyncGeometry::<Noop>::new(Rect::new(0.0, 0.0, 2.0, 2.0));
        geometry.set_producer(Noop);
        geometry.invalidate(&render).unwrap();
        assert!(!geometry.is_dirty());

        geometry.detach(&render);
        assert!(geometry.is_dirty());
        assert!(geometry.producer_dirty);
        assert!(!geometry.input_dirty);
    }

    #[test]
    #[should_panic(expected = "Negative geometry dimension")]
    fn test_set_bounds_negative_panics() {
        let mut geometry = AsyncGeometry::<Noop>::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        geometry.set_bounds(Rect::new(0.0, 0.0, -1.0, 1.0));
    }

    #[test]
    fn test_setters_mark_dirty() {
        let mut geometry = AsyncGeometry::<Noop>::new(Rect::ZERO);
        assert!(!geometry.is_dirty());
        geometry.set_input(());
        assert!(geometry.is_dirty());
    }

    #[test]
    fn test_descriptor_round_trip() {
        let geometry = AsyncGeometry::<Noop>::new(Rect::new(1.0, 2.0, 3.0, 4.0)).as_foreground();
        let json = serde_json::to_string(&geometry.descriptor()).unwrap();
        let descriptor: AsyncDescriptor = serde_json::from_str(&json).unwrap();
        let rebuilt = AsyncGeometry::<Noop>::from_descriptor(descriptor);
        assert_eq!(rebuilt.id(), geometry.id());
        assert_eq!(rebuilt.bounds(), geometry.bounds());
        assert!(rebuilt.is_foreground());
    }
}
