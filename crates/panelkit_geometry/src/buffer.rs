//! Double-buffered frames shared between one render worker and paint
//!
//! The worker renders into a private raster, swaps it into the slot that is
//! not displayed and then publishes that slot's index. Published rasters are
//! immutable, so a reader holding one can never observe a partial frame.
//!
//! The index is the only hand-off: a `Release` store on the worker side and
//! an `Acquire` load on the paint side. Slot locks are held by the worker
//! only for the pointer swap and paint only takes them with `try_read`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use panelkit_paint::{Point, Raster};
use parking_lot::RwLock;

/// Attempts at reading a slot before paint gives up for this frame
const READ_ATTEMPTS: usize = 4;

pub struct DoubleBuffer {
    slots: [RwLock<Arc<Raster>>; 2],
    current: AtomicUsize,
    generation: AtomicU64,
}

impl DoubleBuffer {
    pub fn new() -> Self {
        Self {
            slots: [
                RwLock::new(Arc::new(Raster::default())),
                RwLock::new(Arc::new(Raster::default())),
            ],
            current: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// The most recently completed frame. Never blocks; `None` only when the
    /// worker kept both slots busy for every attempt.
    pub fn current(&self) -> Option<Arc<Raster>> {
        let mut index = self.current.load(Ordering::Acquire);
        for _ in 0..READ_ATTEMPTS {
            if let Some(slot) = self.slots[index].try_read() {
                return Some(Arc::clone(&slot));
            }
            // The worker is swapping this slot, which means the other one
            // holds a complete frame.
            index = 1 - index;
        }
        None
    }

    /// Number of frames published so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Publish a finished frame. Must only be called from the owning worker.
    ///
    /// Returns the raster that previously occupied the back slot when no
    /// reader still holds it, so its allocation can be reused.
    pub(crate) fn publish(&self, frame: Raster) -> Option<Raster> {
        let back = 1 - self.current.load(Ordering::Relaxed);
        let previous = {
            let mut slot = self.slots[back].write();
            std::mem::replace(&mut *slot, Arc::new(frame))
        };
        self.current.store(back, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
        Arc::try_unwrap(previous).ok()
    }
}

impl Default for DoubleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DoubleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubleBuffer")
            .field("current", &self.current.load(Ordering::Relaxed))
            .field("generation", &self.generation())
            .finish()
    }
}

/// A point stored as two `f32` bit patterns in one atomic word
#[derive(Debug, Default)]
pub(crate) struct AtomicPoint(AtomicU64);

impl AtomicPoint {
    pub(crate) fn new(p: Point) -> Self {
        Self(AtomicU64::new(Self::pack(p)))
    }

    fn pack(p: Point) -> u64 {
        ((p.x.to_bits() as u64) << 32) | p.y.to_bits() as u64
    }

    pub(crate) fn load(&self) -> Point {
        let bits = self.0.load(Ordering::Acquire);
        Point::new(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
    }

    pub(crate) fn store(&self, p: Point) {
        self.0.store(Self::pack(p), Ordering::Release);
    }
}
