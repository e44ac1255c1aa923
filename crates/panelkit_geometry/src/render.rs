//! Registry of async render workers
//!
//! A [`RenderContext`] owns the lane pool and one [`DoubleBuffer`] per
//! attached async geometry, keyed by [`GeometryId`]. A geometry rebuilt with
//! the same id (for example after deserializing a snapshot) finds its entry
//! again and keeps its buffers and producer workspace.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use panelkit_paint::{Point, Raster};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, error, trace};

use crate::buffer::{AtomicPoint, DoubleBuffer};
use crate::config::RenderConfig;
use crate::error::{RenderError, Result};
use crate::heavy::GeometryId;
use crate::pool::{Counters, Submission, WorkerPool};
use crate::producer::Producer;

/// Snapshot of the pipeline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Frames published to a double buffer
    pub published: u64,
    /// Renders that returned an error or panicked
    pub failed: u64,
    /// Tasks refused under backpressure
    pub dropped: u64,
    /// Tasks skipped because their worker had been detached
    pub skipped: u64,
}

/// Work for one geometry, executed on its lane
pub(crate) struct RenderTask<P: Producer> {
    pub(crate) position: Point,
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Present when the geometry's producer changed
    pub(crate) producer: Option<Arc<P>>,
    /// Present when the geometry's input changed
    pub(crate) input: Option<Arc<P::Input>>,
}

/// Producer state living on the worker lane
struct WorkerState<P: Producer> {
    producer: Option<Arc<P>>,
    workspace: Option<P::Workspace>,
    input: Option<Arc<P::Input>>,
    /// Reclaimed raster reused for the next frame
    spare: Option<Raster>,
}

impl<P: Producer> Default for WorkerState<P> {
    fn default() -> Self {
        Self {
            producer: None,
            workspace: None,
            input: None,
            spare: None,
        }
    }
}

enum Outcome {
    Idle,
    Published,
    Failed,
}

impl<P: Producer> WorkerState<P> {
    fn run(&mut self, task: RenderTask<P>, buffers: &DoubleBuffer, id: GeometryId) -> Outcome {
        let producer_changed = task.producer.is_some();
        if let Some(producer) = task.producer {
            self.stop_producer();
            self.workspace = Some(producer.initialize(task.width, task.height));
            self.producer = Some(producer);
        }
        let input_changed = task.input.is_some();
        if let Some(input) = task.input {
            self.input = Some(input);
        }
        if !producer_changed && !input_changed {
            return Outcome::Idle;
        }
        if task.width == 0 || task.height == 0 {
            return Outcome::Idle;
        }
        let (Some(producer), Some(workspace), Some(input)) =
            (&self.producer, &mut self.workspace, &self.input)
        else {
            trace!(geometry = %id, "nothing to render yet");
            return Outcome::Idle;
        };

        let mut target = self.spare.take().unwrap_or_default();
        if !target.reset(task.width, task.height) {
            error!(
                geometry = %id,
                width = task.width,
                height = task.height,
                "frame buffer too large, keeping previous frame"
            );
            return Outcome::Failed;
        }
        match producer.apply(workspace, &mut target, input) {
            Ok(()) => {
                self.spare = buffers.publish(target);
                Outcome::Published
            }
            Err(err) => {
                error!(geometry = %id, "render failed, keeping previous frame: {err}");
                self.spare = Some(target);
                Outcome::Failed
            }
        }
    }

    fn stop_producer(&mut self) {
        if let (Some(producer), Some(workspace)) = (self.producer.take(), self.workspace.take()) {
            producer.shutdown(workspace);
        }
    }
}

/// One attached async geometry
pub(crate) struct RegistryEntry {
    buffers: DoubleBuffer,
    position: AtomicPoint,
    lane: usize,
    stopped: AtomicBool,
    producer_type: TypeId,
    /// `WorkerState<P>` for the producer type the entry was created with
    worker: Mutex<Box<dyn Any + Send>>,
    /// Shuts the producer down; instantiated for that same type
    teardown: fn(&RegistryEntry),
}

impl RegistryEntry {
    fn new<P: Producer>(lane: usize) -> Self {
        Self {
            buffers: DoubleBuffer::new(),
            position: AtomicPoint::new(Point::ZERO),
            lane,
            stopped: AtomicBool::new(false),
            producer_type: TypeId::of::<P>(),
            worker: Mutex::new(Box::new(WorkerState::<P>::default())),
            teardown: teardown::<P>,
        }
    }
}

fn teardown<P: Producer>(entry: &RegistryEntry) {
    let mut worker = entry.worker.lock();
    if let Some(state) = worker.downcast_mut::<WorkerState<P>>() {
        state.stop_producer();
        state.input = None;
        state.spare = None;
    }
}

/// Owner of the render lanes and every attached async geometry's buffers
pub struct RenderContext {
    pool: WorkerPool,
    entries: RwLock<FxHashMap<GeometryId, Arc<RegistryEntry>>>,
    counters: Arc<Counters>,
}

impl RenderContext {
    /// Start the worker lanes
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let counters = Arc::new(Counters::default());
        let pool = WorkerPool::new(config, Arc::clone(&counters))?;
        Ok(Self {
            pool,
            entries: RwLock::new(FxHashMap::default()),
            counters,
        })
    }

    pub fn lane_count(&self) -> usize {
        self.pool.lane_count()
    }

    /// Create the worker entry for `id` unless one exists. Returns true when
    /// a new entry was created.
    pub fn attach<P: Producer>(&self, id: GeometryId) -> Result<bool> {
        let (_, created) = self.entry::<P>(id)?;
        Ok(created)
    }

    /// Remove the entry for `id` and shut its producer down on its lane.
    /// Tasks still queued for it are skipped.
    pub fn detach(&self, id: GeometryId) -> bool {
        let Some(entry) = self.entries.write().remove(&id) else {
            return false;
        };
        entry.stopped.store(true, Ordering::Release);
        self.queue_teardown(id, entry);
        debug!(geometry = %id, "async geometry detached");
        true
    }

    pub fn is_attached(&self, id: GeometryId) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Frames published for `id`, `None` when not attached
    pub fn generation(&self, id: GeometryId) -> Option<u64> {
        self.entries.read().get(&id).map(|e| e.buffers.generation())
    }

    /// Current frame of `id` and where to draw it. Never waits on a worker.
    pub fn current_frame(&self, id: GeometryId) -> Option<(Arc<Raster>, Point)> {
        let entry = Arc::clone(self.entries.read().get(&id)?);
        let raster = entry.buffers.current()?;
        Some((raster, entry.position.load()))
    }

    pub fn stats(&self) -> RenderStats {
        let c = &self.counters;
        RenderStats {
            published: c.published.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            skipped: c.skipped.load(Ordering::Relaxed),
        }
    }

    fn entry<P: Producer>(&self, id: GeometryId) -> Result<(Arc<RegistryEntry>, bool)> {
        if let Some(entry) = self.entries.read().get(&id) {
            return Self::check_type::<P>(id, entry).map(|e| (e, false));
        }
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(&id) {
            return Self::check_type::<P>(id, entry).map(|e| (e, false));
        }
        let lane = self.pool.lane_for(id.to_raw());
        let entry = Arc::new(RegistryEntry::new::<P>(lane));
        entries.insert(id, Arc::clone(&entry));
        debug!(geometry = %id, lane, "async geometry attached");
        Ok((entry, true))
    }

    fn check_type<P: Producer>(
        id: GeometryId,
        entry: &Arc<RegistryEntry>,
    ) -> Result<Arc<RegistryEntry>> {
        if entry.producer_type == TypeId::of::<P>() {
            Ok(Arc::clone(entry))
        } else {
            Err(RenderError::ProducerMismatch(id))
        }
    }

    /// Queue `task` on the lane of `id`, attaching it first if needed
    pub(crate) fn submit<P: Producer>(
        &self,
        id: GeometryId,
        task: RenderTask<P>,
    ) -> Result<Submission> {
        let (entry, _) = self.entry::<P>(id)?;
        let lane = entry.lane;
        let counters = Arc::clone(&self.counters);
        self.pool.submit(
            lane,
            Box::new(move || {
                if entry.stopped.load(Ordering::Acquire) {
                    Counters::bump(&counters.skipped);
                    return;
                }
                entry.position.store(task.position);
                let mut worker = entry.worker.lock();
                let Some(state) = worker.downcast_mut::<WorkerState<P>>() else {
                    error!(geometry = %id, lane, "worker state has an unexpected producer type");
                    return;
                };
                match state.run(task, &entry.buffers, id) {
                    Outcome::Published => Counters::bump(&counters.published),
                    Outcome::Failed => Counters::bump(&counters.failed),
                    Outcome::Idle => {}
                }
            }),
        )
    }

    fn queue_teardown(&self, id: GeometryId, entry: Arc<RegistryEntry>) {
        let lane = entry.lane;
        let run = Arc::clone(&entry);
        let queued = self
            .pool
            .submit_blocking(lane, Box::new(move || (run.teardown)(&run)));
        if queued.is_err() {
            debug!(geometry = %id, "pool closed, tearing down inline");
            (entry.teardown)(&entry);
        }
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        let entries: Vec<_> = self.entries.get_mut().drain().collect();
        for (id, entry) in entries {
            entry.stopped.store(true, Ordering::Release);
            self.queue_teardown(id, entry);
        }
        self.pool.shutdown();
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("lanes", &self.lane_count())
            .field("attached", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
