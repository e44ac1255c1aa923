//! Bounded pool of render lanes
//!
//! Each lane is one named thread draining a bounded queue. Work for one
//! geometry always goes to the same lane, so it runs in submission order.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use tracing::{debug, error, warn};

use crate::config::{Backpressure, RenderConfig};
use crate::error::{RenderError, Result};

pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of handing work to a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Queued,
    /// The lane's queue stayed full; the work was not queued
    Dropped,
}

/// Counters shared by the pool and the tasks it runs
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) published: AtomicU64,
    pub(crate) failed: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) skipped: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub(crate) struct WorkerPool {
    lanes: Vec<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
    backpressure: Backpressure,
    timeout: Duration,
    counters: Arc<Counters>,
}

impl WorkerPool {
    pub(crate) fn new(config: &RenderConfig, counters: Arc<Counters>) -> Result<Self> {
        let lane_count = config.effective_lanes();
        let mut lanes = Vec::with_capacity(lane_count);
        let mut handles = Vec::with_capacity(lane_count);

        for lane in 0..lane_count {
            let (tx, rx) = bounded::<Task>(config.effective_capacity());
            let counters = Arc::clone(&counters);
            let handle = std::thread::Builder::new()
                .name(format!("panelkit-render-{lane}"))
                .spawn(move || run_lane(lane, rx, counters))?;
            lanes.push(tx);
            handles.push(handle);
        }
        debug!(lanes = lane_count, "render worker pool started");

        Ok(Self {
            lanes,
            handles,
            backpressure: config.backpressure,
            timeout: config.enqueue_timeout(),
            counters,
        })
    }

    pub(crate) fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub(crate) fn lane_for(&self, key: u64) -> usize {
        (key % self.lanes.len().max(1) as u64) as usize
    }

    /// Queue `task` on `lane` under the configured backpressure policy
    pub(crate) fn submit(&self, lane: usize, task: Task) -> Result<Submission> {
        let sender = self.lanes.get(lane).ok_or(RenderError::ShutDown)?;
        let full = match self.backpressure {
            Backpressure::Block => match sender.send_timeout(task, self.timeout) {
                Ok(()) => false,
                Err(SendTimeoutError::Timeout(_)) => true,
                Err(SendTimeoutError::Disconnected(_)) => return Err(RenderError::ShutDown),
            },
            Backpressure::Drop => match sender.try_send(task) {
                Ok(()) => false,
                Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => return Err(RenderError::ShutDown),
            },
        };
        if full {
            Counters::bump(&self.counters.dropped);
            warn!(lane, policy = ?self.backpressure, "render lane full, task dropped");
            Ok(Submission::Dropped)
        } else {
            Ok(Submission::Queued)
        }
    }

    /// Queue `task` ignoring the backpressure policy. Used for teardown work
    /// that must not be lost.
    pub(crate) fn submit_blocking(&self, lane: usize, task: Task) -> Result<()> {
        let sender = self.lanes.get(lane).ok_or(RenderError::ShutDown)?;
        sender.send(task).map_err(|_| RenderError::ShutDown)
    }

    /// Close every lane and wait for queued work to finish
    pub(crate) fn shutdown(&mut self) {
        self.lanes.clear();
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("render lane").to_owned();
            if handle.join().is_err() {
                error!(thread = %name, "render lane exited abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_lane(lane: usize, rx: Receiver<Task>, counters: Arc<Counters>) {
    for task in rx.iter() {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(task)) {
            Counters::bump(&counters.failed);
            error!(lane, "render task panicked: {}", panic_message(&*panic));
        }
    }
    debug!(lane, "render lane stopped");
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn config(lanes: usize, capacity: usize, backpressure: Backpressure) -> RenderConfig {
        RenderConfig::default()
            .with_lanes(lanes)
            .with_queue_capacity(capacity)
            .with_backpressure(backpressure)
    }

    #[test]
    fn test_tasks_run_in_order_per_lane() {
        let counters = Arc::new(Counters::default());
        let mut pool = WorkerPool::new(&config(2, 16, Backpressure::Block), counters).unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..10 {
            let seen = Arc::clone(&seen);
            let lane = pool.lane_for(3);
            pool.submit(lane, Box::new(move || seen.lock().push(i))).unwrap();
        }
        pool.shutdown();
        assert_eq!(*seen.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_lane_survives_panic() {
        let counters = Arc::new(Counters::default());
        let mut pool =
            WorkerPool::new(&config(1, 4, Backpressure::Block), Arc::clone(&counters)).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        pool.submit(0, Box::new(|| panic!("boom"))).unwrap();
        let after = Arc::clone(&ran);
        pool.submit(0, Box::new(move || {
            after.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        pool.shutdown();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(counters.failed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let mut pool =
            WorkerPool::new(&config(1, 1, Backpressure::Drop), Arc::new(Counters::default()))
                .unwrap();
        pool.shutdown();
        assert!(matches!(
            pool.submit(0, Box::new(|| {})),
            Err(RenderError::ShutDown)
        ));
    }

    #[test]
    fn test_panic_message() {
        let panic = catch_unwind(|| panic!("lane {}", 3)).unwrap_err();
        assert_eq!(panic_message(&*panic), "lane 3");
    }
}
