//! Process-wide resource image cache with mark-and-sweep cache runs
//!
//! Every `lookup` marks its entry as used. A cache run brackets one refresh
//! cycle (typically one panel layout rebuild):
//!
//! ```ignore
//! cache.begin_cache_run();      // forget which entries were used
//! rebuild_panels(&cache);       // lookups re-mark what is still needed
//! cache.end_cache_run();        // evict everything not looked up
//! ```
//!
//! Failed loads are cached as absent so a broken resource is not retried on
//! every frame; they are evicted by cache runs like any other entry, which
//! gives them one retry per refresh cycle.

use std::sync::{Arc, OnceLock};

use panelkit_paint::Raster;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::loader::{FileLoader, ResourceLoader};

/// Global cache instance
static GLOBAL_CACHE: OnceLock<Arc<ImageCache>> = OnceLock::new();

#[derive(Default)]
struct CacheInner {
    /// Some = loaded, None = load failed
    entries: FxHashMap<String, Option<Arc<Raster>>>,
    /// Names looked up since the last `begin_cache_run`
    used: FxHashSet<String>,
    run_active: bool,
}

impl CacheInner {
    fn mark_used(&mut self, name: &str) {
        if !self.used.contains(name) {
            self.used.insert(name.to_owned());
        }
    }
}

/// Mapping from resource name to decoded raster
pub struct ImageCache {
    loader: Box<dyn ResourceLoader>,
    inner: Mutex<CacheInner>,
}

impl ImageCache {
    pub fn new(loader: impl ResourceLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Install the process-wide cache (call once at startup)
    ///
    /// # Panics
    ///
    /// Panics if the global cache already exists.
    pub fn init_global(loader: impl ResourceLoader + 'static) {
        if GLOBAL_CACHE.set(Arc::new(ImageCache::new(loader))).is_err() {
            panic!("ImageCache::init_global() called more than once");
        }
    }

    /// The process-wide cache. Falls back to an unrooted [`FileLoader`] when
    /// `init_global` was never called.
    pub fn global() -> Arc<ImageCache> {
        Arc::clone(GLOBAL_CACHE.get_or_init(|| Arc::new(ImageCache::new(FileLoader::unrooted()))))
    }

    /// Return the raster for `name`, loading it on first use.
    ///
    /// `None` means the resource failed to load; the failure is cached.
    pub fn lookup(&self, name: &str) -> Option<Arc<Raster>> {
        {
            let mut inner = self.inner.lock();
            if let Some(entry) = inner.entries.get(name).cloned() {
                inner.mark_used(name);
                return entry;
            }
        }

        // Decode outside the lock; a racing lookup may load the same name,
        // the first insertion wins.
        let loaded = match self.loader.load(name) {
            Ok(raster) => Some(Arc::new(raster)),
            Err(e) => {
                tracing::warn!("Failed to load image resource '{}': {}", name, e);
                None
            }
        };

        let mut inner = self.inner.lock();
        let entry = inner
            .entries
            .entry(name.to_owned())
            .or_insert(loaded)
            .clone();
        inner.mark_used(name);
        entry
    }

    /// Mark an already cached entry as used without loading.
    ///
    /// Returns false when `name` is not cached.
    pub fn touch(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(name) {
            inner.mark_used(name);
            true
        } else {
            false
        }
    }

    /// Start a cache run: every entry is considered unused until looked up
    pub fn begin_cache_run(&self) {
        let mut inner = self.inner.lock();
        if inner.run_active {
            tracing::warn!("begin_cache_run called while a cache run is active; restarting it");
        }
        inner.used.clear();
        inner.run_active = true;
    }

    /// Finish a cache run, evicting every entry not looked up since
    /// `begin_cache_run`. Returns the number of evicted entries.
    pub fn end_cache_run(&self) -> usize {
        let mut inner = self.inner.lock();
        if !inner.run_active {
            tracing::warn!("end_cache_run called without begin_cache_run; nothing evicted");
            return 0;
        }
        inner.run_active = false;

        let CacheInner { entries, used, .. } = &mut *inner;
        let before = entries.len();
        entries.retain(|name, _| used.contains(name));
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!("Image cache run evicted {} entries", evicted);
        }
        evicted
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, loaded or failed
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.used.clear();
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ImageCache")
            .field("entries", &inner.entries.len())
            .field("used", &inner.used.len())
            .field("run_active", &inner.run_active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_cache() -> (ImageCache, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let cache = ImageCache::new(move |name: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            if name.starts_with("missing") {
                Err(ImageError::NotFound(name.to_string()))
            } else {
                Ok(Raster::new(2, 2))
            }
        });
        (cache, loads)
    }

    #[test]
    fn test_lookup_loads_once() {
        let (cache, loads) = counting_cache();
        let a = cache.lookup("a").unwrap();
        let b = cache.lookup("a").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_cached() {
        let (cache, loads) = counting_cache();
        assert!(cache.lookup("missing.png").is_none());
        assert!(cache.lookup("missing.png").is_none());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(cache.contains("missing.png"));
    }

    #[test]
    fn test_cache_run_evicts_unused() {
        let (cache, _) = counting_cache();

        cache.begin_cache_run();
        cache.lookup("A");
        cache.lookup("B");
        cache.lookup("C");
        assert_eq!(cache.end_cache_run(), 0);

        cache.begin_cache_run();
        cache.lookup("A");
        cache.lookup("B");
        assert_eq!(cache.end_cache_run(), 1);

        assert!(cache.contains("A"));
        assert!(cache.contains("B"));
        assert!(!cache.contains("C"));
    }

    #[test]
    fn test_touch_keeps_entry_alive() {
        let (cache, loads) = counting_cache();
        cache.lookup("A");
        cache.begin_cache_run();
        assert!(cache.touch("A"));
        assert!(!cache.touch("never-loaded"));
        assert_eq!(cache.end_cache_run(), 0);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_end_without_begin_evicts_nothing() {
        let (cache, _) = counting_cache();
        cache.lookup("A");
        assert_eq!(cache.end_cache_run(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_entry_retried_after_eviction() {
        let (cache, loads) = counting_cache();
        cache.begin_cache_run();
        cache.lookup("missing.png");
        cache.end_cache_run();

        cache.begin_cache_run();
        assert_eq!(cache.end_cache_run(), 1);
        cache.lookup("missing.png");
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_global_is_shared() {
        let a = ImageCache::global();
        let b = ImageCache::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
