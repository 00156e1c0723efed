//! Memoized model loading.
//!
//! The artifact is deserialized at most once per process; every later call
//! shares the same `Arc`. A failed load leaves the cache empty, so the next
//! call tries again.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::Result;
use crate::model::TsunamiModel;

/// One-shot, thread-safe cache for a loaded value.
pub struct ModelCache<M> {
    cell: OnceCell<Arc<M>>,
}

impl<M> ModelCache<M> {
    pub const fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    /// Return the cached value, running `load` only if nothing is cached yet.
    /// Concurrent first callers block until one of them finishes loading.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<M>>
    where
        F: FnOnce() -> Result<M>,
    {
        self.cell.get_or_try_init(|| load().map(Arc::new)).cloned()
    }

    pub fn get(&self) -> Option<Arc<M>> {
        self.cell.get().cloned()
    }
}

impl<M> Default for ModelCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED_MODEL: ModelCache<TsunamiModel> = ModelCache::new();

/// Load the process-wide model from `path`, or return the one already loaded.
///
/// The cache is keyed by the first successful call: later calls get that
/// model back whatever path they pass.
pub fn load_model(path: &Path) -> Result<Arc<TsunamiModel>> {
    SHARED_MODEL.get_or_load(|| {
        tracing::info!(path = %path.display(), "loading model artifact");
        TsunamiModel::from_path(path)
    })
}

/// The process-wide model, if [`load_model`] has succeeded.
pub fn shared_model() -> Option<Arc<TsunamiModel>> {
    SHARED_MODEL.get()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ModelError;

    #[derive(Debug)]
    struct Blob(u32);

    #[test]
    fn second_call_reuses_cached_value() {
        let calls = AtomicUsize::new(0);
        let cache = ModelCache::new();
        let deserialize = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Blob(7))
        };

        let first = cache.get_or_load(deserialize).unwrap();
        let second = cache.get_or_load(deserialize).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.0, 7);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let calls = AtomicUsize::new(0);
        let cache: ModelCache<Blob> = ModelCache::new();

        let err = cache.get_or_load(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ModelError::InvalidEstimator("corrupt".into()))
        });
        assert!(err.is_err());
        assert!(cache.get().is_none());

        let ok = cache.get_or_load(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Blob(1))
        });
        assert!(ok.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.get().is_some());
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let calls = AtomicUsize::new(0);
        let cache: ModelCache<Blob> = ModelCache::new();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    cache
                        .get_or_load(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(5));
                            Ok(Blob(3))
                        })
                        .unwrap()
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
