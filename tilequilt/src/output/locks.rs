//! Per-tile write serialization.
//!
//! Merging a tile is read → composite → encode → write, which is not atomic
//! on the file system. When several archives are quilted concurrently they
//! can contribute to the same output tile, so every merge runs under a lock
//! keyed by the output path.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lock map keyed by output tile path.
#[derive(Debug, Default)]
pub struct TileLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl TileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `path`.
    pub fn with_lock<R>(&self, path: &Path, f: impl FnOnce() -> R) -> R {
        let lock = self
            .locks
            .entry(path.to_path_buf())
            .or_default()
            .value()
            .clone();

        let result = {
            let _guard = lock.lock();
            f()
        };

        drop(lock);
        // Drop the entry once no other caller holds a clone
        self.locks
            .remove_if(path, |_, l| Arc::strong_count(l) == 1);

        result
    }

    /// Number of paths with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
