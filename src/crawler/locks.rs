//! Per-hub mutual exclusion
//!
//! Two overlapping crawls of the same hub would read the same "not yet stored"
//! snapshot. Each crawl holds its hub's lock from selector lookup through the
//! store step; crawls of different hubs never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async lock per hub ID
#[derive(Debug, Default)]
pub struct HubLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl HubLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `hub_id`
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn acquire(&self, hub_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(locks.entry(hub_id).or_default())
        };

        lock.lock_owned().await
    }
}
