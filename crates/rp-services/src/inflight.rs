//! At-most-one generation in flight per target.

use dashmap::DashMap;
use std::sync::Arc;

/// Tracks targets with an outstanding LLM call.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<DashMap<String, ()>>,
}

/// Releases its target when dropped, including when the owning future is abandoned.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<DashMap<String, ()>>,
    key: String,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, or returns `None` if a call for it is already running.
    pub fn try_begin(&self, key: &str) -> Option<InFlightGuard> {
        match self.active.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlightGuard {
                    active: Arc::clone(&self.active),
                    key: key.to_string(),
                })
            }
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains_key(key)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}
