//! Copy-on-write service provider registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::sp::ServiceProvider;

type Snapshot = Arc<HashMap<String, Arc<ServiceProvider>>>;

/// Entity-ID-keyed table of registered service providers.
///
/// Upserts build a new map and swap the snapshot pointer; lookups clone the
/// pointer and never hold the lock across any other work. Re-ingesting an
/// entity ID replaces the previous record.
#[derive(Default)]
pub struct SpRegistry {
    snapshot: RwLock<Snapshot>,
}

impl SpRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an SP by entity ID.
    pub fn upsert(&self, sp: ServiceProvider) {
        let mut guard = self.snapshot.write();
        let mut next: HashMap<_, _> = guard.as_ref().clone();
        next.insert(sp.entity_id.clone(), Arc::new(sp));
        *guard = Arc::new(next);
    }

    /// Looks up an SP by entity ID.
    #[must_use]
    pub fn lookup(&self, entity_id: &str) -> Option<Arc<ServiceProvider>> {
        self.snapshot.read().get(entity_id).cloned()
    }

    /// The current snapshot, for iteration or persistence.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.read().clone()
    }

    /// Number of registered SPs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
