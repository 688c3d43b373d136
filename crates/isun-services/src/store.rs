//! In-memory forecast record storage.
//!
//! This module defines the `Repository` trait and `InMemoryRepository`, an
//! unbounded map keyed by generated record ids. Records are only ever added
//! or overwritten; nothing expires.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

/// A stored item together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: Uuid,
    pub data: T,
}

/// Storage capability used by the fetch cycle.
///
/// Implementations must tolerate concurrent writers (overlapping cycles).
pub trait Repository<T>: Send + Sync {
    /// Store `item` under `id`, replacing any previous item with that id.
    fn add(&self, id: Uuid, item: T);

    /// Get an item by id.
    ///
    /// Returns `None` if nothing was stored under `id`.
    fn get(&self, id: Uuid) -> Option<T>;
}

/// Thread-safe, unbounded in-memory repository.
pub struct InMemoryRepository<T> {
    records: RwLock<HashMap<Uuid, Record<T>>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> Repository<T> for InMemoryRepository<T> {
    fn add(&self, id: Uuid, item: T) {
        tracing::debug!("Adding record {} to forecast store", id);
        self.records.write().insert(id, Record { id, data: item });
    }

    fn get(&self, id: Uuid) -> Option<T> {
        tracing::debug!("Getting record {} from forecast store", id);
        self.records.read().get(&id).map(|record| record.data.clone())
    }
}
