//! Ingestion buffer - append-only holding area for events awaiting a fold
//!
//! Guarded by its own mutex (the ingress domain). Submitters hold the lock
//! only for a `Vec::push`; the drain loop holds it only for a swap with an
//! empty vector, so submission never waits on aggregation work.
//!
//! No bound is enforced. If folding falls behind ingestion the backlog grows
//! without limit; there is no backpressure toward the producer.

use super::types::TradeEvent;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct IngestionBuffer {
    pending: Mutex<Vec<TradeEvent>>,
}

impl IngestionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. O(1) amortized, always succeeds.
    pub fn append(&self, event: TradeEvent) {
        self.lock().push(event);
    }

    /// Atomically remove and return every held event, in append order
    ///
    /// An `append` racing with this call lands entirely before (and is
    /// returned here) or entirely after (and stays for the next drain).
    pub fn drain_all(&self) -> Vec<TradeEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A push or a swap cannot leave the vector half-updated, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<TradeEvent>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
