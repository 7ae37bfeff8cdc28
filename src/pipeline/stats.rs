//! Pipeline counters readable without entering either serialization domain

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Events accepted by `submit_event`
    pub submitted: u64,
    /// Events taken out of the ingestion buffer by the drain loop
    pub drained: u64,
    /// Drain cycles completed, empty ones included
    pub cycles: u64,
    /// Summaries delivered to subscribers
    pub published: u64,
}

impl EngineStats {
    /// Events submitted but not yet drained
    pub fn backlog(&self) -> u64 {
        self.submitted.saturating_sub(self.drained)
    }
}

#[derive(Debug, Default)]
pub struct PipelineCounters {
    submitted: AtomicU64,
    drained: AtomicU64,
    cycles: AtomicU64,
    published: AtomicU64,
}

impl PipelineCounters {
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle(&self, drained: usize) {
        self.drained.fetch_add(drained as u64, Ordering::Relaxed);
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStats {
        EngineStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            cycles: self.cycles.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
        }
    }
}
