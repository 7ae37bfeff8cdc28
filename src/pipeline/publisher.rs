//! Summary publisher - ranked view with change detection before emission
//!
//! Delivery is a `watch` channel: subscribers always see the most recent
//! summary, never a queue of stale ones, and at most one is in flight per
//! subscriber.

use super::state::AggregateStore;
use super::stats::PipelineCounters;
use super::types::TradeSummary;
use crate::error::EngineError;
use std::sync::Arc;
use tokio::sync::watch;

/// Build the summary for the current store contents
pub fn compute_summary(store: &AggregateStore, summary_item_count: usize) -> TradeSummary {
    TradeSummary {
        top_trades: store.ranked_top(summary_item_count),
        transaction_count: store.transaction_count(),
        company_count: store.company_count(),
    }
}

pub struct SummaryPublisher {
    sender: watch::Sender<Option<TradeSummary>>,
    last_published: Option<TradeSummary>,
    counters: Arc<PipelineCounters>,
}

impl SummaryPublisher {
    /// Create a publisher and the template receiver new subscribers clone from
    pub fn new(counters: Arc<PipelineCounters>) -> (Self, SummaryReceiver) {
        let (sender, receiver) = watch::channel(None);
        let publisher = Self {
            sender,
            last_published: None,
            counters,
        };
        (publisher, SummaryReceiver { inner: receiver })
    }

    /// Compute a summary and emit it unless it matches the last emission
    ///
    /// Must run inside the aggregate domain, right after the batch fold, so
    /// the summary reflects exactly that batch. Equivalence is
    /// [`TradeSummary::same_counters`]. Returns whether anything was emitted.
    pub fn compute_and_maybe_publish(
        &mut self,
        store: &AggregateStore,
        summary_item_count: usize,
    ) -> bool {
        let summary = compute_summary(store, summary_item_count);

        if let Some(last) = &self.last_published {
            if last.same_counters(&summary) {
                log::trace!(
                    "Summary suppressed: counters unchanged ({} tx, {} companies)",
                    summary.transaction_count,
                    summary.company_count
                );
                return false;
            }
        }

        // send_replace stores the value even while nobody is subscribed
        self.sender.send_replace(Some(summary.clone()));
        self.last_published = Some(summary);
        self.counters.record_published();
        true
    }

    pub fn last_published(&self) -> Option<&TradeSummary> {
        self.last_published.as_ref()
    }
}

/// Subscriber end of the summary stream
#[derive(Debug, Clone)]
pub struct SummaryReceiver {
    inner: watch::Receiver<Option<TradeSummary>>,
}

impl SummaryReceiver {
    /// A receiver that only reports summaries published after this call
    pub fn subscribe_from(template: &SummaryReceiver) -> Self {
        let mut inner = template.inner.clone();
        inner.borrow_and_update();
        Self { inner }
    }

    /// Wait for the next published summary
    ///
    /// Returns `EngineError::Closed` once the engine is torn down.
    pub async fn changed(&mut self) -> Result<TradeSummary, EngineError> {
        loop {
            self.inner.changed().await.map_err(|_| EngineError::Closed)?;
            if let Some(summary) = self.inner.borrow_and_update().clone() {
                return Ok(summary);
            }
        }
    }

    /// Most recent published summary, without waiting
    pub fn latest(&self) -> Option<TradeSummary> {
        self.inner.borrow().clone()
    }

    /// Whether a summary was published that this receiver has not seen
    pub fn has_pending(&self) -> bool {
        self.inner.has_changed().unwrap_or(false)
    }
}
