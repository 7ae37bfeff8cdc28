//! Trade engine - facade composing buffer, drain loop, aggregate domain and
//! publisher
//!
//! ## Architecture
//!
//! ```text
//! submit_event() ──► IngestionBuffer   (ingress domain: std Mutex)
//!                         │
//!                    DrainLoop          (tokio task, adaptive timer)
//!                         │ Fold command
//!                         ▼
//!                  AggregateDomain      (tokio task, command queue)
//!                   ├─ AggregateStore
//!                   └─ SummaryPublisher ──► SummaryReceiver (watch)
//!                         ▲
//! query_top() / export_snapshot() / import_snapshot() / set_summary_size()
//! ```
//!
//! Both background tasks start at construction and live as long as the
//! engine. Dropping the engine tears them down; there is no other stop.

use super::aggregator::{run_aggregate_domain, AggregateDomain, AggregateHandle};
use super::buffer::IngestionBuffer;
use super::ingestion::DrainLoop;
use super::publisher::{SummaryPublisher, SummaryReceiver};
use super::snapshot::{parse_tab_delimited, serialize_tab_delimited};
use super::state::AggregateStore;
use super::stats::{EngineStats, PipelineCounters};
use super::types::{TradeEvent, TradeSummary};
use crate::config::EngineConfig;
use crate::error::EngineError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct TradeEngine {
    buffer: Arc<IngestionBuffer>,
    aggregate: AggregateHandle,
    summaries: SummaryReceiver,
    counters: Arc<PipelineCounters>,
    drain_task: JoinHandle<()>,
}

impl TradeEngine {
    /// Create an empty engine and start its background tasks
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_store(config, AggregateStore::new())
    }

    /// Create an engine seeded from tab-delimited snapshot text
    ///
    /// Parsing follows [`import_snapshot`](Self::import_snapshot); the
    /// transaction count starts at zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn from_snapshot(config: EngineConfig, text: &str) -> Self {
        let mut store = AggregateStore::new();
        store.replace(parse_tab_delimited(text));
        Self::with_store(config, store)
    }

    fn with_store(config: EngineConfig, store: AggregateStore) -> Self {
        let counters = Arc::new(PipelineCounters::default());
        let (publisher, summaries) = SummaryPublisher::new(counters.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        let domain = AggregateDomain::new(store, config.summary_item_count, publisher);
        tokio::spawn(run_aggregate_domain(rx, domain));
        let aggregate = AggregateHandle::new(tx);

        let buffer = Arc::new(IngestionBuffer::new());
        let drain_loop = DrainLoop::new(
            buffer.clone(),
            aggregate.clone(),
            config.drain_policy(),
            counters.clone(),
        );
        let drain_task = tokio::spawn(drain_loop.run(config.startup_delay));

        Self {
            buffer,
            aggregate,
            summaries,
            counters,
            drain_task,
        }
    }

    /// Enqueue a trade. Never blocks on aggregation; always succeeds.
    pub fn submit_event(&self, company_id: impl Into<String>, value: i64) {
        self.counters.record_submitted();
        self.buffer.append(TradeEvent::new(company_id, value));
    }

    /// Cheap cloneable handle for producers on other tasks or threads
    pub fn submitter(&self) -> TradeSubmitter {
        TradeSubmitter {
            buffer: self.buffer.clone(),
            counters: self.counters.clone(),
        }
    }

    /// Change the bound on `top_trades`; takes effect on the next summary
    pub fn set_summary_size(&self, n: usize) -> Result<(), EngineError> {
        self.aggregate.set_summary_size(n)
    }

    /// Ranked top `n` plus counters, consistent with any in-flight drain
    pub async fn query_top(&self, n: usize) -> Result<TradeSummary, EngineError> {
        self.aggregate.query_top(n).await
    }

    /// Blocking variant of [`query_top`](Self::query_top), for plain threads
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn query_top_blocking(&self, n: usize) -> Result<TradeSummary, EngineError> {
        self.aggregate.query_top_blocking(n)
    }

    /// Tab-delimited dump of every company total; `None` if the store is empty
    pub async fn export_snapshot(&self) -> Result<Option<String>, EngineError> {
        let snapshot = self.aggregate.export().await?;
        Ok(serialize_tab_delimited(&snapshot))
    }

    /// Blocking variant of [`export_snapshot`](Self::export_snapshot)
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn export_snapshot_blocking(&self) -> Result<Option<String>, EngineError> {
        let snapshot = self.aggregate.export_blocking()?;
        Ok(serialize_tab_delimited(&snapshot))
    }

    /// Replace the aggregate with the records parsed from `text`
    ///
    /// Malformed lines are skipped, non-numeric totals become 0 and repeated
    /// ids overwrite. The transaction count is kept. Returns the number of
    /// companies now in the store.
    pub async fn import_snapshot(&self, text: &str) -> Result<usize, EngineError> {
        self.aggregate.import(parse_tab_delimited(text)).await
    }

    /// Subscribe to summaries published from now on
    pub fn subscribe(&self) -> SummaryReceiver {
        SummaryReceiver::subscribe_from(&self.summaries)
    }

    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }
}

impl Drop for TradeEngine {
    fn drop(&mut self) {
        // The aggregate task exits once the drain loop's handle and ours are gone
        self.drain_task.abort();
    }
}

/// Producer-side handle: only touches the ingress domain
#[derive(Clone)]
pub struct TradeSubmitter {
    buffer: Arc<IngestionBuffer>,
    counters: Arc<PipelineCounters>,
}

impl TradeSubmitter {
    pub fn submit_event(&self, company_id: impl Into<String>, value: i64) {
        self.submit(TradeEvent::new(company_id, value));
    }

    pub fn submit(&self, event: TradeEvent) {
        self.counters.record_submitted();
        self.buffer.append(event);
    }
}
