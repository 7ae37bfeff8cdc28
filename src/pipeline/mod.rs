//! # Trade aggregation pipeline
//!
//! Ingests a high-rate stream of `(company_id, value)` trades, folds them
//! into running per-company totals and publishes a ranked top-N summary.
//!
//! ## Architecture
//!
//! ```text
//! producer ─► submit_event ─► IngestionBuffer
//!                                  │  drain_all (every 100ms busy / 500ms idle)
//!                                  ▼
//!                              DrainLoop ─► AggregateDomain ─► SummaryPublisher ─► subscribers
//!                                                 ▲
//!                           query_top / export / import
//! ```
//!
//! ## Serialization domains
//!
//! Two independent domains, never held together:
//! - **ingress**: a mutex around the ingestion buffer. Submitters only ever
//!   touch this one, so ingestion never waits on aggregation.
//! - **aggregate**: a single task owning the store, the summary size and the
//!   publisher, driven by a command queue.
//!
//! ## Module Organization
//!
//! - `types` - TradeEvent, CompanyTotal, TradeSummary
//! - `buffer` - ingestion buffer
//! - `state` - aggregate store and ranking
//! - `publisher` - summary computation, dedup and delivery
//! - `aggregator` - aggregate domain task and its handle
//! - `ingestion` - drain loop and adaptive polling policy
//! - `snapshot` - tab-delimited export/import codec
//! - `stats` - lock-free pipeline counters
//! - `engine` - TradeEngine facade

pub mod aggregator;
pub mod buffer;
pub mod engine;
pub mod ingestion;
pub mod publisher;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use aggregator::{AggregateHandle, FoldOutcome};
pub use buffer::IngestionBuffer;
pub use engine::{TradeEngine, TradeSubmitter};
pub use ingestion::{CycleOutcome, DrainLoop, DrainPhase, DrainPolicy};
pub use publisher::{SummaryPublisher, SummaryReceiver};
pub use snapshot::{parse_tab_delimited, serialize_tab_delimited};
pub use state::{AggregateSnapshot, AggregateStore};
pub use stats::EngineStats;
pub use types::{CompanyTotal, TradeEvent, TradeSummary};
