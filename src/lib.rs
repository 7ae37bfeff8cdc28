//! tradeflow - high-rate trade aggregation
//!
//! Producers submit `(company_id, value)` trades into a [`TradeEngine`], which
//! folds them into per-company running totals on an adaptive timer and
//! publishes a ranked top-N [`TradeSummary`] whenever the counters move.

pub mod config;
pub mod error;
pub mod output;
pub mod persistence;
pub mod pipeline;
pub mod producer;

pub use config::{ConfigError, EngineConfig, RuntimeConfig};
pub use error::EngineError;
pub use pipeline::{
    CompanyTotal, EngineStats, SummaryReceiver, TradeEngine, TradeEvent, TradeSubmitter,
    TradeSummary,
};
