//! Writer backend trait for published summaries
//!
//! Defines the interface for delivering summaries to a consumer (log, file).

use crate::pipeline::types::TradeSummary;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend trait for writing summaries
#[async_trait]
pub trait SummaryWriterBackend: Send {
    /// Write a single published summary
    async fn write_summary(&mut self, summary: &TradeSummary) -> Result<(), SinkError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), SinkError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
