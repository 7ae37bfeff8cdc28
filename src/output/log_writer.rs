//! Log writer - renders each summary as a ranked table through `log`

use super::writer_backend::{SinkError, SummaryWriterBackend};
use crate::pipeline::types::TradeSummary;
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct LogSummaryWriter;

impl LogSummaryWriter {
    pub fn new() -> Self {
        Self
    }
}

/// Ranked rows as `rank. company total` lines, highest first
pub fn format_ranking(summary: &TradeSummary) -> Vec<String> {
    summary
        .top_trades
        .iter()
        .enumerate()
        .map(|(rank, row)| format!("{:>2}. {:<6} {:>12}", rank + 1, row.company_id, row.total))
        .collect()
}

#[async_trait]
impl SummaryWriterBackend for LogSummaryWriter {
    async fn write_summary(&mut self, summary: &TradeSummary) -> Result<(), SinkError> {
        log::info!(
            "📈 Summary: {} transactions | {} companies",
            summary.transaction_count,
            summary.company_count
        );
        let rows = format_ranking(summary);
        let last = rows.len().saturating_sub(1);
        for (i, row) in rows.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            log::info!("   {} {}", branch, row);
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "log"
    }
}
