//! Summary output - consumers of the published summary stream
//!
//! ```text
//! SummaryReceiver → run_summary_writer → SummaryWriterBackend (log | JSONL)
//! ```

pub mod jsonl_writer;
pub mod log_writer;
pub mod writer_backend;

pub use jsonl_writer::JsonlSummaryWriter;
pub use log_writer::LogSummaryWriter;
pub use writer_backend::{SinkError, SummaryWriterBackend};

use crate::config::SinkKind;
use crate::pipeline::publisher::SummaryReceiver;
use std::path::Path;

/// Create the backend selected by configuration
pub fn build_writer(
    kind: SinkKind,
    jsonl_path: &Path,
) -> Result<Box<dyn SummaryWriterBackend>, SinkError> {
    match kind {
        SinkKind::Log => Ok(Box::new(LogSummaryWriter::new())),
        SinkKind::Jsonl => Ok(Box::new(JsonlSummaryWriter::new(jsonl_path)?)),
    }
}

/// Forward every published summary to `writer` until the engine shuts down
///
/// Write failures are logged and the loop keeps going. Returns the number of
/// summaries written.
pub async fn run_summary_writer(
    mut summaries: SummaryReceiver,
    mut writer: Box<dyn SummaryWriterBackend>,
) -> u64 {
    log::info!("Summary writer started (backend: {})", writer.backend_type());
    let mut written = 0u64;

    while let Ok(summary) = summaries.changed().await {
        match writer.write_summary(&summary).await {
            Ok(()) => written += 1,
            Err(e) => log::error!("❌ Failed to write summary: {}", e),
        }
    }

    if let Err(e) = writer.flush().await {
        log::error!("❌ Failed final summary flush: {}", e);
    }
    log::info!("Summary writer stopped after {} summaries", written);
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::pipeline::engine::TradeEngine;
    use crate::pipeline::types::TradeSummary;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Collects summaries in memory
    struct MemoryWriter {
        seen: Arc<Mutex<Vec<TradeSummary>>>,
    }

    #[async_trait]
    impl SummaryWriterBackend for MemoryWriter {
        async fn write_summary(&mut self, summary: &TradeSummary) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(summary.clone());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SinkError> {
            Ok(())
        }

        fn backend_type(&self) -> &'static str {
            "memory"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_writer_receives_summaries_until_engine_drops() {
        let config = EngineConfig {
            startup_delay: Duration::ZERO,
            ..EngineConfig::default()
        };
        let engine = TradeEngine::new(config);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let writer = Box::new(MemoryWriter { seen: seen.clone() });
        let task = tokio::spawn(run_summary_writer(engine.subscribe(), writer));

        engine.submit_event("ABC", 1);
        tokio::time::sleep(Duration::from_millis(300)).await;
        engine.submit_event("XYZ", 2);
        // The empty cycle at 100ms backs off to the 500ms idle poll
        tokio::time::sleep(Duration::from_millis(700)).await;

        drop(engine);
        let written = task.await.unwrap();

        assert_eq!(written, 2);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].transaction_count, 1);
        assert_eq!(seen[1].transaction_count, 2);
        assert_eq!(seen[1].company_count, 2);
    }

    #[test]
    fn test_build_writer_selects_backend() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let log = build_writer(SinkKind::Log, file.path()).unwrap();
        let jsonl = build_writer(SinkKind::Jsonl, file.path()).unwrap();

        assert_eq!(log.backend_type(), "log");
        assert_eq!(jsonl.backend_type(), "JSONL");
    }
}
