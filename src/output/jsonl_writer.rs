//! JSONL writer - one serialized summary per line

use super::writer_backend::{SinkError, SummaryWriterBackend};
use crate::pipeline::types::TradeSummary;
use async_trait::async_trait;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct SummaryRecord<'a> {
    timestamp: i64,
    #[serde(flatten)]
    summary: &'a TradeSummary,
}

pub struct JsonlSummaryWriter {
    writer: BufWriter<std::fs::File>,
    last_flush: Instant,
}

impl JsonlSummaryWriter {
    /// Open (or create) `path` for appending
    pub fn new(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("📝 Writing summaries to: {}", path.display());

        Ok(Self {
            writer: BufWriter::new(file),
            last_flush: Instant::now(),
        })
    }

    fn write_line(&mut self, summary: &TradeSummary) -> Result<(), SinkError> {
        let record = SummaryRecord {
            timestamp: current_timestamp(),
            summary,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;

        if self.last_flush.elapsed() > FLUSH_INTERVAL {
            self.writer.flush()?;
            self.last_flush = Instant::now();
        }
        Ok(())
    }
}

impl Drop for JsonlSummaryWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[async_trait]
impl SummaryWriterBackend for JsonlSummaryWriter {
    async fn write_summary(&mut self, summary: &TradeSummary) -> Result<(), SinkError> {
        self.write_line(summary)
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        self.last_flush = Instant::now();
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
