//! Trade Runtime - fake producer wired into the aggregation engine
//!
//! This binary:
//! - Restores the aggregate from a snapshot file (if configured)
//! - Streams published summaries to the selected sink (log or jsonl)
//! - Runs the burst producer until CTRL+C
//! - Reports the final ranking and saves the snapshot on the way out
//!
//! Usage:
//!   cargo run --release --bin trade_runtime -- [--sink log|jsonl]
//!
//! Environment variables:
//!   TRADEFLOW_SUMMARY_SIZE - Summary size N (default: 5)
//!   TRADEFLOW_SNAPSHOT_PATH - Snapshot file to load/save (default: none)
//!   TRADEFLOW_SINK - Summary sink (default: log)
//!   TRADEFLOW_JSONL_PATH - JSONL sink path (default: summaries.jsonl)
//!   TRADEFLOW_REPORT_TOP - Size of the final ranking (default: 10)
//!   TRADEFLOW_BURST_UNIT - Producer burst unit (default: 100000)

use dotenv::dotenv;
use log::{error, info, warn};
use tradeflow::config::RuntimeConfig;
use tradeflow::output::{build_writer, log_writer::format_ranking, run_summary_writer};
use tradeflow::persistence::{load_snapshot, save_snapshot};
use tradeflow::pipeline::TradeEngine;
use tradeflow::producer::{SpawnerConfig, TestData, TradeSpawner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚀 Trade Runtime");

    let config = RuntimeConfig::from_env()?;
    info!("   ├─ Summary size: {}", config.engine.summary_item_count);
    info!(
        "   ├─ Poll: {:?} busy / {:?} idle",
        config.engine.busy_poll_interval, config.engine.idle_poll_interval
    );
    info!("   ├─ Sink: {:?}", config.sink);
    info!("   ├─ Burst unit: {}", config.burst_unit);
    match &config.snapshot_path {
        Some(path) => info!("   └─ Snapshot: {}", path.display()),
        None => info!("   └─ Snapshot: disabled"),
    }

    // Restore or start empty
    let restored = match &config.snapshot_path {
        Some(path) => load_snapshot(path)?,
        None => None,
    };
    let engine = match restored {
        Some(text) => TradeEngine::from_snapshot(config.engine.clone(), &text),
        None => TradeEngine::new(config.engine.clone()),
    };
    info!("✅ Engine created");

    let writer = build_writer(config.sink, &config.jsonl_path)?;
    let writer_task = tokio::spawn(run_summary_writer(engine.subscribe(), writer));
    info!("✅ Summary writer spawned");

    let mut spawner = TradeSpawner::new(SpawnerConfig {
        burst_unit: config.burst_unit,
        ..SpawnerConfig::default()
    });
    let submitter = engine.submitter();
    spawner.start(TestData::new(), move |trade| submitter.submit(trade))?;
    info!("✅ Producer started");
    info!("");
    info!("🔄 Press CTRL+C to shutdown gracefully");

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("");
            info!("⚠️  Received CTRL+C, shutting down...");
        }
        Err(err) => {
            error!("❌ Failed to listen for CTRL+C: {}", err);
        }
    }

    // Joining the producer thread blocks
    let spawner = tokio::task::spawn_blocking(move || {
        spawner.stop();
        spawner
    })
    .await?;
    info!("✅ Producer stopped ({} trades spawned)", spawner.spawned());

    // Let the drain loop pick up what the producer left in the buffer
    tokio::time::sleep(config.engine.idle_poll_interval * 2).await;

    let summary = engine.query_top(config.report_top).await?;
    info!("📊 Final ranking (top {}):", config.report_top);
    for line in format_ranking(&summary) {
        info!("   {}", line);
    }

    let stats = engine.stats();
    info!("📊 Stats:");
    info!("   ├─ Submitted: {}", stats.submitted);
    info!("   ├─ Drained: {}", stats.drained);
    info!("   ├─ Cycles: {}", stats.cycles);
    info!("   ├─ Published: {}", stats.published);
    info!("   └─ Companies: {}", summary.company_count);

    if let Some(path) = &config.snapshot_path {
        match engine.export_snapshot().await? {
            Some(text) => {
                save_snapshot(path, &text)?;
                info!("💾 Snapshot saved to {}", path.display());
            }
            None => warn!("⚠️  Aggregate is empty, snapshot not written"),
        }
    }

    // Dropping the engine closes the summary stream and ends the writer
    drop(engine);
    if let Err(e) = writer_task.await {
        error!("❌ Summary writer task failed: {}", e);
    }

    info!("✅ Trade runtime stopped");
    Ok(())
}
