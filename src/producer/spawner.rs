//! Trade spawner - bursts of fake trades separated by idle gaps
//!
//! Runs on its own OS thread: bursts are tight synchronous loops of
//! `burst_unit × k` events (k in `1..=max_burst_multiplier`), followed by a
//! random pause between `min_gap` and `max_gap`. `stop()` takes effect at the
//! next event boundary or wakes the thread out of its pause.

use super::test_data::TestData;
use crate::pipeline::types::TradeEvent;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnerConfig {
    pub burst_unit: usize,
    pub max_burst_multiplier: usize,
    pub min_gap: Duration,
    pub max_gap: Duration,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            burst_unit: 100_000,
            max_burst_multiplier: 10,
            min_gap: Duration::from_millis(100),
            max_gap: Duration::from_millis(500),
        }
    }
}

pub struct TradeSpawner {
    config: SpawnerConfig,
    running: Arc<AtomicBool>,
    spawned: Arc<AtomicU64>,
    worker: Option<thread::JoinHandle<()>>,
}

impl TradeSpawner {
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            spawned: Arc::new(AtomicU64::new(0)),
            worker: None,
        }
    }

    /// Start emitting trades from `test_data` into `target`
    ///
    /// A no-op if already running.
    pub fn start<F>(&mut self, mut test_data: TestData, target: F) -> std::io::Result<()>
    where
        F: Fn(TradeEvent) + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            log::warn!("Trade spawner already running");
            return Ok(());
        }

        let config = self.config.clone();
        let running = self.running.clone();
        let spawned = self.spawned.clone();

        let worker = thread::Builder::new()
            .name("trade-spawner".to_string())
            .spawn(move || {
                let mut rng = rand::thread_rng();
                let max_multiplier = config.max_burst_multiplier.max(1);
                let min_gap_ms = config.min_gap.as_millis() as u64;
                let max_gap_ms = (config.max_gap.as_millis() as u64).max(min_gap_ms);

                while running.load(Ordering::Relaxed) {
                    let burst = config.burst_unit * rng.gen_range(1..=max_multiplier);
                    log::info!("⚡ Generating {} trades", burst);

                    for _ in 0..burst {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        target(test_data.generate_trade());
                        spawned.fetch_add(1, Ordering::Relaxed);
                    }

                    if running.load(Ordering::Relaxed) {
                        thread::park_timeout(Duration::from_millis(
                            rng.gen_range(min_gap_ms..=max_gap_ms),
                        ));
                    }
                }

                log::info!("Trade spawner stopped ({} spawned)", spawned.load(Ordering::Relaxed));
            })?;

        self.worker = Some(worker);
        Ok(())
    }

    /// Stop emitting and wait for the spawner thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                log::error!("❌ Trade spawner thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Trades emitted since construction
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Drop for TradeSpawner {
    fn drop(&mut self) {
        self.stop();
    }
}
