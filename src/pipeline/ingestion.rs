//! Drain loop - moves buffered events into the aggregate on an adaptive timer
//!
//! Each cycle:
//! 1. Drain the ingestion buffer (ingress lock held only for the swap)
//! 2. If the batch is non-empty, hand it to the aggregate domain, which folds
//!    it and computes/publishes a summary in one command
//! 3. Pick the next delay: short after a non-empty batch, long after an
//!    empty one, so an idle producer costs close to zero CPU
//! 4. Sleep, then go again
//!
//! The two serialization domains are never held at once: the buffer lock is
//! released before the batch is sent to the aggregate task.
//!
//! The loop has no stop switch. It runs for the lifetime of the engine and
//! keeps draining leftovers while the producer is paused.

use super::aggregator::AggregateHandle;
use super::buffer::IngestionBuffer;
use super::stats::PipelineCounters;
use crate::error::EngineError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// How often the throughput line is logged
const THROUGHPUT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Where the loop is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPhase {
    Idle,
    Draining,
    Publishing,
    Scheduled,
}

/// Adaptive polling: busy interval after a non-empty drain, idle otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainPolicy {
    pub busy_interval: Duration,
    pub idle_interval: Duration,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self {
            busy_interval: Duration::from_millis(100),
            idle_interval: Duration::from_millis(500),
        }
    }
}

impl DrainPolicy {
    pub fn next_delay(&self, drained: usize) -> Duration {
        if drained > 0 {
            self.busy_interval
        } else {
            self.idle_interval
        }
    }
}

/// What one cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub drained: usize,
    pub published: bool,
    pub next_delay: Duration,
}

pub struct DrainLoop {
    buffer: Arc<IngestionBuffer>,
    aggregate: AggregateHandle,
    policy: DrainPolicy,
    counters: Arc<PipelineCounters>,
    phase: DrainPhase,
    drained_since_log: u64,
    last_log_time: Instant,
}

impl DrainLoop {
    pub fn new(
        buffer: Arc<IngestionBuffer>,
        aggregate: AggregateHandle,
        policy: DrainPolicy,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            buffer,
            aggregate,
            policy,
            counters,
            phase: DrainPhase::Idle,
            drained_since_log: 0,
            last_log_time: Instant::now(),
        }
    }

    pub fn phase(&self) -> DrainPhase {
        self.phase
    }

    /// Run one drain/fold/publish cycle and report the delay to schedule
    ///
    /// Fails only if the aggregate domain is gone.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, EngineError> {
        self.phase = DrainPhase::Draining;
        let batch = self.buffer.drain_all();
        let drained = batch.len();

        let mut published = false;
        if drained > 0 {
            self.phase = DrainPhase::Publishing;
            published = self.aggregate.fold(batch).await?.published;
        }

        self.counters.record_cycle(drained);
        let next_delay = self.policy.next_delay(drained);
        self.phase = DrainPhase::Scheduled;

        if drained > 0 {
            log::debug!(
                "Drained {} events (published: {}), next poll in {:?}",
                drained,
                published,
                next_delay
            );
        } else {
            log::trace!("Buffer empty, next poll in {:?}", next_delay);
        }
        self.log_throughput(drained);

        Ok(CycleOutcome {
            drained,
            published,
            next_delay,
        })
    }

    /// Run cycles forever, starting after `startup_delay`
    ///
    /// Returns only when the aggregate domain has shut down.
    pub async fn run(mut self, startup_delay: Duration) {
        log::info!("🚀 Starting drain loop");
        log::info!("   ├─ Busy poll: {:?}", self.policy.busy_interval);
        log::info!("   ├─ Idle poll: {:?}", self.policy.idle_interval);
        log::info!("   └─ First drain in {:?}", startup_delay);

        sleep(startup_delay).await;

        loop {
            match self.run_cycle().await {
                Ok(outcome) => {
                    sleep(outcome.next_delay).await;
                    self.phase = DrainPhase::Idle;
                }
                Err(EngineError::Closed) => {
                    log::warn!("⚠️  Aggregate domain closed, stopping drain loop");
                    break;
                }
            }
        }
    }

    fn log_throughput(&mut self, drained: usize) {
        self.drained_since_log += drained as u64;

        let elapsed = self.last_log_time.elapsed();
        if elapsed >= THROUGHPUT_LOG_INTERVAL {
            if self.drained_since_log > 0 {
                let stats = self.counters.snapshot();
                log::info!(
                    "📊 Ingestion rate: {:.1} events/sec (total: {}, backlog: {})",
                    self.drained_since_log as f64 / elapsed.as_secs_f64(),
                    stats.drained,
                    self.buffer.len()
                );
            }
            self.drained_since_log = 0;
            self.last_log_time = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::aggregator::{run_aggregate_domain, AggregateDomain};
    use crate::pipeline::publisher::{SummaryPublisher, SummaryReceiver};
    use crate::pipeline::state::AggregateStore;
    use crate::pipeline::types::TradeEvent;
    use tokio::sync::mpsc;

    struct Harness {
        buffer: Arc<IngestionBuffer>,
        drain: DrainLoop,
        summaries: SummaryReceiver,
        counters: Arc<PipelineCounters>,
    }

    fn harness() -> Harness {
        let counters = Arc::new(PipelineCounters::default());
        let (publisher, template) = SummaryPublisher::new(counters.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_aggregate_domain(
            rx,
            AggregateDomain::new(AggregateStore::new(), 5, publisher),
        ));

        let buffer = Arc::new(IngestionBuffer::new());
        let drain = DrainLoop::new(
            buffer.clone(),
            AggregateHandle::new(tx),
            DrainPolicy::default(),
            counters.clone(),
        );

        Harness {
            buffer,
            drain,
            summaries: SummaryReceiver::subscribe_from(&template),
            counters,
        }
    }

    #[test]
    fn test_policy_next_delay() {
        let policy = DrainPolicy::default();

        assert_eq!(policy.next_delay(1), Duration::from_millis(100));
        assert_eq!(policy.next_delay(250_000), Duration::from_millis(100));
        assert_eq!(policy.next_delay(0), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_non_empty_cycle_uses_short_delay_and_publishes() {
        let mut h = harness();
        h.buffer.append(TradeEvent::new("ABC", 10));
        h.buffer.append(TradeEvent::new("ABC", 5));

        let outcome = h.drain.run_cycle().await.unwrap();

        assert_eq!(outcome.drained, 2);
        assert!(outcome.published);
        assert_eq!(outcome.next_delay, Duration::from_millis(100));
        assert_eq!(h.drain.phase(), DrainPhase::Scheduled);
        assert!(h.buffer.is_empty());

        let summary = h.summaries.latest().unwrap();
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.top_trades[0].total, 15);
    }

    #[tokio::test]
    async fn test_empty_cycle_uses_long_delay_and_does_not_publish() {
        let mut h = harness();

        for _ in 0..3 {
            let outcome = h.drain.run_cycle().await.unwrap();
            assert_eq!(outcome.drained, 0);
            assert!(!outcome.published);
            assert_eq!(outcome.next_delay, Duration::from_millis(500));
        }

        assert!(!h.summaries.has_pending());
        let stats = h.counters.snapshot();
        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.published, 0);
    }

    #[tokio::test]
    async fn test_empty_cycle_after_busy_cycle_is_silent() {
        let mut h = harness();
        h.buffer.append(TradeEvent::new("ABC", 1));
        h.drain.run_cycle().await.unwrap();
        h.summaries.changed().await.unwrap();

        let outcome = h.drain.run_cycle().await.unwrap();

        assert!(!outcome.published);
        assert!(!h.summaries.has_pending());
        assert_eq!(h.counters.snapshot().published, 1);
    }

    #[tokio::test]
    async fn test_cycle_fails_when_aggregate_domain_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let buffer = Arc::new(IngestionBuffer::new());
        buffer.append(TradeEvent::new("ABC", 1));
        let mut drain = DrainLoop::new(
            buffer,
            AggregateHandle::new(tx),
            DrainPolicy::default(),
            Arc::new(PipelineCounters::default()),
        );

        assert_eq!(drain.run_cycle().await, Err(EngineError::Closed));
    }
}
