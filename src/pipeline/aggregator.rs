//! Aggregate domain - single-owner task serializing all access to the store
//!
//! The `AggregateStore`, the summary size and the `SummaryPublisher` live
//! inside one task and are reached only through `AggregateCommand`s on an
//! mpsc queue. Commands run one at a time in arrival order, which is the
//! whole serialization discipline: no lock guards the store.
//!
//! Reads are a rendezvous: the caller enqueues a request carrying a oneshot
//! sender and waits on the receiver, asynchronously or (from a plain thread)
//! by blocking.

use super::publisher::SummaryPublisher;
use super::state::{AggregateSnapshot, AggregateStore};
use super::types::{TradeEvent, TradeSummary};
use crate::error::EngineError;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

/// Result of folding one drained batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldOutcome {
    pub folded: usize,
    pub published: bool,
}

pub enum AggregateCommand {
    /// Fold a batch then compute and maybe publish, in one step
    Fold {
        batch: Vec<TradeEvent>,
        reply: oneshot::Sender<FoldOutcome>,
    },
    SetSummarySize(usize),
    QueryTop {
        n: usize,
        reply: oneshot::Sender<TradeSummary>,
    },
    Export {
        reply: oneshot::Sender<AggregateSnapshot>,
    },
    Import {
        entries: HashMap<String, i64>,
        reply: oneshot::Sender<usize>,
    },
}

/// State owned by the aggregate task
pub struct AggregateDomain {
    store: AggregateStore,
    summary_item_count: usize,
    publisher: SummaryPublisher,
}

impl AggregateDomain {
    pub fn new(store: AggregateStore, summary_item_count: usize, publisher: SummaryPublisher) -> Self {
        Self {
            store,
            summary_item_count,
            publisher,
        }
    }

    pub fn handle(&mut self, command: AggregateCommand) {
        // A dropped reply receiver means the caller gave up; nothing to do
        match command {
            AggregateCommand::Fold { batch, reply } => {
                let _ = reply.send(self.fold(batch));
            }
            AggregateCommand::SetSummarySize(n) => {
                log::debug!("Summary size {} -> {}", self.summary_item_count, n);
                self.summary_item_count = n;
            }
            AggregateCommand::QueryTop { n, reply } => {
                let _ = reply.send(TradeSummary {
                    top_trades: self.store.ranked_top(n),
                    transaction_count: self.store.transaction_count(),
                    company_count: self.store.company_count(),
                });
            }
            AggregateCommand::Export { reply } => {
                let _ = reply.send(self.store.snapshot());
            }
            AggregateCommand::Import { entries, reply } => {
                let count = entries.len();
                self.store.replace(entries);
                log::info!("📥 Imported {} company totals", count);
                let _ = reply.send(count);
            }
        }
    }

    /// Apply every event in append order, then publish if the counters moved
    fn fold(&mut self, batch: Vec<TradeEvent>) -> FoldOutcome {
        let folded = batch.len();
        for event in batch {
            self.store.apply(event);
        }

        let published = if folded > 0 {
            self.publisher
                .compute_and_maybe_publish(&self.store, self.summary_item_count)
        } else {
            false
        };

        FoldOutcome { folded, published }
    }
}

/// Run the aggregate domain until every command sender is dropped
pub async fn run_aggregate_domain(
    mut rx: mpsc::UnboundedReceiver<AggregateCommand>,
    mut domain: AggregateDomain,
) {
    log::info!(
        "Aggregate domain started ({} companies seeded, summary size {})",
        domain.store.company_count(),
        domain.summary_item_count
    );

    while let Some(command) = rx.recv().await {
        domain.handle(command);
    }

    log::info!(
        "Aggregate domain stopped after {} transactions",
        domain.store.transaction_count()
    );
}

/// Cloneable sender side of the aggregate domain
#[derive(Clone)]
pub struct AggregateHandle {
    tx: mpsc::UnboundedSender<AggregateCommand>,
}

impl AggregateHandle {
    pub fn new(tx: mpsc::UnboundedSender<AggregateCommand>) -> Self {
        Self { tx }
    }

    pub async fn fold(&self, batch: Vec<TradeEvent>) -> Result<FoldOutcome, EngineError> {
        let rx = self.request(|reply| AggregateCommand::Fold { batch, reply })?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// Fire-and-forget; applies to the next computed summary
    pub fn set_summary_size(&self, n: usize) -> Result<(), EngineError> {
        self.tx
            .send(AggregateCommand::SetSummarySize(n))
            .map_err(|_| EngineError::Closed)
    }

    pub async fn query_top(&self, n: usize) -> Result<TradeSummary, EngineError> {
        let rx = self.request(|reply| AggregateCommand::QueryTop { n, reply })?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// Blocking variant of [`query_top`](Self::query_top)
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn query_top_blocking(&self, n: usize) -> Result<TradeSummary, EngineError> {
        let rx = self.request(|reply| AggregateCommand::QueryTop { n, reply })?;
        rx.blocking_recv().map_err(|_| EngineError::Closed)
    }

    pub async fn export(&self) -> Result<AggregateSnapshot, EngineError> {
        let rx = self.request(|reply| AggregateCommand::Export { reply })?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// Blocking variant of [`export`](Self::export)
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn export_blocking(&self) -> Result<AggregateSnapshot, EngineError> {
        let rx = self.request(|reply| AggregateCommand::Export { reply })?;
        rx.blocking_recv().map_err(|_| EngineError::Closed)
    }

    pub async fn import(&self, entries: HashMap<String, i64>) -> Result<usize, EngineError> {
        let rx = self.request(|reply| AggregateCommand::Import { entries, reply })?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> AggregateCommand,
    ) -> Result<oneshot::Receiver<T>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(command(reply)).map_err(|_| EngineError::Closed)?;
        Ok(rx)
    }
}
