//! Pipeline types - trade events and published summaries

use serde::{Deserialize, Serialize};

/// A single trade submitted to the engine
///
/// Immutable once created. `value` may be negative and carries no range
/// restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeEvent {
    pub company_id: String,
    pub value: i64,
}

impl TradeEvent {
    pub fn new(company_id: impl Into<String>, value: i64) -> Self {
        Self {
            company_id: company_id.into(),
            value,
        }
    }
}

/// One row of a ranked view: a company and its running total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyTotal {
    pub company_id: String,
    pub total: i64,
}

impl CompanyTotal {
    pub fn new(company_id: impl Into<String>, total: i64) -> Self {
        Self {
            company_id: company_id.into(),
            total,
        }
    }
}

/// Ranked top-N view of the aggregate plus process counters
///
/// `PartialEq` compares every field. Publication deduplication does NOT use
/// it; see [`TradeSummary::same_counters`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSummary {
    /// Highest totals first, at most the configured summary size
    pub top_trades: Vec<CompanyTotal>,
    /// Events folded since start-up (or since the engine was seeded)
    pub transaction_count: u64,
    /// Distinct companies in the aggregate
    pub company_count: usize,
}

impl TradeSummary {
    /// Publication equivalence: two summaries are the same iff their
    /// `transaction_count` and `company_count` match.
    ///
    /// The contents of `top_trades` are intentionally ignored, so a
    /// reordering of the ranked list without a counter change is never
    /// published on its own.
    pub fn same_counters(&self, other: &TradeSummary) -> bool {
        self.transaction_count == other.transaction_count
            && self.company_count == other.company_count
    }

    pub fn is_empty(&self) -> bool {
        self.company_count == 0
    }
}
