//! Aggregate store - running per-company totals and the transaction counter
//!
//! Owned by the aggregate domain (see `aggregator`); nothing here locks.
//!
//! ## Ranking
//!
//! Ranked views order by total descending, then by company id ascending.
//! The tie-break does not depend on `HashMap` iteration order, so the same
//! store always ranks the same way, across runs as well as within one.

use super::types::{CompanyTotal, TradeEvent};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    totals: HashMap<String, i64>,
    transaction_count: u64,
}

/// Immutable copy of the store, taken inside the aggregate domain and used
/// outside it (export, offline ranking)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSnapshot {
    pub totals: HashMap<String, i64>,
    pub transaction_count: u64,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event: add its value to the company's total (creating the
    /// entry if absent) and count the transaction
    ///
    /// Totals wrap on overflow rather than panicking; the fold has no
    /// failure path.
    pub fn apply(&mut self, event: TradeEvent) {
        let total = self.totals.entry(event.company_id).or_insert(0);
        *total = total.wrapping_add(event.value);
        self.transaction_count += 1;
    }

    /// The `n` largest totals, highest first
    pub fn ranked_top(&self, n: usize) -> Vec<CompanyTotal> {
        rank_totals(&self.totals, n)
    }

    pub fn snapshot(&self) -> AggregateSnapshot {
        AggregateSnapshot {
            totals: self.totals.clone(),
            transaction_count: self.transaction_count,
        }
    }

    /// Substitute the whole mapping. Used only by snapshot import.
    ///
    /// `transaction_count` is left untouched.
    pub fn replace(&mut self, entries: HashMap<String, i64>) {
        self.totals = entries;
    }

    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    pub fn company_count(&self) -> usize {
        self.totals.len()
    }

    pub fn total_for(&self, company_id: &str) -> Option<i64> {
        self.totals.get(company_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl AggregateSnapshot {
    pub fn ranked_top(&self, n: usize) -> Vec<CompanyTotal> {
        rank_totals(&self.totals, n)
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

fn rank_order(a: &(&String, i64), b: &(&String, i64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Select the top `n` entries without sorting the whole map
fn rank_totals(totals: &HashMap<String, i64>, n: usize) -> Vec<CompanyTotal> {
    if n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(&String, i64)> = totals.iter().map(|(id, total)| (id, *total)).collect();
    if ranked.len() > n {
        ranked.select_nth_unstable_by(n - 1, rank_order);
        ranked.truncate(n);
    }
    ranked.sort_unstable_by(rank_order);

    ranked
        .into_iter()
        .map(|(id, total)| CompanyTotal::new(id.clone(), total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, i64)]) -> AggregateStore {
        let mut store = AggregateStore::new();
        for (id, value) in entries {
            store.apply(TradeEvent::new(*id, *value));
        }
        store
    }

    #[test]
    fn test_apply_accumulates_and_counts() {
        let store = store_with(&[("ABC", 100), ("XYZ", -40), ("ABC", 20)]);

        assert_eq!(store.total_for("ABC"), Some(120));
        assert_eq!(store.total_for("XYZ"), Some(-40));
        assert_eq!(store.transaction_count(), 3);
        assert_eq!(store.company_count(), 2);
    }

    #[test]
    fn test_ranked_top_ties_and_exclusions() {
        // {A:50, B:-10, C:50, D:0}, n=2 -> A and C, never B or D
        let store = store_with(&[("A", 50), ("B", -10), ("C", 50), ("D", 0)]);

        let top = store.ranked_top(2);

        assert_eq!(top, vec![CompanyTotal::new("A", 50), CompanyTotal::new("C", 50)]);
    }

    #[test]
    fn test_ranked_top_length_is_min_of_n_and_companies() {
        let store = store_with(&[("A", 3), ("B", 1), ("C", 2)]);

        assert_eq!(store.ranked_top(0).len(), 0);
        assert_eq!(store.ranked_top(2).len(), 2);
        assert_eq!(store.ranked_top(3).len(), 3);
        assert_eq!(store.ranked_top(10).len(), 3);

        let totals: Vec<i64> = store.ranked_top(10).iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![3, 2, 1]);
    }

    #[test]
    fn test_ranked_top_is_sorted_for_larger_stores() {
        let mut store = AggregateStore::new();
        for i in 0..500i64 {
            // Spread totals with plenty of collisions
            store.apply(TradeEvent::new(format!("C{:03}", i), (i * 37) % 101 - 50));
        }

        let top = store.ranked_top(25);

        assert_eq!(top.len(), 25);
        for pair in top.windows(2) {
            let ordered = pair[0].total > pair[1].total
                || (pair[0].total == pair[1].total && pair[0].company_id < pair[1].company_id);
            assert!(ordered, "{:?} before {:?}", pair[0], pair[1]);
        }
        assert_eq!(top[0].total, 50);
    }

    #[test]
    fn test_replace_keeps_transaction_count() {
        let mut store = store_with(&[("ABC", 5), ("OLD", 9)]);

        store.replace(HashMap::from([("ABC".to_string(), 1), ("NEW".to_string(), 2)]));

        assert_eq!(store.total_for("ABC"), Some(1));
        assert_eq!(store.total_for("NEW"), Some(2));
        assert_eq!(store.total_for("OLD"), None);
        assert_eq!(store.transaction_count(), 2);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut store = store_with(&[("ABC", 5)]);
        let snapshot = store.snapshot();

        store.apply(TradeEvent::new("ABC", 5));

        assert_eq!(snapshot.totals.get("ABC"), Some(&5));
        assert_eq!(snapshot.transaction_count, 1);
        assert_eq!(snapshot.ranked_top(1), vec![CompanyTotal::new("ABC", 5)]);
    }
}
