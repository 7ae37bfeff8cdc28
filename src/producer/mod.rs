//! Fake trade producer
//!
//! Stand-in for a real feed: generates an unbounded stream of
//! `(company_id, value)` trades in bursts. Only used by the runtime binary
//! and tests; the engine depends on nothing here.

pub mod spawner;
pub mod test_data;

pub use spawner::{SpawnerConfig, TradeSpawner};
pub use test_data::TestData;
