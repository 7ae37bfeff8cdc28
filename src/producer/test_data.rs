//! Pre-generated fake trade data
//!
//! Company ids and values are generated once and cycled through with two
//! independent pointers. The tables have different lengths, so stepping
//! through them pairs each value with a different company on each lap.

use crate::pipeline::types::TradeEvent;
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const COMPANY_COUNT: usize = 3000;
pub const VALUE_COUNT: usize = 437;

#[derive(Debug, Clone)]
pub struct TestData {
    companies: Vec<String>,
    values: Vec<i64>,
    company_pointer: usize,
    value_pointer: usize,
}

impl TestData {
    pub fn new() -> Self {
        Self::with_rng(&mut rand::thread_rng())
    }

    /// Build the tables from a caller-supplied RNG (seeded in tests)
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            companies: generate_companies(rng),
            values: generate_values(rng),
            company_pointer: 0,
            value_pointer: 0,
        }
    }

    /// Next trade in the cycle
    pub fn generate_trade(&mut self) -> TradeEvent {
        let trade = TradeEvent::new(
            self.companies[self.company_pointer].clone(),
            self.values[self.value_pointer],
        );
        self.company_pointer = (self.company_pointer + 1) % self.companies.len();
        self.value_pointer = (self.value_pointer + 1) % self.values.len();
        trade
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

impl Default for TestData {
    fn default() -> Self {
        Self::new()
    }
}

/// 3-4 uppercase letters each; duplicates are possible and harmless
fn generate_companies<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    (0..COMPANY_COUNT)
        .map(|_| {
            let len = rng.gen_range(3..=4);
            (0..len)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect()
        })
        .collect()
}

/// Slightly positive skew: [-500, 500] shifted by +30
fn generate_values<R: Rng + ?Sized>(rng: &mut R) -> Vec<i64> {
    (0..VALUE_COUNT)
        .map(|_| rng.gen_range(-500..=500) + 30)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_table_shapes() {
        let data = TestData::with_rng(&mut StdRng::seed_from_u64(7));

        assert_eq!(data.companies().len(), COMPANY_COUNT);
        assert_eq!(data.values().len(), VALUE_COUNT);
        assert!(data
            .companies()
            .iter()
            .all(|c| (3..=4).contains(&c.len()) && c.bytes().all(|b| b.is_ascii_uppercase())));
        assert!(data.values().iter().all(|v| (-470..=530).contains(v)));
    }

    #[test]
    fn test_pointers_cycle_independently() {
        let mut data = TestData::with_rng(&mut StdRng::seed_from_u64(7));
        let first = data.generate_trade();

        // After one lap of the value table the company pointer is elsewhere
        for _ in 1..VALUE_COUNT {
            data.generate_trade();
        }
        let lap = data.generate_trade();
        assert_eq!(lap.value, first.value);
        assert_eq!(lap.company_id, data.companies()[VALUE_COUNT]);

        // Both pointers wrap
        for _ in (VALUE_COUNT + 1)..COMPANY_COUNT {
            data.generate_trade();
        }
        assert_eq!(data.generate_trade().company_id, first.company_id);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = TestData::with_rng(&mut StdRng::seed_from_u64(42));
        let mut b = TestData::with_rng(&mut StdRng::seed_from_u64(42));

        for _ in 0..1000 {
            assert_eq!(a.generate_trade(), b.generate_trade());
        }
    }
}
