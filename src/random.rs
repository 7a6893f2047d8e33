// Random values for test fixtures and seeding
//
// No process-wide generator: callers build a RandomGenerator and pass it
// to whatever needs fixture data. `with_seed` makes a run reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::db::CURRENCIES;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Account ids the fixtures assume exist (see `random_account_id`)
pub const FIXTURE_ACCOUNT_IDS: std::ops::RangeInclusive<i64> = 11..=20;

pub struct RandomGenerator {
    rng: StdRng,
}

impl RandomGenerator {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Integer in `[min, max]`, both ends inclusive. Reversed bounds are swapped.
    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    pub fn random_string(&mut self, length: usize) -> String {
        (0..length)
            .map(|_| ALPHANUMERIC[self.rng.gen_range(0..ALPHANUMERIC.len())] as char)
            .collect()
    }

    pub fn random_owner(&mut self) -> String {
        self.random_string(10)
    }

    pub fn random_money(&mut self) -> i64 {
        self.random_int(0, 1000)
    }

    pub fn random_currency(&mut self) -> &'static str {
        CURRENCIES[self.rng.gen_range(0..CURRENCIES.len())]
    }

    pub fn random_account_id(&mut self) -> i64 {
        self.random_int(*FIXTURE_ACCOUNT_IDS.start(), *FIXTURE_ACCOUNT_IDS.end())
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}
