// crates/solstice-engine/src/emission.rs
//
// Engine-wide emission schedule with yearly halving.
//
// The emission rate is a pure function of wall-clock time:
// - Year 0 (the deployment calendar year) emits at `year1_rate`.
// - Year N >= 1 emits at `base_rate >> (N - 1)` (integer halving).
// - After `max_halvings` halvings the rate is permanently zero.
// - The result is divided by the number of cooperating chain instances,
//   each of which receives an equal share of the global budget.
//
// Year boundaries are fixed calendar years (January 1st, UTC), not
// 365-day windows rolling from the deployment timestamp.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use solstice_core::Timestamp;

/// The halving emission schedule for one engine deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionSchedule {
    /// Deployment timestamp; fixes the calendar-year epochs.
    genesis: Timestamp,
    /// Emission rate during the deployment year, in motes per second.
    year1_rate: u128,
    /// Emission rate during the first full year; halves each year after.
    base_rate: u128,
    /// Number of halvings after which the rate is defined to be zero.
    max_halvings: u32,
}

impl EmissionSchedule {
    pub fn new(genesis: Timestamp, year1_rate: u128, base_rate: u128, max_halvings: u32) -> Self {
        Self {
            genesis,
            year1_rate,
            base_rate,
            max_halvings,
        }
    }

    /// The deployment timestamp.
    pub fn genesis(&self) -> Timestamp {
        self.genesis
    }

    /// Number of calendar-year boundaries crossed between genesis and `now`.
    fn year_index(&self, now: Timestamp) -> u32 {
        if now <= self.genesis {
            return 0;
        }
        let from = calendar_year(self.genesis);
        let to = calendar_year(now);
        to.saturating_sub(from).max(0) as u32
    }

    /// The engine-wide emission rate at `now`, in motes per second,
    /// already split across `active_chains` cooperating deployments.
    pub fn rate_at(&self, now: Timestamp, active_chains: u32) -> u128 {
        let year = self.year_index(now);
        let rate = if year == 0 {
            self.year1_rate
        } else if year - 1 >= self.max_halvings {
            // Terminal epoch: the engine has permanently stopped emitting.
            0
        } else {
            self.base_rate >> (year - 1)
        };
        rate / active_chains.max(1) as u128
    }
}

/// A pool's instantaneous share of the engine rate, proportional to its
/// weight over the live total. Unallocated weight headroom is simply
/// unemitted.
pub fn pool_rate(engine_rate: u128, weight: u32, total_weight: u64) -> u128 {
    if total_weight == 0 {
        return 0;
    }
    engine_rate.saturating_mul(weight as u128) / total_weight as u128
}

fn calendar_year(ts: Timestamp) -> i32 {
    DateTime::<Utc>::from_timestamp(ts as i64, 0)
        .map(|t| t.year())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2021-01-01T00:00:00Z
    const GENESIS: Timestamp = 1_609_459_200;
    // 2021-12-31T23:59:59Z
    const LAST_SECOND_OF_YEAR0: Timestamp = 1_640_995_199;
    // 2022-01-01T00:00:00Z
    const YEAR1: Timestamp = 1_640_995_200;
    // 2023-01-01T00:00:00Z
    const YEAR2: Timestamp = 1_672_531_200;

    const YEAR1_RATE: u128 = 10_000_000_000;
    const BASE_RATE: u128 = 5_000_000_000;

    fn schedule() -> EmissionSchedule {
        EmissionSchedule::new(GENESIS, YEAR1_RATE, BASE_RATE, 30)
    }

    #[test]
    fn test_rate_in_deployment_year() {
        assert_eq!(schedule().rate_at(GENESIS, 1), YEAR1_RATE);
        assert_eq!(schedule().rate_at(GENESIS + 3600, 1), YEAR1_RATE);
        assert_eq!(schedule().rate_at(LAST_SECOND_OF_YEAR0, 1), YEAR1_RATE);
    }

    #[test]
    fn test_rate_switches_at_calendar_boundary() {
        // The boundary is January 1st, not 365 days after genesis.
        assert_eq!(schedule().rate_at(YEAR1, 1), BASE_RATE);
    }

    #[test]
    fn test_rate_halves_each_year() {
        assert_eq!(schedule().rate_at(YEAR2, 1), BASE_RATE / 2);
        // Mid-year deployment still halves on the calendar boundary.
        let mid_2023 = YEAR2 + 180 * 86_400;
        assert_eq!(schedule().rate_at(mid_2023, 1), BASE_RATE / 2);
    }

    #[test]
    fn test_terminal_epoch_is_zero() {
        let schedule = EmissionSchedule::new(GENESIS, YEAR1_RATE, BASE_RATE, 3);
        // Year 3 is the last emitting year (base >> 2); year 4 onwards is zero.
        assert_eq!(schedule.rate_at(YEAR2, 1), BASE_RATE / 2);
        let year4 = GENESIS + 4 * 366 * 86_400;
        assert_eq!(schedule.rate_at(year4, 1), 0);
    }

    #[test]
    fn test_chain_split() {
        assert_eq!(schedule().rate_at(GENESIS, 2), YEAR1_RATE / 2);
        assert_eq!(schedule().rate_at(GENESIS, 4), YEAR1_RATE / 4);
        // Defensive: a zero chain count behaves as one.
        assert_eq!(schedule().rate_at(GENESIS, 0), YEAR1_RATE);
    }

    #[test]
    fn test_before_genesis_uses_year1_rate() {
        assert_eq!(schedule().rate_at(GENESIS - 100, 1), YEAR1_RATE);
    }

    #[test]
    fn test_pool_rate_proportional() {
        assert_eq!(pool_rate(10_000_000_000, 500_000, 1_000_000), 5_000_000_000);
        assert_eq!(pool_rate(10_000_000_000, 20_000, 20_000), 10_000_000_000);
    }

    #[test]
    fn test_pool_rate_empty_registry() {
        assert_eq!(pool_rate(10_000_000_000, 0, 0), 0);
    }
}
