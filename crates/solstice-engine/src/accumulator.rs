// crates/solstice-engine/src/accumulator.rs
//
// Fixed-point reward accumulator arithmetic.
//
// A pool's accumulator tracks cumulative reward issued per unit of staked
// share since genesis, scaled by PRECISION to avoid truncation error in
// the per-share division. A user's reward debt snapshots the portion of
// the accumulator already settled for them, so only newly-accrued reward
// is pending.
//
// These helpers are pure; both the mutating refresh and the read-only
// pending query go through them so the two paths cannot drift.

use solstice_core::Timestamp;

/// Fixed-point scaling constant for `acc_reward_per_share`.
pub const PRECISION: u128 = 1_000_000_000_000;

/// Advance an accumulator by `elapsed` seconds at `pool_rate` motes/second.
///
/// An empty pool leaves the accumulator unchanged: reward for a pool with
/// nobody staked is not banked for later, it is simply not accrued.
pub fn accrue(acc: u128, elapsed: Timestamp, pool_rate: u128, total_staked: u128) -> u128 {
    if total_staked == 0 {
        return acc;
    }
    let issued = (elapsed as u128).saturating_mul(pool_rate);
    acc.saturating_add(issued.saturating_mul(PRECISION) / total_staked)
}

/// Reward debt snapshot for a position of `amount` at accumulator `acc`.
pub fn reward_debt(amount: u128, acc: u128) -> u128 {
    amount.saturating_mul(acc) / PRECISION
}

/// Pending reward for a position: the accumulator share not yet settled.
pub fn pending_amount(amount: u128, acc: u128, debt: u128) -> u128 {
    reward_debt(amount, acc).saturating_sub(debt)
}
