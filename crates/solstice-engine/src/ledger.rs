// crates/solstice-engine/src/ledger.rs
//
// Per-(pool, user) position ledger.
//
// A position is created implicitly on first deposit and zeroed, never
// deleted, on full withdrawal or emergency exit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use solstice_core::{Address, PoolId};

/// A user's stake in one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    /// Tokens currently staked, net of the deposit fee.
    pub amount: u128,
    /// `amount * acc_reward_per_share / PRECISION` at the last settlement;
    /// excluded from future pending-reward computation.
    pub reward_debt: u128,
}

/// All positions, keyed by pool id and user address.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: HashMap<(PoolId, Address), UserPosition>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The position for (pool, user); zero if none exists yet.
    pub fn position(&self, pool: PoolId, user: Address) -> UserPosition {
        self.positions
            .get(&(pool, user))
            .copied()
            .unwrap_or_default()
    }

    /// Store the position for (pool, user).
    pub fn set(&mut self, pool: PoolId, user: Address, position: UserPosition) {
        self.positions.insert((pool, user), position);
    }

    /// Zero the position for (pool, user). The entry is kept.
    pub fn clear(&mut self, pool: PoolId, user: Address) {
        self.positions.insert((pool, user), UserPosition::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: Address = [1u8; 32];

    #[test]
    fn test_missing_position_is_zero() {
        let ledger = PositionLedger::new();
        assert_eq!(ledger.position(1, USER), UserPosition::default());
    }

    #[test]
    fn test_set_and_get() {
        let mut ledger = PositionLedger::new();
        ledger.set(
            1,
            USER,
            UserPosition {
                amount: 54,
                reward_debt: 7,
            },
        );
        assert_eq!(ledger.position(1, USER).amount, 54);
        // Positions are per pool.
        assert_eq!(ledger.position(2, USER).amount, 0);
    }

    #[test]
    fn test_clear_zeroes_position() {
        let mut ledger = PositionLedger::new();
        ledger.set(
            1,
            USER,
            UserPosition {
                amount: 54,
                reward_debt: 7,
            },
        );
        ledger.clear(1, USER);
        assert_eq!(ledger.position(1, USER), UserPosition::default());
    }
}
