// crates/solstice-engine/src/registry.rs
//
// Pool registry: the ordered collection of staking pools and the global
// weight invariant.
//
// Weights are parts-per-million of the engine's emission; the sum over
// all pools never exceeds MAX_WEIGHT. Adding or re-weighting past the cap
// must be cured by explicit reductions to other named pools in the same
// operation. Batches are validated as a whole before any mutation is
// applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use solstice_core::{Address, EngineError, PoolId, Timestamp};

/// Global weight cap: pool weights are parts-per-million of total emission.
pub const MAX_WEIGHT: u32 = 1_000_000;

/// Basis-point denominator for deposit fees.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Pool flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolKind {
    /// Accepts deposits and withdrawals of the staked token; reward accrues
    /// to the per-share accumulator.
    Regular,
    /// Holds no balances; the registered external contract mints its
    /// proportional allocation on demand.
    ThirdParty,
}

/// One staking pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    /// The staked asset, or for a third-party pool the external contract
    /// entitled to mint.
    pub token: Address,
    pub kind: PoolKind,
    /// Share of total emission, in [0, MAX_WEIGHT].
    pub weight: u32,
    /// Fee skimmed from each deposit, in basis points.
    pub deposit_fee_bps: u16,
    /// Cumulative reward per staked share since genesis, scaled by PRECISION.
    pub acc_reward_per_share: u128,
    /// Timestamp of the last accumulator refresh (or last third-party mint).
    pub last_update: Timestamp,
    /// Sum of all staked positions. Always zero for third-party pools.
    pub total_staked: u128,
}

/// Ordered collection of pools keyed by sequential id, starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRegistry {
    pools: BTreeMap<PoolId, Pool>,
    next_id: PoolId,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            pools: BTreeMap::new(),
            // Pool ids start at 1; id 0 is reserved and never assigned.
            next_id: 1,
        }
    }

    /// Look up a pool by id.
    pub fn pool(&self, id: PoolId) -> Result<&Pool, EngineError> {
        self.pools
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("no pool with id {}", id)))
    }

    pub fn pool_mut(&mut self, id: PoolId) -> Result<&mut Pool, EngineError> {
        self.pools
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("no pool with id {}", id)))
    }

    /// Whether a pool is already registered for `token`.
    pub fn contains_token(&self, token: Address) -> bool {
        self.pools.values().any(|p| p.token == token)
    }

    /// Live sum of all pool weights.
    pub fn total_weight(&self) -> u64 {
        self.pools.values().map(|p| p.weight as u64).sum()
    }

    /// Number of pools registered so far.
    pub fn pool_count(&self) -> u32 {
        self.next_id - 1
    }

    /// Iterate pools in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &Pool)> {
        self.pools.iter().map(|(id, p)| (*id, p))
    }

    /// Validate a batch of weight changes plus `additional` weight for a
    /// pool about to be created, without mutating anything.
    ///
    /// # Errors
    /// - `NotFound` if any changed pool id is unknown.
    /// - `Validation` if a pool id appears twice in the batch, or if the
    ///   post-change total would exceed `MAX_WEIGHT` ("wrong multiplier").
    pub fn validate_weights(
        &self,
        changes: &[(PoolId, u32)],
        additional: u32,
    ) -> Result<(), EngineError> {
        let mut seen: BTreeMap<PoolId, u32> = BTreeMap::new();
        for (id, weight) in changes {
            if seen.insert(*id, *weight).is_some() {
                return Err(EngineError::Validation(format!(
                    "pool {} listed twice in weight changes",
                    id
                )));
            }
        }

        let mut total = additional as u64;
        for (id, pool) in &self.pools {
            total += seen.get(id).copied().unwrap_or(pool.weight) as u64;
        }
        for id in seen.keys() {
            if !self.pools.contains_key(id) {
                return Err(EngineError::NotFound(format!("no pool with id {}", id)));
            }
        }

        if total > MAX_WEIGHT as u64 {
            return Err(EngineError::Validation(format!(
                "wrong multiplier: total pool weight {} exceeds cap {}",
                total, MAX_WEIGHT
            )));
        }
        Ok(())
    }

    /// Append a pool and return its id. Weight and uniqueness must already
    /// have been validated.
    pub fn insert(&mut self, pool: Pool) -> PoolId {
        let id = self.next_id;
        self.pools.insert(id, pool);
        self.next_id += 1;
        id
    }

    /// Set a pool's weight. Invariant checks belong to `validate_weights`.
    pub fn set_weight(&mut self, id: PoolId, weight: u32) -> Result<(), EngineError> {
        self.pool_mut(id)?.weight = weight;
        Ok(())
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pool(token_tag: u8, weight: u32) -> Pool {
        Pool {
            token: [token_tag; 32],
            kind: PoolKind::Regular,
            weight,
            deposit_fee_bps: 0,
            acc_reward_per_share: 0,
            last_update: 0,
            total_staked: 0,
        }
    }

    #[test]
    fn test_ids_are_sequential_from_one() {
        let mut registry = PoolRegistry::new();
        assert_eq!(registry.insert(make_pool(1, 100)), 1);
        assert_eq!(registry.insert(make_pool(2, 100)), 2);
        assert_eq!(registry.pool_count(), 2);
        assert!(registry.pool(0).is_err());
    }

    #[test]
    fn test_contains_token() {
        let mut registry = PoolRegistry::new();
        registry.insert(make_pool(1, 100));
        assert!(registry.contains_token([1u8; 32]));
        assert!(!registry.contains_token([2u8; 32]));
    }

    #[test]
    fn test_total_weight() {
        let mut registry = PoolRegistry::new();
        registry.insert(make_pool(1, 500_000));
        registry.insert(make_pool(2, 300_000));
        assert_eq!(registry.total_weight(), 800_000);
    }

    #[test]
    fn test_validate_weights_over_cap() {
        let mut registry = PoolRegistry::new();
        registry.insert(make_pool(1, 500_000));
        registry.insert(make_pool(2, 300_000));
        registry.insert(make_pool(3, 100_000));

        // 900_000 + 300_000 > 1_000_000
        assert!(registry.validate_weights(&[], 300_000).is_err());
        // Cured by reducing pool 1 in the same batch.
        assert!(registry.validate_weights(&[(1, 200_000)], 300_000).is_ok());
    }

    #[test]
    fn test_validate_weights_unknown_pool() {
        let registry = PoolRegistry::new();
        let result = registry.validate_weights(&[(7, 100)], 0);
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_validate_weights_duplicate_id() {
        let mut registry = PoolRegistry::new();
        registry.insert(make_pool(1, 100));
        let result = registry.validate_weights(&[(1, 50), (1, 60)], 0);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_set_weight() {
        let mut registry = PoolRegistry::new();
        registry.insert(make_pool(1, 100));
        registry.set_weight(1, 250).unwrap();
        assert_eq!(registry.pool(1).unwrap().weight, 250);
        assert!(registry.set_weight(9, 250).is_err());
    }
}
