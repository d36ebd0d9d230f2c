// crates/solstice-engine/src/engine.rs
//
// The reward engine: one injectable instance owning the emission schedule,
// the pool registry, the position ledger, and the token-collaborator
// handle. Every state-changing call is atomic and totally ordered; engine
// state is committed last, after all collaborator calls, so a failure
// leaves no partial mutation.

use solstice_core::{Address, EngineError, PoolId, Timestamp, TokenCollaborator};

use crate::accumulator::{accrue, pending_amount, reward_debt};
use crate::config::EngineConfig;
use crate::emission::{pool_rate, EmissionSchedule};
use crate::ledger::{PositionLedger, UserPosition};
use crate::registry::{Pool, PoolKind, PoolRegistry, BPS_DENOMINATOR};

/// Multi-pool reward distribution engine.
///
/// Generic over the token collaborator so tests can run independent
/// instances against their own in-memory banks.
pub struct RewardEngine<B: TokenCollaborator> {
    /// The engine's own account: holder of staked balances and the caller
    /// context for all collaborator operations.
    address: Address,
    operator: Address,
    dev_address: Address,
    reward_token: Address,
    /// Cooperating deployments sharing the global emission budget.
    /// Starts at 1 and only increases.
    active_chains: u32,
    schedule: EmissionSchedule,
    registry: PoolRegistry,
    ledger: PositionLedger,
    creation_fee_cap_bps: u16,
    edit_fee_cap_bps: u16,
    bank: B,
}

impl<B: TokenCollaborator> RewardEngine<B> {
    pub fn new(
        config: &EngineConfig,
        address: Address,
        operator: Address,
        dev_address: Address,
        reward_token: Address,
        genesis: Timestamp,
        bank: B,
    ) -> Self {
        Self {
            address,
            operator,
            dev_address,
            reward_token,
            active_chains: 1,
            schedule: EmissionSchedule::new(
                genesis,
                config.emission_year1 as u128,
                config.emission_base as u128,
                config.max_halvings,
            ),
            registry: PoolRegistry::new(),
            ledger: PositionLedger::new(),
            creation_fee_cap_bps: config.creation_fee_cap_bps,
            edit_fee_cap_bps: config.edit_fee_cap_bps,
            bank,
        }
    }

    // -----------------------------------------------------------------
    // Administrative surface (operator-gated)
    // -----------------------------------------------------------------

    /// Register a new pool.
    ///
    /// `adjustments` lists explicit weight reductions to existing pools,
    /// applied in the same operation so the post-state weight sum stays
    /// within the cap. Adjusted pools are settled at their old weight
    /// before the new weights apply.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the operator.
    /// - `Validation` if `token` is already registered, the fee exceeds
    ///   the creation-time cap, or the post-adjustment weight sum exceeds
    ///   the cap.
    /// - `NotFound` if an adjustment references an unknown pool.
    pub fn add_pool(
        &mut self,
        caller: Address,
        token: Address,
        kind: PoolKind,
        weight: u32,
        deposit_fee_bps: u16,
        adjustments: &[(PoolId, u32)],
        now: Timestamp,
    ) -> Result<PoolId, EngineError> {
        self.require_operator(caller)?;
        if self.registry.contains_token(token) {
            return Err(EngineError::Validation(
                "a pool already exists for this token".to_string(),
            ));
        }
        if deposit_fee_bps > self.creation_fee_cap_bps {
            return Err(EngineError::Validation(format!(
                "deposit fee {} bps exceeds the creation cap of {} bps",
                deposit_fee_bps, self.creation_fee_cap_bps
            )));
        }
        self.registry.validate_weights(adjustments, weight)?;

        for (id, _) in adjustments {
            self.refresh_pool(*id, now)?;
        }
        for (id, new_weight) in adjustments {
            self.registry.set_weight(*id, *new_weight)?;
        }
        let id = self.registry.insert(Pool {
            token,
            kind,
            weight,
            deposit_fee_bps,
            acc_reward_per_share: 0,
            last_update: now,
            total_staked: 0,
        });
        tracing::info!(
            "Registered pool {} (kind={:?}, weight={}, fee={} bps)",
            id,
            kind,
            weight,
            deposit_fee_bps
        );
        Ok(id)
    }

    /// Change an existing pool's deposit fee, bounded by the edit-time cap.
    pub fn edit_pool_fee(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        deposit_fee_bps: u16,
    ) -> Result<(), EngineError> {
        self.require_operator(caller)?;
        if deposit_fee_bps > self.edit_fee_cap_bps {
            return Err(EngineError::Validation(format!(
                "deposit fee {} bps exceeds the edit cap of {} bps",
                deposit_fee_bps, self.edit_fee_cap_bps
            )));
        }
        self.registry.pool_mut(pool_id)?.deposit_fee_bps = deposit_fee_bps;
        tracing::info!("Pool {} deposit fee set to {} bps", pool_id, deposit_fee_bps);
        Ok(())
    }

    /// Atomically re-weight a batch of pools.
    ///
    /// The whole batch is validated before any mutation; each touched pool
    /// is settled at its old weight first so already-accrued reward is not
    /// retroactively changed.
    pub fn edit_weights(
        &mut self,
        caller: Address,
        changes: &[(PoolId, u32)],
        now: Timestamp,
    ) -> Result<(), EngineError> {
        self.require_operator(caller)?;
        self.registry.validate_weights(changes, 0)?;
        for (id, _) in changes {
            self.refresh_pool(*id, now)?;
        }
        for (id, weight) in changes {
            self.registry.set_weight(*id, *weight)?;
        }
        tracing::info!(
            "Re-weighted {} pool(s); total weight now {}",
            changes.len(),
            self.registry.total_weight()
        );
        Ok(())
    }

    /// Record one more cooperating chain instance. Monotonic; every pool
    /// is settled at the old divisor before the split changes.
    pub fn add_chain(&mut self, caller: Address, now: Timestamp) -> Result<u32, EngineError> {
        self.require_operator(caller)?;
        self.refresh_all(now)?;
        self.active_chains += 1;
        tracing::info!(
            "Chain instance added; emission now split {} ways",
            self.active_chains
        );
        Ok(self.active_chains)
    }

    /// Rotate the deposit-fee recipient.
    pub fn set_dev_address(&mut self, caller: Address, dev: Address) -> Result<(), EngineError> {
        self.require_operator(caller)?;
        self.dev_address = dev;
        tracing::info!("Fee recipient rotated");
        Ok(())
    }

    /// Hand operatorship to a new account.
    pub fn set_operator(&mut self, caller: Address, operator: Address) -> Result<(), EngineError> {
        self.require_operator(caller)?;
        self.operator = operator;
        tracing::info!("Operator handed over");
        Ok(())
    }

    // -----------------------------------------------------------------
    // User surface
    // -----------------------------------------------------------------

    /// Stake `amount` into a regular pool, settling pending reward first.
    ///
    /// The deposit fee is skimmed to the fee recipient and only the net
    /// amount is credited. `amount == 0` is a valid harvest-only call.
    /// Returns the pending reward paid out.
    ///
    /// # Errors
    /// - `NotFound` if the pool does not exist.
    /// - `InvalidState` if the pool is third-party.
    /// - `Collaborator` if the stake pull or reward mint fails; a failed
    ///   mint after a successful pull is unwound before the error surfaces.
    pub fn deposit(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, EngineError> {
        let (token, fee_bps, acc) = {
            let pool = self.registry.pool(pool_id)?;
            if pool.kind != PoolKind::Regular {
                return Err(EngineError::InvalidState(format!(
                    "pool {} is a third-party pool and does not accept deposits",
                    pool_id
                )));
            }
            (pool.token, pool.deposit_fee_bps, self.projected_acc(pool, now))
        };
        let position = self.ledger.position(pool_id, caller);
        let pending = if position.amount > 0 {
            pending_amount(position.amount, acc, position.reward_debt)
        } else {
            0
        };
        let fee = amount.saturating_mul(fee_bps as u128) / BPS_DENOMINATOR;
        let net = amount - fee;

        if amount > 0 {
            self.bank.transfer_from(token, caller, self.address, amount)?;
        }
        if pending > 0 {
            if let Err(e) = self.bank.mint(self.reward_token, caller, pending) {
                if amount > 0 {
                    // Unwind the stake pull so a failed reward mint leaves
                    // no partial transfer.
                    self.bank.transfer(token, caller, amount)?;
                }
                return Err(e);
            }
        }
        if fee > 0 {
            self.bank.transfer(token, self.dev_address, fee)?;
        }

        let pool = self.registry.pool_mut(pool_id)?;
        pool.acc_reward_per_share = acc;
        if now > pool.last_update {
            pool.last_update = now;
        }
        pool.total_staked += net;
        let staked = position.amount + net;
        self.ledger.set(
            pool_id,
            caller,
            UserPosition {
                amount: staked,
                reward_debt: reward_debt(staked, acc),
            },
        );
        tracing::debug!(
            "Deposit of {} into pool {} (fee {}, pending paid {})",
            amount,
            pool_id,
            fee,
            pending
        );
        Ok(pending)
    }

    /// Settle pending reward without moving stake.
    pub fn harvest(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        now: Timestamp,
    ) -> Result<u128, EngineError> {
        self.deposit(caller, pool_id, 0, now)
    }

    /// Unstake `amount` from a regular pool, settling pending reward first.
    /// Returns the pending reward paid out.
    ///
    /// # Errors
    /// `InvalidState` if `amount` exceeds the caller's staked balance.
    pub fn withdraw(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, EngineError> {
        let (token, acc) = {
            let pool = self.registry.pool(pool_id)?;
            if pool.kind != PoolKind::Regular {
                return Err(EngineError::InvalidState(format!(
                    "pool {} is a third-party pool and holds no deposits",
                    pool_id
                )));
            }
            (pool.token, self.projected_acc(pool, now))
        };
        let position = self.ledger.position(pool_id, caller);
        if amount > position.amount {
            return Err(EngineError::InvalidState(format!(
                "withdraw of {} exceeds staked balance of {}",
                amount, position.amount
            )));
        }
        let pending = pending_amount(position.amount, acc, position.reward_debt);

        if pending > 0 {
            self.bank.mint(self.reward_token, caller, pending)?;
        }
        if amount > 0 {
            self.bank.transfer(token, caller, amount)?;
        }

        let pool = self.registry.pool_mut(pool_id)?;
        pool.acc_reward_per_share = acc;
        if now > pool.last_update {
            pool.last_update = now;
        }
        pool.total_staked -= amount;
        let staked = position.amount - amount;
        self.ledger.set(
            pool_id,
            caller,
            UserPosition {
                amount: staked,
                reward_debt: reward_debt(staked, acc),
            },
        );
        tracing::debug!(
            "Withdraw of {} from pool {} (pending paid {})",
            amount,
            pool_id,
            pending
        );
        Ok(pending)
    }

    /// Return the caller's full staked balance immediately, forfeiting any
    /// unclaimed pending reward. The accumulator's time cursor is left
    /// untouched. Escape hatch for when the engine or token is suspected
    /// compromised.
    pub fn emergency_withdraw(
        &mut self,
        caller: Address,
        pool_id: PoolId,
    ) -> Result<u128, EngineError> {
        let token = {
            let pool = self.registry.pool(pool_id)?;
            if pool.kind != PoolKind::Regular {
                return Err(EngineError::InvalidState(format!(
                    "pool {} is a third-party pool and holds no deposits",
                    pool_id
                )));
            }
            pool.token
        };
        let position = self.ledger.position(pool_id, caller);
        if position.amount > 0 {
            self.bank.transfer(token, caller, position.amount)?;
        }
        let pool = self.registry.pool_mut(pool_id)?;
        pool.total_staked = pool.total_staked.saturating_sub(position.amount);
        self.ledger.clear(pool_id, caller);
        tracing::info!(
            "Emergency withdraw of {} from pool {}",
            position.amount,
            pool_id
        );
        Ok(position.amount)
    }

    /// Mint a third-party pool's allocation accrued since its last mint,
    /// directly to the caller. Self-service: only the contract registered
    /// as the pool's token may call. Returns the minted amount.
    pub fn mint_rewards(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        now: Timestamp,
    ) -> Result<u128, EngineError> {
        let (elapsed, weight) = {
            let pool = self.registry.pool(pool_id)?;
            if pool.kind != PoolKind::ThirdParty {
                return Err(EngineError::InvalidState(format!(
                    "pool {} is a regular staking pool; its reward accrues to the accumulator",
                    pool_id
                )));
            }
            if caller != pool.token {
                return Err(EngineError::Unauthorized(format!(
                    "only the contract registered for pool {} may mint its rewards",
                    pool_id
                )));
            }
            if now <= pool.last_update {
                return Ok(0);
            }
            (now - pool.last_update, pool.weight)
        };
        let rate = self.schedule.rate_at(now, self.active_chains);
        let share = pool_rate(rate, weight, self.registry.total_weight());
        let minted = (elapsed as u128).saturating_mul(share);
        if minted > 0 {
            self.bank.mint(self.reward_token, caller, minted)?;
        }
        self.registry.pool_mut(pool_id)?.last_update = now;
        tracing::debug!("Minted {} for third-party pool {}", minted, pool_id);
        Ok(minted)
    }

    /// Bring every regular pool's accumulator up to date.
    pub fn refresh_all(&mut self, now: Timestamp) -> Result<(), EngineError> {
        let ids: Vec<PoolId> = self.registry.iter().map(|(id, _)| id).collect();
        for id in ids {
            self.refresh_pool(id, now)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Read-only surface
    // -----------------------------------------------------------------

    /// Reward claimable by `user` from `pool_id` at `now`. Simulates the
    /// accumulator refresh without persisting it.
    pub fn pending_reward(
        &self,
        pool_id: PoolId,
        user: Address,
        now: Timestamp,
    ) -> Result<u128, EngineError> {
        let pool = self.registry.pool(pool_id)?;
        if pool.kind != PoolKind::Regular {
            return Ok(0);
        }
        let acc = self.projected_acc(pool, now);
        let position = self.ledger.position(pool_id, user);
        Ok(pending_amount(position.amount, acc, position.reward_debt))
    }

    /// Engine-wide emission rate at `now`, post chain split.
    pub fn emission_rate(&self, now: Timestamp) -> u128 {
        self.schedule.rate_at(now, self.active_chains)
    }

    /// A pool's current per-second emission share at `now`.
    pub fn pool_emission(&self, pool_id: PoolId, now: Timestamp) -> Result<u128, EngineError> {
        let pool = self.registry.pool(pool_id)?;
        let rate = self.schedule.rate_at(now, self.active_chains);
        Ok(pool_rate(rate, pool.weight, self.registry.total_weight()))
    }

    pub fn pool(&self, pool_id: PoolId) -> Result<&Pool, EngineError> {
        self.registry.pool(pool_id)
    }

    pub fn position(&self, pool_id: PoolId, user: Address) -> UserPosition {
        self.ledger.position(pool_id, user)
    }

    pub fn pool_count(&self) -> u32 {
        self.registry.pool_count()
    }

    pub fn total_weight(&self) -> u64 {
        self.registry.total_weight()
    }

    pub fn genesis(&self) -> Timestamp {
        self.schedule.genesis()
    }

    pub fn active_chains(&self) -> u32 {
        self.active_chains
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn dev_address(&self) -> Address {
        self.dev_address
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    // -----------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------

    fn require_operator(&self, caller: Address) -> Result<(), EngineError> {
        if caller != self.operator {
            return Err(EngineError::Unauthorized(
                "caller is not the engine operator".to_string(),
            ));
        }
        Ok(())
    }

    /// The pool's accumulator brought up to `now`, without persisting.
    /// Both the mutating refresh and the read-only queries use this, so
    /// the two paths cannot drift.
    fn projected_acc(&self, pool: &Pool, now: Timestamp) -> u128 {
        if now <= pool.last_update {
            return pool.acc_reward_per_share;
        }
        let elapsed = now - pool.last_update;
        let rate = self.schedule.rate_at(now, self.active_chains);
        let share = pool_rate(rate, pool.weight, self.registry.total_weight());
        accrue(pool.acc_reward_per_share, elapsed, share, pool.total_staked)
    }

    /// Persist the accumulator refresh for one pool. Third-party pools are
    /// settled through `mint_rewards` instead and are skipped here.
    fn refresh_pool(&mut self, pool_id: PoolId, now: Timestamp) -> Result<(), EngineError> {
        let acc = {
            let pool = self.registry.pool(pool_id)?;
            if pool.kind == PoolKind::ThirdParty {
                return Ok(());
            }
            self.projected_acc(pool, now)
        };
        let pool = self.registry.pool_mut(pool_id)?;
        pool.acc_reward_per_share = acc;
        if now > pool.last_update {
            pool.last_update = now;
        }
        Ok(())
    }
}
