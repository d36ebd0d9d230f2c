// crates/solstice-token/src/bank.rs
//
// In-memory multi-asset fungible-token bank.
//
// Stands in for the external token contracts the engine settles against:
// per-token balances, allowances, a minter set, and an optional supply
// cap. The bank is constructed with the engine's account address; the
// `TokenCollaborator` calls act on behalf of that account, mirroring the
// caller-context of an on-chain token (allowances are spent against it,
// mint authority is checked against it).
//
// Every operation validates fully before mutating, so a failed call
// leaves all balances unchanged.

use std::collections::{HashMap, HashSet};

use solstice_core::{Address, EngineError, TokenCollaborator};

use crate::units::Slx;

/// Per-token ledger state.
#[derive(Debug, Clone, Default)]
struct TokenState {
    total_supply: u128,
    supply_cap: Option<u128>,
    minters: HashSet<Address>,
    balances: HashMap<Address, u128>,
    allowances: HashMap<Address, HashMap<Address, u128>>,
}

/// In-memory bank of fungible tokens keyed by token address.
#[derive(Debug, Clone)]
pub struct TokenBank {
    /// The account on whose behalf `TokenCollaborator` calls act.
    operator: Address,
    tokens: HashMap<Address, TokenState>,
}

impl TokenBank {
    /// Create an empty bank acting on behalf of `operator`.
    pub fn new(operator: Address) -> Self {
        Self {
            operator,
            tokens: HashMap::new(),
        }
    }

    /// Register a new token. `supply_cap` of `None` means uncapped.
    ///
    /// # Errors
    /// Returns `EngineError::Validation` if the token address is already registered.
    pub fn register(&mut self, token: Address, supply_cap: Option<u128>) -> Result<(), EngineError> {
        if self.tokens.contains_key(&token) {
            return Err(EngineError::Validation(
                "token address already registered with the bank".to_string(),
            ));
        }
        self.tokens.insert(
            token,
            TokenState {
                supply_cap,
                ..TokenState::default()
            },
        );
        Ok(())
    }

    /// Grant or revoke mint authority on `token` for `account`.
    pub fn set_minter(
        &mut self,
        token: Address,
        account: Address,
        enabled: bool,
    ) -> Result<(), EngineError> {
        let state = self.token_mut(token)?;
        if enabled {
            state.minters.insert(account);
        } else {
            state.minters.remove(&account);
        }
        Ok(())
    }

    /// Issue `amount` of `token` to `to`, bypassing the minter set but
    /// honoring the supply cap. Deployment-time seeding.
    pub fn issue(&mut self, token: Address, to: Address, amount: u128) -> Result<(), EngineError> {
        let state = self.token_mut(token)?;
        Self::check_cap(state, amount)?;
        state.total_supply = state.total_supply.saturating_add(amount);
        *state.balances.entry(to).or_default() += amount;
        Ok(())
    }

    /// Set the allowance `owner` grants `spender` on `token`.
    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), EngineError> {
        let state = self.token_mut(token)?;
        state
            .allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);
        Ok(())
    }

    /// Balance of `account` in `token`, zero if unknown.
    pub fn balance_of(&self, token: Address, account: Address) -> u128 {
        self.tokens
            .get(&token)
            .and_then(|s| s.balances.get(&account))
            .copied()
            .unwrap_or(0)
    }

    /// Remaining allowance `owner` has granted `spender` on `token`.
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> u128 {
        self.tokens
            .get(&token)
            .and_then(|s| s.allowances.get(&owner))
            .and_then(|m| m.get(&spender))
            .copied()
            .unwrap_or(0)
    }

    /// Total minted supply of `token`.
    pub fn total_supply(&self, token: Address) -> u128 {
        self.tokens.get(&token).map(|s| s.total_supply).unwrap_or(0)
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut TokenState, EngineError> {
        self.tokens
            .get_mut(&token)
            .ok_or_else(|| EngineError::Collaborator("unknown token address".to_string()))
    }

    fn check_cap(state: &TokenState, amount: u128) -> Result<(), EngineError> {
        if let Some(cap) = state.supply_cap {
            let minted = state.total_supply.saturating_add(amount);
            if minted > cap {
                return Err(EngineError::Collaborator(format!(
                    "mint of {} would exceed the supply cap of {}",
                    Slx::from_motes(amount),
                    Slx::from_motes(cap)
                )));
            }
        }
        Ok(())
    }

    fn move_balance(
        state: &mut TokenState,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), EngineError> {
        let from_balance = state.balances.get(&from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(EngineError::Collaborator(format!(
                "insufficient balance: have {}, need {}",
                Slx::from_motes(from_balance),
                Slx::from_motes(amount)
            )));
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        state.balances.insert(from, from_balance - amount);
        *state.balances.entry(to).or_default() += amount;
        Ok(())
    }
}

impl TokenCollaborator for TokenBank {
    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), EngineError> {
        let spender = self.operator;
        let state = self.token_mut(token)?;
        let allowed = state
            .allowances
            .get(&owner)
            .and_then(|m| m.get(&spender))
            .copied()
            .unwrap_or(0);
        if allowed < amount {
            return Err(EngineError::Collaborator(format!(
                "insufficient allowance: approved {}, need {}",
                Slx::from_motes(allowed),
                Slx::from_motes(amount)
            )));
        }
        Self::move_balance(state, owner, to, amount)?;
        // Only spend the allowance once the balance move has succeeded.
        state
            .allowances
            .entry(owner)
            .or_default()
            .insert(spender, allowed - amount);
        Ok(())
    }

    fn transfer(&mut self, token: Address, to: Address, amount: u128) -> Result<(), EngineError> {
        let from = self.operator;
        let state = self.token_mut(token)?;
        Self::move_balance(state, from, to, amount)
    }

    fn mint(&mut self, token: Address, to: Address, amount: u128) -> Result<(), EngineError> {
        let minter = self.operator;
        let state = self.token_mut(token)?;
        if !state.minters.contains(&minter) {
            return Err(EngineError::Collaborator(
                "account does not hold mint authority for this token".to_string(),
            ));
        }
        Self::check_cap(state, amount)?;
        state.total_supply = state.total_supply.saturating_add(amount);
        *state.balances.entry(to).or_default() += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::MOTE_PER_SLX;

    const ENGINE: Address = [9u8; 32];
    const ALICE: Address = [1u8; 32];
    const BOB: Address = [2u8; 32];
    const TOKEN: Address = [7u8; 32];

    fn bank_with_token() -> TokenBank {
        let mut bank = TokenBank::new(ENGINE);
        bank.register(TOKEN, None).unwrap();
        bank
    }

    #[test]
    fn test_register_duplicate_token() {
        let mut bank = bank_with_token();
        assert!(bank.register(TOKEN, None).is_err());
    }

    #[test]
    fn test_issue_and_balance() {
        let mut bank = bank_with_token();
        bank.issue(TOKEN, ALICE, 100 * MOTE_PER_SLX).unwrap();
        assert_eq!(bank.balance_of(TOKEN, ALICE), 100 * MOTE_PER_SLX);
        assert_eq!(bank.total_supply(TOKEN), 100 * MOTE_PER_SLX);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let mut bank = bank_with_token();
        bank.issue(TOKEN, ALICE, 100 * MOTE_PER_SLX).unwrap();
        bank.approve(TOKEN, ALICE, ENGINE, 60 * MOTE_PER_SLX).unwrap();

        bank.transfer_from(TOKEN, ALICE, ENGINE, 40 * MOTE_PER_SLX)
            .unwrap();
        assert_eq!(bank.balance_of(TOKEN, ALICE), 60 * MOTE_PER_SLX);
        assert_eq!(bank.balance_of(TOKEN, ENGINE), 40 * MOTE_PER_SLX);
        assert_eq!(bank.allowance(TOKEN, ALICE, ENGINE), 20 * MOTE_PER_SLX);
    }

    #[test]
    fn test_transfer_from_insufficient_allowance() {
        let mut bank = bank_with_token();
        bank.issue(TOKEN, ALICE, 100 * MOTE_PER_SLX).unwrap();
        bank.approve(TOKEN, ALICE, ENGINE, 10 * MOTE_PER_SLX).unwrap();

        let result = bank.transfer_from(TOKEN, ALICE, ENGINE, 40 * MOTE_PER_SLX);
        assert!(result.is_err());
        // Nothing moved, allowance intact
        assert_eq!(bank.balance_of(TOKEN, ALICE), 100 * MOTE_PER_SLX);
        assert_eq!(bank.allowance(TOKEN, ALICE, ENGINE), 10 * MOTE_PER_SLX);
    }

    #[test]
    fn test_transfer_from_insufficient_balance() {
        let mut bank = bank_with_token();
        bank.issue(TOKEN, ALICE, 10 * MOTE_PER_SLX).unwrap();
        bank.approve(TOKEN, ALICE, ENGINE, 100 * MOTE_PER_SLX).unwrap();

        let result = bank.transfer_from(TOKEN, ALICE, ENGINE, 40 * MOTE_PER_SLX);
        assert!(result.is_err());
        assert_eq!(bank.allowance(TOKEN, ALICE, ENGINE), 100 * MOTE_PER_SLX);
    }

    #[test]
    fn test_transfer_moves_operator_funds() {
        let mut bank = bank_with_token();
        bank.issue(TOKEN, ENGINE, 50 * MOTE_PER_SLX).unwrap();
        bank.transfer(TOKEN, BOB, 20 * MOTE_PER_SLX).unwrap();
        assert_eq!(bank.balance_of(TOKEN, ENGINE), 30 * MOTE_PER_SLX);
        assert_eq!(bank.balance_of(TOKEN, BOB), 20 * MOTE_PER_SLX);
    }

    #[test]
    fn test_mint_requires_authority() {
        let mut bank = bank_with_token();
        assert!(bank.mint(TOKEN, ALICE, MOTE_PER_SLX).is_err());

        bank.set_minter(TOKEN, ENGINE, true).unwrap();
        assert!(bank.mint(TOKEN, ALICE, MOTE_PER_SLX).is_ok());
        assert_eq!(bank.balance_of(TOKEN, ALICE), MOTE_PER_SLX);

        bank.set_minter(TOKEN, ENGINE, false).unwrap();
        assert!(bank.mint(TOKEN, ALICE, MOTE_PER_SLX).is_err());
    }

    #[test]
    fn test_supply_cap_enforced() {
        let mut bank = TokenBank::new(ENGINE);
        bank.register(TOKEN, Some(100 * MOTE_PER_SLX)).unwrap();
        bank.set_minter(TOKEN, ENGINE, true).unwrap();

        bank.mint(TOKEN, ALICE, 80 * MOTE_PER_SLX).unwrap();
        assert!(bank.mint(TOKEN, ALICE, 30 * MOTE_PER_SLX).is_err());
        assert_eq!(bank.total_supply(TOKEN), 80 * MOTE_PER_SLX);
        bank.mint(TOKEN, ALICE, 20 * MOTE_PER_SLX).unwrap();
    }

    #[test]
    fn test_unknown_token() {
        let mut bank = TokenBank::new(ENGINE);
        assert!(bank.transfer(TOKEN, BOB, 1).is_err());
        assert!(bank.mint(TOKEN, BOB, 1).is_err());
        assert_eq!(bank.balance_of(TOKEN, BOB), 0);
    }
}
