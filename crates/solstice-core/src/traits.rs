// crates/solstice-core/src/traits.rs

use crate::error::EngineError;
use crate::types::Address;

/// Boundary to the fungible-token contracts the engine settles against.
///
/// Implemented by solstice-token (in-memory bank). Every call is atomic:
/// it either applies fully or fails with `EngineError::Collaborator` and
/// no balance change. The implementation is constructed with the engine's
/// account, which acts as the caller for allowance and mint-authority
/// checks.
pub trait TokenCollaborator: Send + Sync {
    /// Move `amount` of `token` from `owner` to `to`, spending the
    /// allowance `owner` granted to the engine account.
    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), EngineError>;

    /// Move `amount` of `token` from the engine account's own balance to `to`.
    fn transfer(&mut self, token: Address, to: Address, amount: u128) -> Result<(), EngineError>;

    /// Mint `amount` of `token` to `to`. Requires the engine account to
    /// hold mint authority on `token`; fails if a supply cap would be
    /// exceeded.
    fn mint(&mut self, token: Address, to: Address, amount: u128) -> Result<(), EngineError>;
}
