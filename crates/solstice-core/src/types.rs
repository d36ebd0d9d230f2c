// crates/solstice-core/src/types.rs
//
// Canonical identifier and time types shared across the workspace.
//
// Accounts are raw 32-byte addresses; the engine never interprets them.
// All time values are unix seconds, passed explicitly into every operation
// so the engine carries no ambient clock.

/// Account identifier: 32 raw bytes (user, operator, token, or contract).
pub type Address = [u8; 32];

/// Sequential pool identifier. The first pool is id 1; id 0 is reserved
/// and never assigned.
pub type PoolId = u32;

/// Unix timestamp in seconds.
pub type Timestamp = u64;
