// crates/solstice-core/src/lib.rs
//
// solstice-core: Core types, errors, and the token-collaborator boundary
// for the Solstice reward-distribution engine.
//
// This is the leaf crate the other workspace crates depend on. It defines
// the canonical identifier types, the protocol-wide error enum, and the
// trait interface to the external fungible-token contracts.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic access from downstream crates.
pub use error::EngineError;
pub use traits::TokenCollaborator;
pub use types::{Address, PoolId, Timestamp};
