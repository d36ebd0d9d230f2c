// crates/solstice-engine/src/lib.rs
//
// solstice-engine: the multi-pool reward distribution engine.
//
// A continuously-accruing, weight-proportional emission allocator serving
// many independent staking pools plus third-party pools that mint their
// allocation on demand. Pools carry parts-per-million weights under a
// global cap; reward accrues lazily to a fixed-point per-share
// accumulator and is settled pull-style on every user interaction.

pub mod accumulator;
pub mod config;
pub mod emission;
pub mod engine;
pub mod ledger;
pub mod registry;

// Re-export key types for ergonomic access from downstream crates.
pub use accumulator::{accrue, pending_amount, reward_debt, PRECISION};
pub use config::EngineConfig;
pub use emission::{pool_rate, EmissionSchedule};
pub use engine::RewardEngine;
pub use ledger::{PositionLedger, UserPosition};
pub use registry::{Pool, PoolKind, PoolRegistry, BPS_DENOMINATOR, MAX_WEIGHT};
