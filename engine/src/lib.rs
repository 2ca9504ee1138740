//! The staking/reward engine.
//!
//! Holders lock unique assets into custody and accrue fungible reward
//! proportional to elapsed staking time:
//! `reward(owner) = Σ over positions (elapsed_seconds × rate_per_second)`
//!
//! This crate handles:
//! - Stake/unstake custody transitions against an external asset registry
//! - Reward accrual folding (deterministic integer arithmetic, rate read at
//!   fold time)
//! - Claims that mint through an external reward issuer
//! - Admin-gated configuration (staking/claiming switches, reward rate)
//!
//! Every operation completes all ledger writes before its single outbound
//! collaborator call, and compensates those writes if the call fails.

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod ledger;
pub mod position;

pub use config::StakingConfig;
pub use controller::StakingController;
pub use error::StakingError;
pub use event::{EventBus, StakingEvent};
pub use ledger::RewardLedger;
pub use position::{RewardAccount, StakePosition};
