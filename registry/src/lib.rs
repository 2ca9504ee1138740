//! External collaborator contracts for the staking engine.
//!
//! The engine never owns asset custody records, reward token balances, or the
//! wall clock. All three arrive through the traits in this crate:
//! - [`AssetRegistry`] — who holds which unique asset, and custody transfer.
//! - [`RewardIssuer`] — minting fungible reward units.
//! - [`Clock`] — the current time.
//!
//! Each trait ships with a deterministic in-memory implementation that
//! doubles as the test double: swap the real backend in production, keep the
//! in-memory one in tests.

pub mod asset_registry;
pub mod clock;
pub mod error;
pub mod reward_issuer;

pub use asset_registry::{AssetRegistry, MemoryAssetRegistry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{IssuerError, RegistryError};
pub use reward_issuer::{MemoryRewardIssuer, RewardIssuer};
