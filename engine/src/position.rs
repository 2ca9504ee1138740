//! Stake positions and per-owner reward accounts.

use serde::{Deserialize, Serialize};
use vaultstake_types::{Address, AssetId, RewardAmount, Timestamp};

/// A live stake position — one per staked asset id.
///
/// Its presence in the ledger implies the engine currently holds custody of
/// the asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    pub asset: AssetId,
    /// The address that staked the asset and may unstake it.
    pub owner: Address,
    /// When the position was opened.
    pub staked_at: Timestamp,
    /// Checkpoint up to which reward has already been folded into the
    /// owner's accrued balance. Advanced on every fold.
    pub last_accrued_at: Timestamp,
}

impl StakePosition {
    /// Open a new position at `now`. The accrual checkpoint starts at the
    /// stake time, so a position folded immediately yields zero.
    pub fn open(asset: AssetId, owner: Address, now: Timestamp) -> Self {
        Self {
            asset,
            owner,
            staked_at: now,
            last_accrued_at: now,
        }
    }
}

/// Accrued-but-unclaimed reward for one address.
///
/// `accrued` only grows, except for the atomic reset performed by a claim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccount {
    pub accrued: RewardAmount,
}
