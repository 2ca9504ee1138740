//! Reward ledger — positions, owner index, and accrued balances.

use crate::error::StakingError;
use crate::position::{RewardAccount, StakePosition};
use std::collections::{HashMap, HashSet};
use vaultstake_types::{Address, AssetId, RewardAmount, Timestamp};

/// Bookkeeping for stake positions and accrued reward.
///
/// Owned by the controller and never addressable from outside it; every
/// precondition (gates, ownership, duplicates) is enforced by the controller
/// before it delegates here. The owner index keeps per-owner folds from
/// scanning every position.
pub struct RewardLedger {
    positions: HashMap<AssetId, StakePosition>,
    owner_index: HashMap<Address, HashSet<AssetId>>,
    accounts: HashMap<Address, RewardAccount>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            owner_index: HashMap::new(),
            accounts: HashMap::new(),
        }
    }

    /// Record a new (or restored) stake position.
    pub fn record_stake(&mut self, position: StakePosition) {
        self.owner_index
            .entry(position.owner.clone())
            .or_default()
            .insert(position.asset);
        self.positions.insert(position.asset, position);
    }

    /// Delete a position, returning it for custody return or rollback.
    pub fn record_unstake(&mut self, asset: AssetId) -> Option<StakePosition> {
        let position = self.positions.remove(&asset)?;
        if let Some(assets) = self.owner_index.get_mut(&position.owner) {
            assets.remove(&asset);
            if assets.is_empty() {
                self.owner_index.remove(&position.owner);
            }
        }
        Some(position)
    }

    /// Fold pending reward for every position owned by `owner` into the
    /// owner's accrued balance and advance each position's checkpoint to
    /// `now`. Returns the total delta credited.
    ///
    /// A no-op (returning zero) when the owner has no positions. Deltas are
    /// computed in a read-only pass before any checkpoint is advanced, so an
    /// overflow aborts with no partial writes.
    pub fn fold_accrual(
        &mut self,
        owner: &Address,
        now: Timestamp,
        rate: u128,
    ) -> Result<RewardAmount, StakingError> {
        let Some(assets) = self.owner_index.get(owner) else {
            return Ok(RewardAmount::ZERO);
        };

        let mut total = RewardAmount::ZERO;
        for asset in assets {
            if let Some(position) = self.positions.get(asset) {
                let elapsed = position.last_accrued_at.elapsed_since(now);
                let delta = rate
                    .checked_mul(elapsed as u128)
                    .ok_or(StakingError::Overflow)?;
                total = total
                    .checked_add(RewardAmount::new(delta))
                    .ok_or(StakingError::Overflow)?;
            }
        }

        let account = self.accounts.entry(owner.clone()).or_default();
        account.accrued = account
            .accrued
            .checked_add(total)
            .ok_or(StakingError::Overflow)?;

        for asset in self.owner_index.get(owner).into_iter().flatten() {
            if let Some(position) = self.positions.get_mut(asset) {
                position.last_accrued_at = now;
            }
        }
        Ok(total)
    }

    /// Read the accrued balance and atomically reset it to zero.
    pub fn credit_and_reset(&mut self, owner: &Address) -> RewardAmount {
        match self.accounts.get_mut(owner) {
            Some(account) => std::mem::take(&mut account.accrued),
            None => RewardAmount::ZERO,
        }
    }

    /// Put back a balance taken by `credit_and_reset` (mint rollback).
    ///
    /// The balance was zeroed by the paired `credit_and_reset` with no
    /// intervening fold, so the add cannot saturate.
    pub fn restore_accrued(&mut self, owner: &Address, amount: RewardAmount) {
        let account = self.accounts.entry(owner.clone()).or_default();
        account.accrued = account.accrued.saturating_add(amount);
    }

    pub fn position(&self, asset: AssetId) -> Option<&StakePosition> {
        self.positions.get(&asset)
    }

    pub fn is_staked(&self, asset: AssetId) -> bool {
        self.positions.contains_key(&asset)
    }

    /// Assets currently staked by `owner`, sorted for deterministic output.
    pub fn staked_assets(&self, owner: &Address) -> Vec<AssetId> {
        let mut assets: Vec<AssetId> = self
            .owner_index
            .get(owner)
            .into_iter()
            .flatten()
            .copied()
            .collect();
        assets.sort();
        assets
    }

    pub fn accrued(&self, owner: &Address) -> RewardAmount {
        self.accounts
            .get(owner)
            .map(|a| a.accrued)
            .unwrap_or(RewardAmount::ZERO)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate all live positions (persistence).
    pub fn iter_positions(&self) -> impl Iterator<Item = &StakePosition> {
        self.positions.values()
    }

    /// Iterate all reward accounts (persistence).
    pub fn iter_accounts(&self) -> impl Iterator<Item = (&Address, &RewardAccount)> {
        self.accounts.iter()
    }

    /// Insert a reward account directly (restore from storage).
    pub fn insert_account(&mut self, owner: Address, account: RewardAccount) {
        self.accounts.insert(owner, account);
    }
}

impl Default for RewardLedger {
    fn default() -> Self {
        Self::new()
    }
}
