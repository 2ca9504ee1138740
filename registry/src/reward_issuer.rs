//! Fungible reward token issuer contract.

use crate::error::IssuerError;
use std::collections::HashMap;
use vaultstake_types::{Address, RewardAmount};

/// A fungible-balance ledger capable of crediting an address with newly
/// issued reward units.
pub trait RewardIssuer {
    /// Mint `amount` to `to`. Fails if the issuer is paused.
    fn mint(&mut self, to: &Address, amount: RewardAmount) -> Result<(), IssuerError>;
}

/// An in-memory reward issuer with a pause switch for failure-path testing.
pub struct MemoryRewardIssuer {
    balances: HashMap<Address, RewardAmount>,
    paused: bool,
}

impl MemoryRewardIssuer {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            paused: false,
        }
    }

    pub fn balance_of(&self, address: &Address) -> RewardAmount {
        self.balances
            .get(address)
            .copied()
            .unwrap_or(RewardAmount::ZERO)
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

impl Default for MemoryRewardIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl RewardIssuer for MemoryRewardIssuer {
    fn mint(&mut self, to: &Address, amount: RewardAmount) -> Result<(), IssuerError> {
        if self.paused {
            return Err(IssuerError::Paused);
        }
        let balance = self.balances.entry(to.clone()).or_insert(RewardAmount::ZERO);
        *balance = balance.checked_add(amount).ok_or(IssuerError::Overflow)?;
        Ok(())
    }
}
