//! Asset ownership registry contract.

use crate::error::RegistryError;
use std::collections::HashMap;
use vaultstake_types::{Address, AssetId};

/// Tracks ownership of unique asset identifiers.
///
/// One asset id, one owner at a time. `transfer` is the only mutation the
/// engine ever performs; registration/minting belongs to the host.
pub trait AssetRegistry {
    /// Current owner of an asset.
    fn owner_of(&self, asset: AssetId) -> Result<Address, RegistryError>;

    /// Move custody of `asset` from `from` to `to`.
    ///
    /// Fails if `from` is not the current owner.
    fn transfer(&mut self, from: &Address, to: &Address, asset: AssetId)
        -> Result<(), RegistryError>;
}

/// An in-memory asset registry.
///
/// Records every successful transfer so tests can assert on custody movement,
/// not just on the final owner.
pub struct MemoryAssetRegistry {
    owners: HashMap<AssetId, Address>,
    transfers: Vec<(Address, Address, AssetId)>,
}

impl MemoryAssetRegistry {
    pub fn new() -> Self {
        Self {
            owners: HashMap::new(),
            transfers: Vec::new(),
        }
    }

    /// Register (mint) an asset to an initial owner, replacing any prior
    /// registration of the same id.
    pub fn register(&mut self, owner: Address, asset: AssetId) {
        self.owners.insert(asset, owner);
    }

    /// All successful transfers, oldest first.
    pub fn transfer_log(&self) -> &[(Address, Address, AssetId)] {
        &self.transfers
    }
}

impl Default for MemoryAssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry for MemoryAssetRegistry {
    fn owner_of(&self, asset: AssetId) -> Result<Address, RegistryError> {
        self.owners
            .get(&asset)
            .cloned()
            .ok_or(RegistryError::UnknownAsset(asset))
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        asset: AssetId,
    ) -> Result<(), RegistryError> {
        let holder = self
            .owners
            .get(&asset)
            .ok_or(RegistryError::UnknownAsset(asset))?;
        if holder != from {
            return Err(RegistryError::NotOwner {
                asset,
                holder: holder.clone(),
            });
        }
        self.owners.insert(asset, to.clone());
        self.transfers.push((from.clone(), to.clone(), asset));
        Ok(())
    }
}
