use crate::StoreError;
use vaultstake_types::{Address, AssetId};

/// Store trait for persisting staking engine state to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the engine crate
/// (which would create a circular dependency). The engine
/// serializes/deserializes its own types.
pub trait StakingStore {
    fn get_position(&self, asset: AssetId) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_position(&self, asset: AssetId, bytes: &[u8]) -> Result<(), StoreError>;
    fn delete_position(&self, asset: AssetId) -> Result<(), StoreError>;
    fn iter_positions(&self) -> Result<Vec<(AssetId, Vec<u8>)>, StoreError>;

    fn get_reward_account(&self, owner: &Address) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_reward_account(&self, owner: &Address, bytes: &[u8]) -> Result<(), StoreError>;
    fn iter_reward_accounts(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
