//! Thread-safe in-memory staking store.

use crate::staking::StakingStore;
use crate::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;
use vaultstake_types::{Address, AssetId};

/// An in-memory [`StakingStore`] backend.
///
/// Keys addresses by their raw string so the map doesn't hold `Address`
/// directly; iteration reconstructs the typed key.
pub struct MemoryStore {
    positions: Mutex<HashMap<u64, Vec<u8>>>,
    accounts: Mutex<HashMap<String, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            positions: Mutex::new(HashMap::new()),
            accounts: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StakingStore for MemoryStore {
    fn get_position(&self, asset: AssetId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.positions.lock().unwrap().get(&asset.as_u64()).cloned())
    }

    fn put_position(&self, asset: AssetId, bytes: &[u8]) -> Result<(), StoreError> {
        self.positions
            .lock()
            .unwrap()
            .insert(asset.as_u64(), bytes.to_vec());
        Ok(())
    }

    fn delete_position(&self, asset: AssetId) -> Result<(), StoreError> {
        self.positions.lock().unwrap().remove(&asset.as_u64());
        Ok(())
    }

    fn iter_positions(&self) -> Result<Vec<(AssetId, Vec<u8>)>, StoreError> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .iter()
            .map(|(id, bytes)| (AssetId::new(*id), bytes.clone()))
            .collect())
    }

    fn get_reward_account(&self, owner: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.accounts.lock().unwrap().get(owner.as_str()).cloned())
    }

    fn put_reward_account(&self, owner: &Address, bytes: &[u8]) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(owner.as_str().to_string(), bytes.to_vec());
        Ok(())
    }

    fn iter_reward_accounts(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .map(|(addr, bytes)| {
                if !addr.starts_with(Address::PREFIX) {
                    return Err(StoreError::Backend(format!(
                        "malformed address key: {addr}"
                    )));
                }
                Ok((Address::new(addr.clone()), bytes.clone()))
            })
            .collect()
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.meta.lock().unwrap().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
