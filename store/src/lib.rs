//! Abstract storage traits for the vaultstake engine.
//!
//! The persistence mechanism belongs to the host: the engine serializes its
//! own types and hands opaque bytes to whatever backend implements
//! [`StakingStore`]. An in-memory backend is provided for tests and for
//! embedding the engine without durable storage.

pub mod error;
pub mod memory;
pub mod staking;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use staking::StakingStore;
