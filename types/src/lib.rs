//! Fundamental types for the vaultstake engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, asset ids, reward amounts, and timestamps.

pub mod address;
pub mod amount;
pub mod asset;
pub mod time;

pub use address::Address;
pub use amount::RewardAmount;
pub use asset::AssetId;
pub use time::Timestamp;
