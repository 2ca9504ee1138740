//! Engine-specific errors.

use thiserror::Error;
use vaultstake_registry::{IssuerError, RegistryError};
use vaultstake_types::AssetId;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("caller is not authorized for this operation")]
    Unauthorized,

    #[error("staking is disabled")]
    StakingDisabled,

    #[error("claiming is disabled")]
    ClaimingDisabled,

    #[error("{0} already has a live stake position")]
    AlreadyStaked(AssetId),

    #[error("{0} has no live stake position")]
    NotStaked(AssetId),

    #[error("arithmetic overflow in reward computation")]
    Overflow,

    #[error("asset registry call failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("reward issuer call failed: {0}")]
    Issuer(#[from] IssuerError),

    #[error("store error: {0}")]
    Store(String),
}
