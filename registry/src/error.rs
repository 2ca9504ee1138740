use thiserror::Error;
use vaultstake_types::{Address, AssetId};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0} is not registered")]
    UnknownAsset(AssetId),

    #[error("{asset} is held by {holder}, transfer requires the current owner")]
    NotOwner { asset: AssetId, holder: Address },
}

#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("reward issuer is paused")]
    Paused,

    #[error("arithmetic overflow in reward balance")]
    Overflow,
}
