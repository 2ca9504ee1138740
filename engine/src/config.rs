//! Engine configuration — admin-tunable switches and the reward rate.

use serde::{Deserialize, Serialize};

/// Admin-controlled configuration, exclusively owned by the controller.
///
/// Starts fully disabled with a zero rate; only the admin operations on the
/// controller ever mutate it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Gate for `stake`/`unstake`.
    pub staking_enabled: bool,

    /// Gate for `claim_reward`.
    pub claiming_enabled: bool,

    /// Raw reward units accrued per staked asset per second.
    ///
    /// Read at fold time: changing it never recomputes already-folded
    /// reward, and applies to all positions uniformly from their next fold.
    pub reward_rate_per_second: u128,
}

impl StakingConfig {
    /// A disabled config with the given rate — the usual starting point.
    pub fn with_rate(rate: u128) -> Self {
        Self {
            reward_rate_per_second: rate,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fully_disabled() {
        let config = StakingConfig::default();
        assert!(!config.staking_enabled);
        assert!(!config.claiming_enabled);
        assert_eq!(config.reward_rate_per_second, 0);
    }

    #[test]
    fn with_rate_keeps_gates_closed() {
        let config = StakingConfig::with_rate(7);
        assert!(!config.staking_enabled);
        assert!(!config.claiming_enabled);
        assert_eq!(config.reward_rate_per_second, 7);
    }
}
