//! Domain events emitted by the controller for subscribers.

use vaultstake_types::{Address, AssetId, RewardAmount};

/// Events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StakingEvent {
    /// An asset entered custody.
    Staked { owner: Address, asset: AssetId },
    /// An asset left custody and returned to its owner.
    Unstaked { owner: Address, asset: AssetId },
    /// Pending reward was folded into an owner's accrued balance.
    RewardAccrued { owner: Address, amount: RewardAmount },
    /// Accrued reward was minted to an owner.
    RewardClaimed { owner: Address, amount: RewardAmount },
    /// An admin operation changed the configuration.
    ConfigChanged {
        staking_enabled: bool,
        claiming_enabled: bool,
        reward_rate_per_second: u128,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast to
/// avoid stalling the operation that emitted the event.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&StakingEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&StakingEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &StakingEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
