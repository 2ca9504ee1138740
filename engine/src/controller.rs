//! The staking controller — public state machine over ledger and collaborators.

use crate::config::StakingConfig;
use crate::error::StakingError;
use crate::event::{EventBus, StakingEvent};
use crate::ledger::RewardLedger;
use crate::position::{RewardAccount, StakePosition};
use tracing::{debug, info};
use vaultstake_registry::{AssetRegistry, Clock, RewardIssuer};
use vaultstake_store::StakingStore;
use vaultstake_types::{Address, AssetId, RewardAmount};

const CONFIG_META_KEY: &[u8] = b"staking_config";

/// Orchestrates stake, unstake, reward folding, claims, and admin
/// configuration.
///
/// Exclusively owns the config and the reward ledger. Each operation
/// validates its preconditions before any mutation, completes all ledger
/// writes before its single outbound collaborator call, and compensates
/// those writes if the call fails — so no operation ever leaves a partial
/// effect.
pub struct StakingController<R, I, C> {
    admin: Address,
    /// The engine's own address in the asset registry: the `to` of every
    /// stake transfer and the `from` of every unstake transfer.
    custodian: Address,
    config: StakingConfig,
    ledger: RewardLedger,
    registry: R,
    issuer: I,
    clock: C,
    events: EventBus,
}

impl<R, I, C> StakingController<R, I, C>
where
    R: AssetRegistry,
    I: RewardIssuer,
    C: Clock,
{
    /// Create a controller with staking and claiming disabled.
    pub fn new(
        admin: Address,
        custodian: Address,
        reward_rate_per_second: u128,
        registry: R,
        issuer: I,
        clock: C,
    ) -> Self {
        Self {
            admin,
            custodian,
            config: StakingConfig::with_rate(reward_rate_per_second),
            ledger: RewardLedger::new(),
            registry,
            issuer,
            clock,
            events: EventBus::new(),
        }
    }

    fn require_admin(&self, caller: &Address) -> Result<(), StakingError> {
        if *caller != self.admin {
            return Err(StakingError::Unauthorized);
        }
        Ok(())
    }

    fn emit_config_changed(&self) {
        self.events.emit(&StakingEvent::ConfigChanged {
            staking_enabled: self.config.staking_enabled,
            claiming_enabled: self.config.claiming_enabled,
            reward_rate_per_second: self.config.reward_rate_per_second,
        });
    }

    /// Enable staking. Admin-only; calling again is a no-op success.
    pub fn init_staking(&mut self, caller: &Address) -> Result<(), StakingError> {
        self.require_admin(caller)?;
        if self.config.staking_enabled {
            return Ok(());
        }
        self.config.staking_enabled = true;
        info!("staking enabled");
        self.emit_config_changed();
        Ok(())
    }

    /// Open or close the claiming gate. Admin-only.
    pub fn set_tokens_claimable(
        &mut self,
        caller: &Address,
        enabled: bool,
    ) -> Result<(), StakingError> {
        self.require_admin(caller)?;
        self.config.claiming_enabled = enabled;
        info!(enabled, "claiming gate set");
        self.emit_config_changed();
        Ok(())
    }

    /// Change the reward rate. Admin-only. Applies at fold time: reward
    /// already folded keeps its old rate, every position accrues at the new
    /// rate from its next fold.
    pub fn set_reward_rate(&mut self, caller: &Address, rate: u128) -> Result<(), StakingError> {
        self.require_admin(caller)?;
        self.config.reward_rate_per_second = rate;
        info!(rate, "reward rate set");
        self.emit_config_changed();
        Ok(())
    }

    /// Stake an asset: record the position, then pull custody from the
    /// caller into the custodian address.
    ///
    /// The ledger write happens before the registry call; if the transfer
    /// fails the position is removed again before the error propagates.
    pub fn stake(&mut self, caller: &Address, asset: AssetId) -> Result<(), StakingError> {
        if !self.config.staking_enabled {
            return Err(StakingError::StakingDisabled);
        }
        if self.ledger.is_staked(asset) {
            return Err(StakingError::AlreadyStaked(asset));
        }
        let holder = self.registry.owner_of(asset)?;
        if holder != *caller {
            return Err(StakingError::Unauthorized);
        }

        let now = self.clock.now();
        self.ledger
            .record_stake(StakePosition::open(asset, caller.clone(), now));

        if let Err(e) = self.registry.transfer(caller, &self.custodian, asset) {
            self.ledger.record_unstake(asset);
            return Err(e.into());
        }

        debug!(%caller, %asset, "staked");
        self.events.emit(&StakingEvent::Staked {
            owner: caller.clone(),
            asset,
        });
        Ok(())
    }

    /// Unstake an asset: fold its pending reward, delete the position, then
    /// return custody to the owner.
    ///
    /// If the return transfer fails the position is restored. The fold
    /// persists either way — folding is publicly invocable at any time, so a
    /// persisted fold is not a partial effect.
    pub fn unstake(&mut self, caller: &Address, asset: AssetId) -> Result<(), StakingError> {
        if !self.config.staking_enabled {
            return Err(StakingError::StakingDisabled);
        }
        let position = self
            .ledger
            .position(asset)
            .ok_or(StakingError::NotStaked(asset))?;
        if position.owner != *caller {
            return Err(StakingError::Unauthorized);
        }

        self.fold_and_emit(caller)?;
        let Some(position) = self.ledger.record_unstake(asset) else {
            return Err(StakingError::NotStaked(asset));
        };

        if let Err(e) = self.registry.transfer(&self.custodian, caller, asset) {
            self.ledger.record_stake(position);
            return Err(e.into());
        }

        debug!(%caller, %asset, "unstaked");
        self.events.emit(&StakingEvent::Unstaked {
            owner: caller.clone(),
            asset,
        });
        Ok(())
    }

    /// Fold pending reward for every position owned by `target`.
    ///
    /// Callable by anyone; a no-op success (returning zero) when the address
    /// owns no staked assets. Pure accrual — no outbound calls.
    pub fn update_reward(&mut self, target: &Address) -> Result<RewardAmount, StakingError> {
        self.fold_and_emit(target)
    }

    /// Claim accrued reward: fold up to now, zero the balance, then mint.
    ///
    /// The reset happens before the mint call; if the mint fails the balance
    /// is restored before the error propagates. A zero balance is a no-op
    /// success, not an error.
    pub fn claim_reward(&mut self, target: &Address) -> Result<RewardAmount, StakingError> {
        if !self.config.claiming_enabled {
            return Err(StakingError::ClaimingDisabled);
        }

        self.fold_and_emit(target)?;
        let amount = self.ledger.credit_and_reset(target);
        if amount.is_zero() {
            return Ok(RewardAmount::ZERO);
        }

        if let Err(e) = self.issuer.mint(target, amount) {
            self.ledger.restore_accrued(target, amount);
            return Err(e.into());
        }

        debug!(%target, %amount, "reward claimed");
        self.events.emit(&StakingEvent::RewardClaimed {
            owner: target.clone(),
            amount,
        });
        Ok(amount)
    }

    fn fold_and_emit(&mut self, owner: &Address) -> Result<RewardAmount, StakingError> {
        let now = self.clock.now();
        let rate = self.config.reward_rate_per_second;
        let delta = self.ledger.fold_accrual(owner, now, rate)?;
        if !delta.is_zero() {
            debug!(%owner, %delta, "reward accrued");
            self.events.emit(&StakingEvent::RewardAccrued {
                owner: owner.clone(),
                amount: delta,
            });
        }
        Ok(delta)
    }

    // ── Read accessors ───────────────────────────────────────────────────

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn position(&self, asset: AssetId) -> Option<&StakePosition> {
        self.ledger.position(asset)
    }

    pub fn is_staked(&self, asset: AssetId) -> bool {
        self.ledger.is_staked(asset)
    }

    pub fn staked_assets(&self, owner: &Address) -> Vec<AssetId> {
        self.ledger.staked_assets(owner)
    }

    /// Accrued-but-unclaimed reward, not counting unfolded elapsed time.
    pub fn accrued_reward(&self, owner: &Address) -> RewardAmount {
        self.ledger.accrued(owner)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn issuer(&self) -> &I {
        &self.issuer
    }

    pub fn issuer_mut(&mut self) -> &mut I {
        &mut self.issuer
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Persist config, positions, and reward accounts to a staking store.
    ///
    /// Reconciles deletions: a position saved earlier but unstaked since must
    /// not survive in the store, or a reload would resurrect it.
    pub fn save_to_store(&self, store: &dyn StakingStore) -> Result<(), StakingError> {
        let config_bytes = bincode::serialize(&self.config)
            .map_err(|e| StakingError::Store(e.to_string()))?;
        store
            .put_meta(CONFIG_META_KEY, &config_bytes)
            .map_err(|e| StakingError::Store(e.to_string()))?;

        let saved = store
            .iter_positions()
            .map_err(|e| StakingError::Store(e.to_string()))?;
        for (asset, _) in saved {
            if !self.ledger.is_staked(asset) {
                store
                    .delete_position(asset)
                    .map_err(|e| StakingError::Store(e.to_string()))?;
            }
        }

        for position in self.ledger.iter_positions() {
            let bytes = bincode::serialize(position)
                .map_err(|e| StakingError::Store(e.to_string()))?;
            store
                .put_position(position.asset, &bytes)
                .map_err(|e| StakingError::Store(e.to_string()))?;
        }
        for (owner, account) in self.ledger.iter_accounts() {
            let bytes = bincode::serialize(account)
                .map_err(|e| StakingError::Store(e.to_string()))?;
            store
                .put_reward_account(owner, &bytes)
                .map_err(|e| StakingError::Store(e.to_string()))?;
        }
        Ok(())
    }

    /// Restore a controller from a staking store, re-wiring the given
    /// collaborators. A store with no saved config yields a disabled config.
    pub fn load_from_store(
        store: &dyn StakingStore,
        admin: Address,
        custodian: Address,
        registry: R,
        issuer: I,
        clock: C,
    ) -> Result<Self, StakingError> {
        let config = match store
            .get_meta(CONFIG_META_KEY)
            .map_err(|e| StakingError::Store(e.to_string()))?
        {
            Some(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| StakingError::Store(e.to_string()))?,
            None => StakingConfig::default(),
        };

        let mut ledger = RewardLedger::new();
        let entries = store
            .iter_positions()
            .map_err(|e| StakingError::Store(e.to_string()))?;
        for (_, bytes) in entries {
            let position: StakePosition = bincode::deserialize(&bytes)
                .map_err(|e| StakingError::Store(e.to_string()))?;
            ledger.record_stake(position);
        }
        let entries = store
            .iter_reward_accounts()
            .map_err(|e| StakingError::Store(e.to_string()))?;
        for (owner, bytes) in entries {
            let account: RewardAccount = bincode::deserialize(&bytes)
                .map_err(|e| StakingError::Store(e.to_string()))?;
            ledger.insert_account(owner, account);
        }

        Ok(Self {
            admin,
            custodian,
            config,
            ledger,
            registry,
            issuer,
            clock,
            events: EventBus::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use vaultstake_registry::{
        ManualClock, MemoryAssetRegistry, MemoryRewardIssuer, RegistryError,
    };
    use vaultstake_store::{MemoryStore, StoreError};
    use vaultstake_types::Timestamp;

    type TestController = StakingController<MemoryAssetRegistry, MemoryRewardIssuer, ManualClock>;

    fn admin() -> Address {
        Address::new("vlt_admin")
    }

    fn vault() -> Address {
        Address::new("vlt_vault")
    }

    fn test_address(n: u8) -> Address {
        Address::new(format!("vlt_{:0>60}", n))
    }

    fn controller_with_rate(rate: u128) -> TestController {
        StakingController::new(
            admin(),
            vault(),
            rate,
            MemoryAssetRegistry::new(),
            MemoryRewardIssuer::new(),
            ManualClock::new(0),
        )
    }

    /// Controller at t=0 with `asset 1` registered to alice and staking on.
    fn staked_setup(rate: u128) -> (TestController, Address) {
        let alice = test_address(1);
        let mut ctrl = controller_with_rate(rate);
        ctrl.registry_mut().register(alice.clone(), AssetId::new(1));
        ctrl.init_staking(&admin()).unwrap();
        ctrl.stake(&alice, AssetId::new(1)).unwrap();
        (ctrl, alice)
    }

    // ── Admin gates ──────────────────────────────────────────────────────

    #[test]
    fn init_staking_enables_and_is_idempotent() {
        let mut ctrl = controller_with_rate(1);
        assert!(!ctrl.config().staking_enabled);

        ctrl.init_staking(&admin()).unwrap();
        assert!(ctrl.config().staking_enabled);

        // Second call: no error, flag stays set.
        ctrl.init_staking(&admin()).unwrap();
        assert!(ctrl.config().staking_enabled);
    }

    #[test]
    fn non_admin_cannot_configure() {
        let mut ctrl = controller_with_rate(1);
        let mallory = test_address(9);

        assert!(matches!(
            ctrl.init_staking(&mallory),
            Err(StakingError::Unauthorized)
        ));
        assert!(matches!(
            ctrl.set_tokens_claimable(&mallory, true),
            Err(StakingError::Unauthorized)
        ));
        assert!(matches!(
            ctrl.set_reward_rate(&mallory, 99),
            Err(StakingError::Unauthorized)
        ));
        assert!(!ctrl.config().staking_enabled);
        assert!(!ctrl.config().claiming_enabled);
        assert_eq!(ctrl.config().reward_rate_per_second, 1);
    }

    // ── Stake ────────────────────────────────────────────────────────────

    #[test]
    fn stake_requires_staking_enabled() {
        let alice = test_address(1);
        let mut ctrl = controller_with_rate(1);
        ctrl.registry_mut().register(alice.clone(), AssetId::new(1));

        let result = ctrl.stake(&alice, AssetId::new(1));
        assert!(matches!(result, Err(StakingError::StakingDisabled)));
        assert!(!ctrl.is_staked(AssetId::new(1)));
    }

    #[test]
    fn stake_requires_ownership() {
        let alice = test_address(1);
        let bob = test_address(2);
        let mut ctrl = controller_with_rate(1);
        ctrl.registry_mut().register(alice.clone(), AssetId::new(1));
        ctrl.init_staking(&admin()).unwrap();

        let result = ctrl.stake(&bob, AssetId::new(1));
        assert!(matches!(result, Err(StakingError::Unauthorized)));
        assert!(!ctrl.is_staked(AssetId::new(1)));
    }

    #[test]
    fn stake_records_position_and_transfers_custody() {
        let (ctrl, alice) = staked_setup(1);

        let position = ctrl.position(AssetId::new(1)).unwrap();
        assert_eq!(position.owner, alice);
        assert_eq!(position.staked_at, Timestamp::new(0));
        assert_eq!(position.last_accrued_at, Timestamp::new(0));
        assert_eq!(ctrl.registry().owner_of(AssetId::new(1)).unwrap(), vault());
        assert_eq!(ctrl.staked_assets(&alice), vec![AssetId::new(1)]);
    }

    #[test]
    fn double_stake_rejected_with_single_transfer() {
        let (mut ctrl, alice) = staked_setup(1);

        let result = ctrl.stake(&alice, AssetId::new(1));
        assert!(matches!(result, Err(StakingError::AlreadyStaked(_))));
        assert_eq!(ctrl.registry().transfer_log().len(), 1);
    }

    // ── Unstake ──────────────────────────────────────────────────────────

    #[test]
    fn stake_then_immediate_unstake_accrues_nothing() {
        let (mut ctrl, alice) = staked_setup(10);

        ctrl.unstake(&alice, AssetId::new(1)).unwrap();
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::ZERO);
        assert_eq!(ctrl.registry().owner_of(AssetId::new(1)).unwrap(), alice);
        assert!(!ctrl.is_staked(AssetId::new(1)));
    }

    #[test]
    fn unstake_of_unstaked_asset_fails() {
        let alice = test_address(1);
        let mut ctrl = controller_with_rate(1);
        ctrl.init_staking(&admin()).unwrap();

        let result = ctrl.unstake(&alice, AssetId::new(5));
        assert!(matches!(result, Err(StakingError::NotStaked(_))));
    }

    #[test]
    fn unauthorized_unstake_leaves_position_untouched() {
        let (mut ctrl, alice) = staked_setup(1);
        let bob = test_address(2);

        let result = ctrl.unstake(&bob, AssetId::new(1));
        assert!(matches!(result, Err(StakingError::Unauthorized)));
        assert_eq!(ctrl.position(AssetId::new(1)).unwrap().owner, alice);
        assert_eq!(ctrl.registry().owner_of(AssetId::new(1)).unwrap(), vault());
    }

    #[test]
    fn unstake_folds_pending_reward_and_returns_custody() {
        let (mut ctrl, alice) = staked_setup(10);

        ctrl.clock().advance(100);
        ctrl.unstake(&alice, AssetId::new(1)).unwrap();

        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::new(1000));
        assert_eq!(ctrl.registry().owner_of(AssetId::new(1)).unwrap(), alice);
    }

    #[test]
    fn restake_after_unstake_works() {
        let (mut ctrl, alice) = staked_setup(1);

        ctrl.clock().advance(10);
        ctrl.unstake(&alice, AssetId::new(1)).unwrap();
        ctrl.stake(&alice, AssetId::new(1)).unwrap();

        let position = ctrl.position(AssetId::new(1)).unwrap();
        assert_eq!(position.staked_at, Timestamp::new(10));
        assert_eq!(ctrl.registry().owner_of(AssetId::new(1)).unwrap(), vault());
    }

    // ── Accrual ──────────────────────────────────────────────────────────

    #[test]
    fn update_reward_accrues_elapsed_times_rate() {
        let (mut ctrl, alice) = staked_setup(10);

        ctrl.clock().advance(100);
        let delta = ctrl.update_reward(&alice).unwrap();
        assert_eq!(delta, RewardAmount::new(1000));
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::new(1000));
    }

    #[test]
    fn update_reward_for_stranger_is_noop() {
        let (mut ctrl, _) = staked_setup(10);
        let stranger = test_address(7);

        ctrl.clock().advance(100);
        let delta = ctrl.update_reward(&stranger).unwrap();
        assert_eq!(delta, RewardAmount::ZERO);
    }

    #[test]
    fn update_reward_twice_same_instant_adds_nothing() {
        let (mut ctrl, alice) = staked_setup(10);

        ctrl.clock().advance(100);
        ctrl.update_reward(&alice).unwrap();
        let second = ctrl.update_reward(&alice).unwrap();
        assert_eq!(second, RewardAmount::ZERO);
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::new(1000));
    }

    #[test]
    fn rate_change_applies_forward_from_fold() {
        let (mut ctrl, alice) = staked_setup(1);

        // 100s at rate 1.
        ctrl.clock().advance(100);
        ctrl.update_reward(&alice).unwrap();
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::new(100));

        // 50s at rate 2 — folded reward untouched.
        ctrl.set_reward_rate(&admin(), 2).unwrap();
        ctrl.clock().advance(50);
        ctrl.update_reward(&alice).unwrap();
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::new(200));
    }

    // ── Claim ────────────────────────────────────────────────────────────

    #[test]
    fn claim_requires_claiming_enabled() {
        let (mut ctrl, alice) = staked_setup(1);

        ctrl.clock().advance(100);
        let result = ctrl.claim_reward(&alice);
        assert!(matches!(result, Err(StakingError::ClaimingDisabled)));
    }

    #[test]
    fn end_to_end_stake_accrue_claim() {
        let (mut ctrl, alice) = staked_setup(1);

        ctrl.clock().set(200);
        let delta = ctrl.update_reward(&alice).unwrap();
        assert_eq!(delta, RewardAmount::new(200));

        ctrl.set_tokens_claimable(&admin(), true).unwrap();
        let claimed = ctrl.claim_reward(&alice).unwrap();
        assert_eq!(claimed, RewardAmount::new(200));
        assert_eq!(ctrl.issuer().balance_of(&alice), RewardAmount::new(200));
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::ZERO);
    }

    #[test]
    fn double_claim_second_is_noop() {
        let (mut ctrl, alice) = staked_setup(1);
        ctrl.set_tokens_claimable(&admin(), true).unwrap();

        ctrl.clock().advance(100);
        assert_eq!(ctrl.claim_reward(&alice).unwrap(), RewardAmount::new(100));

        // No elapsed time: nothing to fold, nothing minted, no error.
        assert_eq!(ctrl.claim_reward(&alice).unwrap(), RewardAmount::ZERO);
        assert_eq!(ctrl.issuer().balance_of(&alice), RewardAmount::new(100));
    }

    #[test]
    fn claim_folds_up_to_now_without_explicit_update() {
        let (mut ctrl, alice) = staked_setup(3);
        ctrl.set_tokens_claimable(&admin(), true).unwrap();

        ctrl.clock().advance(50);
        let claimed = ctrl.claim_reward(&alice).unwrap();
        assert_eq!(claimed, RewardAmount::new(150));
    }

    // ── External failure rollback ────────────────────────────────────────

    #[test]
    fn mint_failure_restores_accrued_balance() {
        let (mut ctrl, alice) = staked_setup(1);
        ctrl.set_tokens_claimable(&admin(), true).unwrap();

        ctrl.clock().advance(100);
        ctrl.issuer_mut().set_paused(true);
        let result = ctrl.claim_reward(&alice);
        assert!(matches!(result, Err(StakingError::Issuer(_))));
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::new(100));

        // Unpause: the restored balance claims cleanly.
        ctrl.issuer_mut().set_paused(false);
        assert_eq!(ctrl.claim_reward(&alice).unwrap(), RewardAmount::new(100));
    }

    /// Registry double that fails every transfer after the first `allow`.
    struct FlakyRegistry {
        inner: MemoryAssetRegistry,
        allow: usize,
    }

    impl AssetRegistry for FlakyRegistry {
        fn owner_of(&self, asset: AssetId) -> Result<Address, RegistryError> {
            self.inner.owner_of(asset)
        }

        fn transfer(
            &mut self,
            from: &Address,
            to: &Address,
            asset: AssetId,
        ) -> Result<(), RegistryError> {
            if self.allow == 0 {
                return Err(RegistryError::UnknownAsset(asset));
            }
            self.allow -= 1;
            self.inner.transfer(from, to, asset)
        }
    }

    #[test]
    fn stake_transfer_failure_rolls_back_position() {
        let alice = test_address(1);
        let mut inner = MemoryAssetRegistry::new();
        inner.register(alice.clone(), AssetId::new(1));
        let registry = FlakyRegistry { inner, allow: 0 };
        let mut ctrl = StakingController::new(
            admin(),
            vault(),
            1,
            registry,
            MemoryRewardIssuer::new(),
            ManualClock::new(0),
        );
        ctrl.init_staking(&admin()).unwrap();

        let result = ctrl.stake(&alice, AssetId::new(1));
        assert!(matches!(result, Err(StakingError::Registry(_))));
        assert!(!ctrl.is_staked(AssetId::new(1)));
        assert!(ctrl.staked_assets(&alice).is_empty());
    }

    #[test]
    fn unstake_transfer_failure_restores_position() {
        let alice = test_address(1);
        let mut inner = MemoryAssetRegistry::new();
        inner.register(alice.clone(), AssetId::new(1));
        let registry = FlakyRegistry { inner, allow: 1 };
        let mut ctrl = StakingController::new(
            admin(),
            vault(),
            1,
            registry,
            MemoryRewardIssuer::new(),
            ManualClock::new(0),
        );
        ctrl.init_staking(&admin()).unwrap();
        ctrl.stake(&alice, AssetId::new(1)).unwrap();

        ctrl.clock().advance(10);
        let result = ctrl.unstake(&alice, AssetId::new(1));
        assert!(matches!(result, Err(StakingError::Registry(_))));
        // Position restored, custody still with the engine, fold persisted.
        assert!(ctrl.is_staked(AssetId::new(1)));
        assert_eq!(ctrl.registry().owner_of(AssetId::new(1)).unwrap(), vault());
        assert_eq!(ctrl.accrued_reward(&alice), RewardAmount::new(10));
    }

    // ── Events ───────────────────────────────────────────────────────────

    #[test]
    fn operations_emit_domain_events() {
        let (mut ctrl, alice) = staked_setup(1);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctrl.events_mut().subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));

        ctrl.clock().advance(100);
        ctrl.update_reward(&alice).unwrap();
        ctrl.set_tokens_claimable(&admin(), true).unwrap();
        ctrl.claim_reward(&alice).unwrap();
        ctrl.unstake(&alice, AssetId::new(1)).unwrap();

        let events = seen.lock().unwrap();
        assert!(events.contains(&StakingEvent::RewardAccrued {
            owner: alice.clone(),
            amount: RewardAmount::new(100),
        }));
        assert!(events.contains(&StakingEvent::ConfigChanged {
            staking_enabled: true,
            claiming_enabled: true,
            reward_rate_per_second: 1,
        }));
        assert!(events.contains(&StakingEvent::RewardClaimed {
            owner: alice.clone(),
            amount: RewardAmount::new(100),
        }));
        assert!(events.contains(&StakingEvent::Unstaked {
            owner: alice.clone(),
            asset: AssetId::new(1),
        }));
    }

    // ── Persistence ──────────────────────────────────────────────────────

    #[test]
    fn save_load_roundtrip_preserves_state() {
        let (mut ctrl, alice) = staked_setup(10);
        ctrl.set_tokens_claimable(&admin(), true).unwrap();
        ctrl.clock().advance(100);
        ctrl.update_reward(&alice).unwrap();

        let store = MemoryStore::new();
        ctrl.save_to_store(&store).unwrap();

        let restored: TestController = StakingController::load_from_store(
            &store,
            admin(),
            vault(),
            MemoryAssetRegistry::new(),
            MemoryRewardIssuer::new(),
            ManualClock::new(100),
        )
        .unwrap();

        assert!(restored.config().staking_enabled);
        assert!(restored.config().claiming_enabled);
        assert_eq!(restored.config().reward_rate_per_second, 10);
        assert_eq!(restored.accrued_reward(&alice), RewardAmount::new(1000));
        let position = restored.position(AssetId::new(1)).unwrap();
        assert_eq!(position.owner, alice);
        assert_eq!(position.last_accrued_at, Timestamp::new(100));
        assert_eq!(restored.staked_assets(&alice), vec![AssetId::new(1)]);
    }

    #[test]
    fn save_after_unstake_removes_stale_position() {
        let alice = test_address(1);
        let mut ctrl = controller_with_rate(1);
        ctrl.registry_mut().register(alice.clone(), AssetId::new(1));
        ctrl.registry_mut().register(alice.clone(), AssetId::new(2));
        ctrl.init_staking(&admin()).unwrap();
        ctrl.stake(&alice, AssetId::new(1)).unwrap();
        ctrl.stake(&alice, AssetId::new(2)).unwrap();

        let store = MemoryStore::new();
        ctrl.save_to_store(&store).unwrap();

        // Close one position, then save into the same store.
        ctrl.unstake(&alice, AssetId::new(1)).unwrap();
        ctrl.save_to_store(&store).unwrap();

        let restored: TestController = StakingController::load_from_store(
            &store,
            admin(),
            vault(),
            MemoryAssetRegistry::new(),
            MemoryRewardIssuer::new(),
            ManualClock::new(0),
        )
        .unwrap();

        assert!(!restored.is_staked(AssetId::new(1)));
        assert!(restored.is_staked(AssetId::new(2)));
        assert_eq!(restored.staked_assets(&alice), vec![AssetId::new(2)]);
    }

    /// Store double whose meta reads always fail.
    struct BrokenMetaStore {
        inner: MemoryStore,
    }

    impl StakingStore for BrokenMetaStore {
        fn get_position(&self, asset: AssetId) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.get_position(asset)
        }

        fn put_position(&self, asset: AssetId, bytes: &[u8]) -> Result<(), StoreError> {
            self.inner.put_position(asset, bytes)
        }

        fn delete_position(&self, asset: AssetId) -> Result<(), StoreError> {
            self.inner.delete_position(asset)
        }

        fn iter_positions(&self) -> Result<Vec<(AssetId, Vec<u8>)>, StoreError> {
            self.inner.iter_positions()
        }

        fn get_reward_account(&self, owner: &Address) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.get_reward_account(owner)
        }

        fn put_reward_account(&self, owner: &Address, bytes: &[u8]) -> Result<(), StoreError> {
            self.inner.put_reward_account(owner, bytes)
        }

        fn iter_reward_accounts(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError> {
            self.inner.iter_reward_accounts()
        }

        fn get_meta(&self, _key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Backend("meta read failed".into()))
        }

        fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
            self.inner.put_meta(key, value)
        }
    }

    #[test]
    fn load_propagates_meta_read_failure() {
        let store = BrokenMetaStore {
            inner: MemoryStore::new(),
        };
        let result: Result<TestController, _> = StakingController::load_from_store(
            &store,
            admin(),
            vault(),
            MemoryAssetRegistry::new(),
            MemoryRewardIssuer::new(),
            ManualClock::new(0),
        );
        assert!(matches!(result, Err(StakingError::Store(_))));
    }

    #[test]
    fn load_from_empty_store_yields_disabled_engine() {
        let store = MemoryStore::new();
        let ctrl: TestController = StakingController::load_from_store(
            &store,
            admin(),
            vault(),
            MemoryAssetRegistry::new(),
            MemoryRewardIssuer::new(),
            ManualClock::new(0),
        )
        .unwrap();

        assert!(!ctrl.config().staking_enabled);
        assert_eq!(ctrl.config().reward_rate_per_second, 0);
    }
}
