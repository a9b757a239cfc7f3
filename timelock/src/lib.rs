#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, token::TokenClient,
    Address, Bytes, BytesN, Env, String, Vec,
};

mod callable;
mod identity;
mod owners;
mod window;

pub use callable::{Callable, CallableClient};
pub use owners::MIN_OWNERS;
pub use window::{GRACE_PERIOD, MAXIMUM_DELAY};

// Storage TTL constants for configuration
const INSTANCE_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_BUMP_AMOUNT: u32 = 518400; // ~30 days

// Storage TTL constants for queued transactions. The bump outlives
// MAXIMUM_DELAY + GRACE_PERIOD so a live record never expires before its window closes.
const QUEUE_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const QUEUE_BUMP_AMOUNT: u32 = 518400; // ~30 days

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Queued(BytesN<32>),
}

/// A proposed call waiting for confirmations and its execution window.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueuedTransaction {
    pub target: Address,
    pub signature: String,
    pub payload: Bytes,
    pub value: i128,
    pub timestamp: u64,
    pub proposer: Address,
    pub queued_at: u64,
    pub confirmations: Vec<Address>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimelockConfig {
    pub owners: Vec<Address>,
    pub threshold: u32,
    pub max_delay: u64,
    pub grace_period: u64,
}

/// Events emitted by the contract for external observers
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimelockEvent {
    Queued,
    Confirmed,
    ConfirmationCancelled,
    Discarded,
    Executed,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    Unauthorized = 1,
    InvalidTimestamp = 2,
    AlreadyQueued = 3,
    NotQueued = 4,
    AlreadyConfirmed = 5,
    NotConfirmed = 6,
    TooEarly = 7,
    Expired = 8,
    NotEnoughConfirmations = 9,
    CallFailed = 10,
    InvalidOwnerSet = 11,
    InvalidThreshold = 12,
    InvalidAmount = 13,
    TransferFailed = 14,
    AlreadyInitialized = 15,
    NotInitialized = 16,
}

#[contract]
pub struct Timelock;

#[contractimpl]
impl Timelock {
    /// Create the committee. Every listed owner must authorize the call, so
    /// nobody can seat a committee on a fresh instance without its members.
    ///
    /// # Arguments
    /// * `owners` - Ordered committee members, at least `MIN_OWNERS`, distinct and non-null
    /// * `threshold` - Confirmations required to execute; `None` means every owner
    /// * `funds_asset` - Token contract used to forward funds on `execute`
    ///
    /// # Errors
    /// * `AlreadyInitialized` - If the committee was already created
    /// * `InvalidOwnerSet` - If the owner list is too short, has the null address or repeats
    /// * `InvalidThreshold` - If `threshold` is zero or larger than the committee
    pub fn init(
        env: Env,
        owners: Vec<Address>,
        threshold: Option<u32>,
        funds_asset: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&symbol_short!("OWNERS")) {
            return Err(Error::AlreadyInitialized);
        }

        owners::validate(&env, &owners)?;

        let threshold = threshold.unwrap_or(owners.len());
        if threshold == 0 || threshold > owners.len() {
            return Err(Error::InvalidThreshold);
        }

        for owner in owners.iter() {
            owner.require_auth();
        }

        Self::extend_instance_ttl(&env);
        env.storage()
            .instance()
            .set(&symbol_short!("OWNERS"), &owners);
        env.storage()
            .instance()
            .set(&symbol_short!("THRESHOLD"), &threshold);
        env.storage()
            .instance()
            .set(&symbol_short!("ASSET"), &funds_asset);

        Ok(())
    }

    /// Queue a call for later execution.
    ///
    /// # Returns
    /// The transaction id, also published in the `Queued` event
    ///
    /// # Errors
    /// * `Unauthorized` - If caller is not an owner
    /// * `InvalidTimestamp` - Unless `now < timestamp <= now + MAXIMUM_DELAY`
    /// * `AlreadyQueued` - If an identical proposal is still live
    pub fn add_to_queue(
        env: Env,
        caller: Address,
        target: Address,
        signature: String,
        payload: Bytes,
        value: i128,
        timestamp: u64,
    ) -> Result<BytesN<32>, Error> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let now = env.ledger().timestamp();
        window::check_proposal(now, timestamp)?;

        let tx_id = identity::derive_tx_id(&env, &target, &signature, &payload, value, timestamp);
        let key = DataKey::Queued(tx_id.clone());
        if env.storage().persistent().has(&key) {
            return Err(Error::AlreadyQueued);
        }

        let record = QueuedTransaction {
            target,
            signature,
            payload,
            value,
            timestamp,
            proposer: caller,
            queued_at: now,
            confirmations: Vec::new(&env),
        };
        Self::save_queued(&env, &key, &record);

        env.events().publish(
            (symbol_short!("timelock"), TimelockEvent::Queued),
            tx_id.clone(),
        );

        Ok(tx_id)
    }

    /// Record the caller's approval of a queued transaction.
    ///
    /// # Errors
    /// * `Unauthorized` - If caller is not an owner
    /// * `NotQueued` - If no live record has this id
    /// * `AlreadyConfirmed` - If the caller already confirmed
    pub fn confirm(env: Env, caller: Address, tx_id: BytesN<32>) -> Result<(), Error> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let (key, mut record) = Self::load_queued(&env, &tx_id)?;
        if Self::confirmation_index(&record, &caller).is_some() {
            return Err(Error::AlreadyConfirmed);
        }

        record.confirmations.push_back(caller.clone());
        Self::save_queued(&env, &key, &record);

        env.events().publish(
            (symbol_short!("timelock"), TimelockEvent::Confirmed),
            (tx_id, caller),
        );

        Ok(())
    }

    /// Withdraw the caller's approval.
    ///
    /// # Errors
    /// * `Unauthorized` - If caller is not an owner
    /// * `NotQueued` - If no live record has this id
    /// * `NotConfirmed` - If the caller had not confirmed
    pub fn cancel_confirmation(env: Env, caller: Address, tx_id: BytesN<32>) -> Result<(), Error> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let (key, mut record) = Self::load_queued(&env, &tx_id)?;
        let index = Self::confirmation_index(&record, &caller).ok_or(Error::NotConfirmed)?;

        record.confirmations.remove(index);
        Self::save_queued(&env, &key, &record);

        env.events().publish(
            (symbol_short!("timelock"), TimelockEvent::ConfirmationCancelled),
            (tx_id, caller),
        );

        Ok(())
    }

    /// Drop a queued transaction and all of its confirmations.
    ///
    /// # Errors
    /// * `Unauthorized` - If caller is not an owner
    /// * `NotQueued` - If no live record has this id
    pub fn discard(env: Env, caller: Address, tx_id: BytesN<32>) -> Result<(), Error> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let key = DataKey::Queued(tx_id.clone());
        if !env.storage().persistent().has(&key) {
            return Err(Error::NotQueued);
        }

        env.storage().persistent().remove(&key);
        Self::extend_instance_ttl(&env);

        env.events().publish(
            (symbol_short!("timelock"), TimelockEvent::Discarded),
            tx_id,
        );

        Ok(())
    }

    /// Run a confirmed transaction inside its execution window.
    ///
    /// Anyone may execute. The five call fields must match the queued
    /// proposal exactly; they are how the transaction is selected. When
    /// `forwarded` is positive, that amount of the funds asset moves from
    /// `caller` to `target` before the call. On success the record is
    /// consumed and cannot be replayed.
    ///
    /// # Returns
    /// The target's return data
    ///
    /// # Errors
    /// * `NotQueued` - If no live record matches the fields
    /// * `TooEarly` - If `now < timestamp`
    /// * `Expired` - If `now > timestamp + GRACE_PERIOD`
    /// * `NotEnoughConfirmations` - If the threshold is not met
    /// * `InvalidAmount` - If `forwarded` is negative
    /// * `TransferFailed` - If the funds could not be moved
    /// * `CallFailed` - If the target call failed; the record stays queued
    pub fn execute(
        env: Env,
        caller: Address,
        target: Address,
        signature: String,
        payload: Bytes,
        value: i128,
        timestamp: u64,
        forwarded: i128,
    ) -> Result<Bytes, Error> {
        caller.require_auth();
        let threshold = Self::load_threshold(&env)?;

        let tx_id = identity::derive_tx_id(&env, &target, &signature, &payload, value, timestamp);
        let (key, record) = Self::load_queued(&env, &tx_id)?;

        window::check_execution(env.ledger().timestamp(), record.timestamp)?;
        if !window::threshold_met(record.confirmations.len(), threshold) {
            return Err(Error::NotEnoughConfirmations);
        }
        if forwarded < 0 {
            return Err(Error::InvalidAmount);
        }

        // Consumed up front; a failed dispatch rolls this back with the rest of the invocation.
        env.storage().persistent().remove(&key);
        Self::extend_instance_ttl(&env);

        if forwarded > 0 {
            Self::forward_funds(&env, &caller, &target, forwarded)?;
        }

        let return_data = callable::dispatch(&env, &target, &signature, &payload, value)?;

        env.events().publish(
            (symbol_short!("timelock"), TimelockEvent::Executed),
            (tx_id, return_data.clone()),
        );

        Ok(return_data)
    }

    pub fn is_owner(env: Env, principal: Address) -> bool {
        match Self::load_owners(&env) {
            Ok(owners) => owners::contains(&owners, &principal),
            Err(_) => false,
        }
    }

    pub fn get_owners(env: Env) -> Result<Vec<Address>, Error> {
        Self::load_owners(&env)
    }

    pub fn get_config(env: Env) -> Result<TimelockConfig, Error> {
        Ok(TimelockConfig {
            owners: Self::load_owners(&env)?,
            threshold: Self::load_threshold(&env)?,
            max_delay: MAXIMUM_DELAY,
            grace_period: GRACE_PERIOD,
        })
    }

    pub fn get_transaction(env: Env, tx_id: BytesN<32>) -> Option<QueuedTransaction> {
        env.storage().persistent().get(&DataKey::Queued(tx_id))
    }

    pub fn get_confirmation_count(env: Env, tx_id: BytesN<32>) -> u32 {
        Self::get_transaction(env, tx_id)
            .map(|record| record.confirmations.len())
            .unwrap_or(0)
    }

    pub fn is_confirmed(env: Env, tx_id: BytesN<32>, owner: Address) -> bool {
        match Self::get_transaction(env, tx_id) {
            Some(record) => Self::confirmation_index(&record, &owner).is_some(),
            None => false,
        }
    }

    /// Whether `execute` would pass its confirmation and time checks right now.
    pub fn is_ready(env: Env, tx_id: BytesN<32>) -> bool {
        let threshold = match Self::load_threshold(&env) {
            Ok(threshold) => threshold,
            Err(_) => return false,
        };
        let now = env.ledger().timestamp();
        match Self::get_transaction(env, tx_id) {
            Some(record) => {
                window::threshold_met(record.confirmations.len(), threshold)
                    && window::check_execution(now, record.timestamp).is_ok()
            }
            None => false,
        }
    }

    /// Id a proposal with these fields would be queued under.
    pub fn compute_tx_id(
        env: Env,
        target: Address,
        signature: String,
        payload: Bytes,
        value: i128,
        timestamp: u64,
    ) -> BytesN<32> {
        identity::derive_tx_id(&env, &target, &signature, &payload, value, timestamp)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn require_owner(env: &Env, caller: &Address) -> Result<(), Error> {
        let owners = Self::load_owners(env)?;
        if !owners::contains(&owners, caller) {
            log!(env, "timelock: caller is not an owner", caller.clone());
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    fn load_owners(env: &Env) -> Result<Vec<Address>, Error> {
        env.storage()
            .instance()
            .get(&symbol_short!("OWNERS"))
            .ok_or(Error::NotInitialized)
    }

    fn load_threshold(env: &Env) -> Result<u32, Error> {
        env.storage()
            .instance()
            .get(&symbol_short!("THRESHOLD"))
            .ok_or(Error::NotInitialized)
    }

    fn load_queued(env: &Env, tx_id: &BytesN<32>) -> Result<(DataKey, QueuedTransaction), Error> {
        let key = DataKey::Queued(tx_id.clone());
        let record = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(Error::NotQueued)?;
        Ok((key, record))
    }

    fn save_queued(env: &Env, key: &DataKey, record: &QueuedTransaction) {
        env.storage().persistent().set(key, record);
        env.storage()
            .persistent()
            .extend_ttl(key, QUEUE_LIFETIME_THRESHOLD, QUEUE_BUMP_AMOUNT);
        Self::extend_instance_ttl(env);
    }

    fn confirmation_index(record: &QueuedTransaction, owner: &Address) -> Option<u32> {
        record
            .confirmations
            .iter()
            .position(|confirmed| confirmed == *owner)
            .map(|index| index as u32)
    }

    fn forward_funds(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
        let asset: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("ASSET"))
            .ok_or(Error::NotInitialized)?;

        match TokenClient::new(env, &asset).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(env, "timelock: funds transfer failed", from.clone(), amount);
                Err(Error::TransferFailed)
            }
        }
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }
}
