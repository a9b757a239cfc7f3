#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, Env,
};

// Storage TTL constants for active data
const INSTANCE_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_BUMP_AMOUNT: u32 = 518400; // ~30 days

// Storage TTL constants for holder records
const HOLDER_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const HOLDER_BUMP_AMOUNT: u32 = 518400; // ~30 days

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner(u32),
    Balance(Address),
}

/// Events emitted by the token
#[contracttype]
#[derive(Clone)]
pub enum VoterTokenEvent {
    Minted,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    Unauthorized = 1,
    NotSupported = 2,
    AlreadyInitialized = 3,
    NotInitialized = 4,
}

/// Non-transferable membership token. Holding one makes an address an
/// eligible voter.
#[contract]
pub struct VoterToken;

#[contractimpl]
impl VoterToken {
    pub fn init(env: Env, admin: Address) -> Result<(), Error> {
        admin.require_auth();

        if env.storage().instance().has(&symbol_short!("ADMIN")) {
            return Err(Error::AlreadyInitialized);
        }

        Self::extend_instance_ttl(&env);
        env.storage().instance().set(&symbol_short!("ADMIN"), &admin);
        env.storage()
            .instance()
            .set(&symbol_short!("NEXT_ID"), &0u32);

        Ok(())
    }

    /// Mint the next token to `to`.
    ///
    /// # Returns
    /// The new token id, starting at 1
    ///
    /// # Errors
    /// * `Unauthorized` - If caller is not the admin
    pub fn safe_mint(env: Env, caller: Address, to: Address) -> Result<u32, Error> {
        caller.require_auth();

        let admin: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("ADMIN"))
            .ok_or(Error::NotInitialized)?;
        if caller != admin {
            return Err(Error::Unauthorized);
        }

        Self::extend_instance_ttl(&env);

        let token_id = env
            .storage()
            .instance()
            .get(&symbol_short!("NEXT_ID"))
            .unwrap_or(0u32)
            + 1;

        let owner_key = DataKey::Owner(token_id);
        let balance_key = DataKey::Balance(to.clone());
        let balance: u32 = env.storage().persistent().get(&balance_key).unwrap_or(0);

        env.storage().persistent().set(&owner_key, &to);
        env.storage().persistent().set(&balance_key, &(balance + 1));
        Self::extend_holder_ttl(&env, &owner_key);
        Self::extend_holder_ttl(&env, &balance_key);
        env.storage()
            .instance()
            .set(&symbol_short!("NEXT_ID"), &token_id);

        env.events().publish(
            (symbol_short!("voter"), VoterTokenEvent::Minted),
            (token_id, to),
        );

        Ok(token_id)
    }

    pub fn balance_of(env: Env, owner: Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(owner))
            .unwrap_or(0)
    }

    pub fn owner_of(env: Env, token_id: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Owner(token_id))
    }

    pub fn total_supply(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&symbol_short!("NEXT_ID"))
            .unwrap_or(0)
    }

    // Voting rights are bound to the holder; every transfer path is closed.

    pub fn transfer_from(
        _env: Env,
        _from: Address,
        _to: Address,
        _token_id: u32,
    ) -> Result<(), Error> {
        Err(Error::NotSupported)
    }

    /// `data` is accepted for interface parity with receiver-checked
    /// transfers and ignored.
    pub fn safe_transfer_from(
        _env: Env,
        _from: Address,
        _to: Address,
        _token_id: u32,
        _data: Option<Bytes>,
    ) -> Result<(), Error> {
        Err(Error::NotSupported)
    }

    pub fn approve(_env: Env, _operator: Address, _token_id: u32) -> Result<(), Error> {
        Err(Error::NotSupported)
    }

    pub fn set_approval_for_all(
        _env: Env,
        _operator: Address,
        _approved: bool,
    ) -> Result<(), Error> {
        Err(Error::NotSupported)
    }

    fn extend_holder_ttl(env: &Env, key: &DataKey) {
        env.storage()
            .persistent()
            .extend_ttl(key, HOLDER_LIFETIME_THRESHOLD, HOLDER_BUMP_AMOUNT);
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }
}
