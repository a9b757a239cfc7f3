#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, xdr::ToXdr, Address,
    BytesN, Env,
};

// Storage TTL constants for active data
const INSTANCE_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_BUMP_AMOUNT: u32 = 518400; // ~30 days

// Storage TTL constants for commitments and reveals
const BALLOT_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const BALLOT_BUMP_AMOUNT: u32 = 518400; // ~30 days

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Commit(Address),
    Revealed(Address),
    Tally(u32),
}

/// Events emitted by the contract for audit trail
#[contracttype]
#[derive(Clone)]
pub enum CommitRevealEvent {
    Committed,
    VotingStopped,
    Revealed,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    Unauthorized = 1,
    VotingClosed = 2,
    VotingOpen = 3,
    AlreadyCommitted = 4,
    NoCommit = 5,
    AlreadyRevealed = 6,
    CommitMismatch = 7,
    AlreadyInitialized = 8,
    NotInitialized = 9,
}

/// Two-phase ballot: voters commit `keccak256(choice, secret, voter)` while
/// voting is open and reveal the preimage after the owner closes it.
#[contract]
pub struct CommitReveal;

#[contractimpl]
impl CommitReveal {
    pub fn init(env: Env, owner: Address) -> Result<(), Error> {
        owner.require_auth();

        if env.storage().instance().has(&symbol_short!("OWNER")) {
            return Err(Error::AlreadyInitialized);
        }

        Self::extend_instance_ttl(&env);
        env.storage().instance().set(&symbol_short!("OWNER"), &owner);
        env.storage().instance().set(&symbol_short!("OPEN"), &true);

        Ok(())
    }

    /// Store the caller's sealed vote.
    ///
    /// # Errors
    /// * `VotingClosed` - If the owner already stopped voting
    /// * `AlreadyCommitted` - If the voter committed before
    pub fn commit_vote(env: Env, voter: Address, commitment: BytesN<32>) -> Result<(), Error> {
        voter.require_auth();

        if !Self::load_open(&env)? {
            return Err(Error::VotingClosed);
        }

        let key = DataKey::Commit(voter.clone());
        if env.storage().persistent().has(&key) {
            return Err(Error::AlreadyCommitted);
        }

        env.storage().persistent().set(&key, &commitment);
        Self::extend_ballot_ttl(&env, &key);
        Self::extend_instance_ttl(&env);

        env.events().publish(
            (symbol_short!("commit"), CommitRevealEvent::Committed),
            (voter, commitment),
        );

        Ok(())
    }

    /// Close the commit phase and open reveals. Owner only, one-shot.
    ///
    /// # Errors
    /// * `Unauthorized` - If caller is not the owner
    /// * `VotingClosed` - If voting was already stopped
    pub fn stop_voting(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();

        let owner: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("OWNER"))
            .ok_or(Error::NotInitialized)?;
        if caller != owner {
            return Err(Error::Unauthorized);
        }
        if !Self::load_open(&env)? {
            return Err(Error::VotingClosed);
        }

        Self::extend_instance_ttl(&env);
        env.storage().instance().set(&symbol_short!("OPEN"), &false);

        env.events().publish(
            (symbol_short!("commit"), CommitRevealEvent::VotingStopped),
            caller,
        );

        Ok(())
    }

    /// Open the caller's sealed vote and count it.
    ///
    /// # Errors
    /// * `VotingOpen` - If voting has not been stopped yet
    /// * `NoCommit` - If the voter never committed
    /// * `AlreadyRevealed` - If the voter already revealed
    /// * `CommitMismatch` - If `(choice, secret, voter)` does not hash to the commitment
    pub fn reveal_vote(
        env: Env,
        voter: Address,
        choice: u32,
        secret: BytesN<32>,
    ) -> Result<(), Error> {
        voter.require_auth();

        if Self::load_open(&env)? {
            return Err(Error::VotingOpen);
        }

        let commitment: BytesN<32> = env
            .storage()
            .persistent()
            .get(&DataKey::Commit(voter.clone()))
            .ok_or(Error::NoCommit)?;

        let revealed_key = DataKey::Revealed(voter.clone());
        if env.storage().persistent().has(&revealed_key) {
            return Err(Error::AlreadyRevealed);
        }

        if Self::hash_vote(&env, choice, &secret, &voter) != commitment {
            log!(&env, "commit_reveal: reveal does not match commitment", voter);
            return Err(Error::CommitMismatch);
        }

        let tally_key = DataKey::Tally(choice);
        let count: u32 = env.storage().persistent().get(&tally_key).unwrap_or(0);

        env.storage().persistent().set(&revealed_key, &choice);
        env.storage().persistent().set(&tally_key, &(count + 1));
        Self::extend_ballot_ttl(&env, &revealed_key);
        Self::extend_ballot_ttl(&env, &tally_key);
        Self::extend_instance_ttl(&env);

        env.events().publish(
            (symbol_short!("commit"), CommitRevealEvent::Revealed),
            commitment,
        );

        Ok(())
    }

    pub fn get_commit(env: Env, voter: Address) -> Option<BytesN<32>> {
        env.storage().persistent().get(&DataKey::Commit(voter))
    }

    pub fn get_revealed(env: Env, voter: Address) -> Option<u32> {
        env.storage().persistent().get(&DataKey::Revealed(voter))
    }

    pub fn get_tally(env: Env, choice: u32) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Tally(choice))
            .unwrap_or(0)
    }

    pub fn is_voting_open(env: Env) -> bool {
        Self::load_open(&env).unwrap_or(false)
    }

    /// Commitment a voter should submit for `choice` sealed with `secret`.
    pub fn compute_commitment(
        env: Env,
        choice: u32,
        secret: BytesN<32>,
        voter: Address,
    ) -> BytesN<32> {
        Self::hash_vote(&env, choice, &secret, &voter)
    }

    fn hash_vote(env: &Env, choice: u32, secret: &BytesN<32>, voter: &Address) -> BytesN<32> {
        let preimage = (choice, secret.clone(), voter.clone()).to_xdr(env);
        env.crypto().keccak256(&preimage).into()
    }

    fn load_open(env: &Env) -> Result<bool, Error> {
        env.storage()
            .instance()
            .get(&symbol_short!("OPEN"))
            .ok_or(Error::NotInitialized)
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }

    fn extend_ballot_ttl(env: &Env, key: &DataKey) {
        env.storage()
            .persistent()
            .extend_ttl(key, BALLOT_LIFETIME_THRESHOLD, BALLOT_BUMP_AMOUNT);
    }
}

#[cfg(test)]
mod test;
