#![no_std]
use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, contracttype, symbol_short, Address,
    Env, Map, String, Vec,
};

// Storage TTL constants for active data
const INSTANCE_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_BUMP_AMOUNT: u32 = 518400; // ~30 days

// Storage TTL constants for per-election entries
const ELECTION_LIFETIME_THRESHOLD: u32 = 17280; // ~1 day
const ELECTION_BUMP_AMOUNT: u32 = 518400; // ~30 days

// Client trait for the eligibility oracle (any token exposing `balance_of`)
#[contractclient(name = "EligibilityClient")]
pub trait Eligibility {
    fn balance_of(env: Env, owner: Address) -> u32;
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Choices(String),
    Tally(String, String),
    Voted(String, Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VotingWindow {
    pub start_time: u64,
    pub end_time: u64,
}

/// Events emitted by the contract for audit trail
#[contracttype]
#[derive(Clone)]
pub enum VoteEvent {
    ChoiceAdded,
    Voted,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    Unauthorized = 1,
    InvalidWindow = 2,
    DuplicateChoice = 3,
    NotStarted = 4,
    Ended = 5,
    NotRegistered = 6,
    InvalidChoice = 7,
    AlreadyVoted = 8,
    AlreadyInitialized = 9,
    NotInitialized = 10,
}

#[contract]
pub struct Vote;

#[contractimpl]
impl Vote {
    /// Configure the tally.
    ///
    /// # Arguments
    /// * `admin` - Address allowed to register choices
    /// * `eligibility` - Token contract whose holders may vote
    /// * `start_time` / `end_time` - Inclusive voting window as Unix timestamps
    ///
    /// # Errors
    /// * `InvalidWindow` - If `start_time` is not before `end_time`
    pub fn init(
        env: Env,
        admin: Address,
        eligibility: Address,
        start_time: u64,
        end_time: u64,
    ) -> Result<(), Error> {
        admin.require_auth();

        if env.storage().instance().has(&symbol_short!("ADMIN")) {
            return Err(Error::AlreadyInitialized);
        }
        if start_time >= end_time {
            return Err(Error::InvalidWindow);
        }

        Self::extend_instance_ttl(&env);
        env.storage().instance().set(&symbol_short!("ADMIN"), &admin);
        env.storage()
            .instance()
            .set(&symbol_short!("ELIGIBLE"), &eligibility);
        env.storage().instance().set(
            &symbol_short!("WINDOW"),
            &VotingWindow {
                start_time,
                end_time,
            },
        );

        Ok(())
    }

    /// Register a choice for an election. Admin only.
    ///
    /// # Errors
    /// * `Unauthorized` - If caller is not the admin
    /// * `DuplicateChoice` - If the election already lists this choice
    pub fn add_choice(
        env: Env,
        caller: Address,
        election: String,
        choice: String,
    ) -> Result<(), Error> {
        caller.require_auth();

        let admin: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("ADMIN"))
            .ok_or(Error::NotInitialized)?;
        if caller != admin {
            return Err(Error::Unauthorized);
        }

        let key = DataKey::Choices(election.clone());
        let mut choices: Vec<String> = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or_else(|| Vec::new(&env));
        if choices.iter().any(|existing| existing == choice) {
            return Err(Error::DuplicateChoice);
        }

        choices.push_back(choice.clone());
        env.storage().persistent().set(&key, &choices);
        Self::extend_election_ttl(&env, &key);
        Self::extend_instance_ttl(&env);

        env.events().publish(
            (symbol_short!("vote"), VoteEvent::ChoiceAdded),
            (election, choice),
        );

        Ok(())
    }

    /// Cast one vote in an election.
    ///
    /// # Errors
    /// * `NotStarted` - If the window has not opened
    /// * `Ended` - If the window has closed
    /// * `NotRegistered` - If the voter holds no eligibility token
    /// * `InvalidChoice` - If the choice is not registered for the election
    /// * `AlreadyVoted` - If the voter already voted in this election
    pub fn vote(env: Env, voter: Address, election: String, choice: String) -> Result<(), Error> {
        voter.require_auth();

        let window = Self::load_window(&env)?;
        let now = env.ledger().timestamp();
        if now < window.start_time {
            return Err(Error::NotStarted);
        }
        if now > window.end_time {
            return Err(Error::Ended);
        }

        let eligibility: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("ELIGIBLE"))
            .ok_or(Error::NotInitialized)?;
        if EligibilityClient::new(&env, &eligibility).balance_of(&voter) == 0 {
            return Err(Error::NotRegistered);
        }

        let choices = Self::get_choices(env.clone(), election.clone());
        if !choices.iter().any(|existing| existing == choice) {
            return Err(Error::InvalidChoice);
        }

        let voted_key = DataKey::Voted(election.clone(), voter);
        if env.storage().persistent().has(&voted_key) {
            return Err(Error::AlreadyVoted);
        }

        let tally_key = DataKey::Tally(election.clone(), choice.clone());
        let count: u32 = env.storage().persistent().get(&tally_key).unwrap_or(0);

        env.storage().persistent().set(&voted_key, &true);
        env.storage().persistent().set(&tally_key, &(count + 1));
        Self::extend_election_ttl(&env, &voted_key);
        Self::extend_election_ttl(&env, &tally_key);
        Self::extend_instance_ttl(&env);

        env.events()
            .publish((symbol_short!("vote"), VoteEvent::Voted), (election, choice));

        Ok(())
    }

    pub fn get_current_votes(env: Env, election: String, choice: String) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Tally(election, choice))
            .unwrap_or(0)
    }

    pub fn get_all_votes(env: Env, election: String) -> Map<String, u32> {
        let mut votes = Map::new(&env);
        for choice in Self::get_choices(env.clone(), election.clone()).iter() {
            let count = Self::get_current_votes(env.clone(), election.clone(), choice.clone());
            votes.set(choice, count);
        }
        votes
    }

    /// Choice with the most votes. Ties go to the choice registered first;
    /// an election without votes has no winner (empty string).
    pub fn get_winner(env: Env, election: String) -> String {
        let mut winner = String::from_str(&env, "");
        let mut best = 0u32;
        for choice in Self::get_choices(env.clone(), election.clone()).iter() {
            let count = Self::get_current_votes(env.clone(), election.clone(), choice.clone());
            if count > best {
                best = count;
                winner = choice;
            }
        }
        winner
    }

    pub fn get_choices(env: Env, election: String) -> Vec<String> {
        env.storage()
            .persistent()
            .get(&DataKey::Choices(election))
            .unwrap_or_else(|| Vec::new(&env))
    }

    pub fn has_voted(env: Env, election: String, voter: Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Voted(election, voter))
    }

    pub fn get_window(env: Env) -> Result<VotingWindow, Error> {
        Self::load_window(&env)
    }

    fn load_window(env: &Env) -> Result<VotingWindow, Error> {
        env.storage()
            .instance()
            .get(&symbol_short!("WINDOW"))
            .ok_or(Error::NotInitialized)
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }

    fn extend_election_ttl(env: &Env, key: &DataKey) {
        env.storage()
            .persistent()
            .extend_ttl(key, ELECTION_LIFETIME_THRESHOLD, ELECTION_BUMP_AMOUNT);
    }
}
