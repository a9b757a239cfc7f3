use super::*;
use soroban_sdk::{
    testutils::{Address as _, Events},
    vec, Env, FromVal, IntoVal,
};

struct Ballot<'a> {
    client: CommitRevealClient<'a>,
    owner: Address,
    voter: Address,
    secret: BytesN<32>,
}

fn secret(env: &Env) -> BytesN<32> {
    let mut raw = [0u8; 32];
    raw[..11].copy_from_slice(b"supersecret");
    BytesN::from_array(env, &raw)
}

fn setup(env: &Env) -> Ballot<'_> {
    env.mock_all_auths();
    let contract_id = env.register_contract(None, CommitReveal);
    let client = CommitRevealClient::new(env, &contract_id);
    let owner = Address::generate(env);
    client.init(&owner);

    Ballot {
        client,
        owner,
        voter: Address::generate(env),
        secret: secret(env),
    }
}

fn commit(b: &Ballot, choice: u32) -> BytesN<32> {
    let commitment = b.client.compute_commitment(&choice, &b.secret, &b.voter);
    b.client.commit_vote(&b.voter, &commitment);
    commitment
}

#[test]
fn test_commit_stop_reveal() {
    let env = Env::default();
    let b = setup(&env);

    let commitment = commit(&b, 1);
    assert_eq!(b.client.get_commit(&b.voter), Some(commitment.clone()));

    b.client.stop_voting(&b.owner);
    assert!(!b.client.is_voting_open());

    b.client.reveal_vote(&b.voter, &1, &b.secret);

    let events = env.events().all();
    let revealed = events.last().unwrap();
    let expected_topics = vec![
        &env,
        symbol_short!("commit").into_val(&env),
        CommitRevealEvent::Revealed.into_val(&env),
    ];
    assert_eq!(revealed.1, expected_topics);
    let data: BytesN<32> = FromVal::from_val(&env, &revealed.2);
    assert_eq!(data, commitment);

    assert_eq!(b.client.get_revealed(&b.voter), Some(1));
    assert_eq!(b.client.get_tally(&1), 1);
    assert_eq!(b.client.get_tally(&2), 0);
}

#[test]
fn test_commitment_binds_voter() {
    let env = Env::default();
    let b = setup(&env);
    let other = Address::generate(&env);

    let mine = b.client.compute_commitment(&1, &b.secret, &b.voter);
    let theirs = b.client.compute_commitment(&1, &b.secret, &other);
    let other_choice = b.client.compute_commitment(&2, &b.secret, &b.voter);

    assert_ne!(mine, theirs);
    assert_ne!(mine, other_choice);
    assert_eq!(mine, b.client.compute_commitment(&1, &b.secret, &b.voter));
}

#[test]
fn test_reveal_only_after_voting_stops() {
    let env = Env::default();
    let b = setup(&env);
    commit(&b, 1);

    let result = b.client.try_reveal_vote(&b.voter, &1, &b.secret);
    assert_eq!(result, Err(Ok(Error::VotingOpen)));
}

#[test]
fn test_only_owner_can_stop_voting() {
    let env = Env::default();
    let b = setup(&env);

    let result = b.client.try_stop_voting(&b.voter);
    assert_eq!(result, Err(Ok(Error::Unauthorized)));
    assert!(b.client.is_voting_open());
}

#[test]
fn test_commit_only_once() {
    let env = Env::default();
    let b = setup(&env);
    let commitment = commit(&b, 1);

    let result = b.client.try_commit_vote(&b.voter, &commitment);
    assert_eq!(result, Err(Ok(Error::AlreadyCommitted)));
}

#[test]
fn test_commit_rejected_after_voting_stops() {
    let env = Env::default();
    let b = setup(&env);
    let commitment = b.client.compute_commitment(&1, &b.secret, &b.voter);

    b.client.stop_voting(&b.owner);

    let result = b.client.try_commit_vote(&b.voter, &commitment);
    assert_eq!(result, Err(Ok(Error::VotingClosed)));
}

#[test]
fn test_stop_voting_only_once() {
    let env = Env::default();
    let b = setup(&env);

    b.client.stop_voting(&b.owner);
    let result = b.client.try_stop_voting(&b.owner);
    assert_eq!(result, Err(Ok(Error::VotingClosed)));
}

#[test]
fn test_reveal_verifies_hash() {
    let env = Env::default();
    let b = setup(&env);
    commit(&b, 1);
    b.client.stop_voting(&b.owner);

    let result = b.client.try_reveal_vote(&b.voter, &2, &b.secret);
    assert_eq!(result, Err(Ok(Error::CommitMismatch)));

    let wrong_secret = BytesN::from_array(&env, &[7u8; 32]);
    let result = b.client.try_reveal_vote(&b.voter, &1, &wrong_secret);
    assert_eq!(result, Err(Ok(Error::CommitMismatch)));
    assert_eq!(b.client.get_tally(&1), 0);
}

#[test]
fn test_reveal_requires_commit() {
    let env = Env::default();
    let b = setup(&env);
    b.client.stop_voting(&b.owner);

    let result = b.client.try_reveal_vote(&b.voter, &1, &b.secret);
    assert_eq!(result, Err(Ok(Error::NoCommit)));
}

#[test]
fn test_reveal_only_once() {
    let env = Env::default();
    let b = setup(&env);
    commit(&b, 3);
    b.client.stop_voting(&b.owner);

    b.client.reveal_vote(&b.voter, &3, &b.secret);
    let result = b.client.try_reveal_vote(&b.voter, &3, &b.secret);
    assert_eq!(result, Err(Ok(Error::AlreadyRevealed)));
    assert_eq!(b.client.get_tally(&3), 1);
}

#[test]
fn test_init_only_once() {
    let env = Env::default();
    let b = setup(&env);

    let result = b.client.try_init(&b.voter);
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}
