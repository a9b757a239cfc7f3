use soroban_sdk::{Address, Env, Map, String, Vec};

use crate::Error;

/// Smallest committee a timelock can be created with.
pub const MIN_OWNERS: u32 = 3;

// All-zero account and contract strkeys.
const NULL_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
const NULL_CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

pub fn is_null(env: &Env, address: &Address) -> bool {
    *address == Address::from_string(&String::from_str(env, NULL_ACCOUNT))
        || *address == Address::from_string(&String::from_str(env, NULL_CONTRACT))
}

/// Rejects committees that are too small, contain the null address, or
/// list the same principal twice.
pub fn validate(env: &Env, owners: &Vec<Address>) -> Result<(), Error> {
    if owners.len() < MIN_OWNERS {
        return Err(Error::InvalidOwnerSet);
    }

    let mut seen: Map<Address, bool> = Map::new(env);
    for owner in owners.iter() {
        if is_null(env, &owner) || seen.contains_key(owner.clone()) {
            return Err(Error::InvalidOwnerSet);
        }
        seen.set(owner, true);
    }

    Ok(())
}

pub fn contains(owners: &Vec<Address>, principal: &Address) -> bool {
    owners.iter().any(|owner| owner == *principal)
}
