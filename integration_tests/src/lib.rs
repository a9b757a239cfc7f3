#![no_std]
//! Fixture contracts shared by the cross-contract scenarios in `tests/`.

use soroban_sdk::{
    contract, contracterror, contractimpl, log, symbol_short, xdr::FromXdr, xdr::ToXdr, Address,
    Bytes, Env, String,
};
use voter_token::VoterTokenClient;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistrarError {
    NotInitialized = 1,
    UnknownFunction = 2,
    MalformedPayload = 3,
    AlreadyInitialized = 4,
}

/// Voter registrar governed by a timelock committee.
///
/// Holds the admin role of a voter token and mints on `register(address)`
/// calls dispatched through the timelock's `Callable` interface.
#[contract]
pub struct VoterRegistrar;

#[contractimpl]
impl VoterRegistrar {
    /// Bind the registrar to its timelock and token. Binding is permanent.
    pub fn init(env: Env, timelock: Address, token: Address) -> Result<(), RegistrarError> {
        if env.storage().instance().has(&symbol_short!("TIMELOCK")) {
            return Err(RegistrarError::AlreadyInitialized);
        }

        env.storage()
            .instance()
            .set(&symbol_short!("TIMELOCK"), &timelock);
        env.storage().instance().set(&symbol_short!("TOKEN"), &token);
        Ok(())
    }

    pub fn invoke(
        env: Env,
        signature: String,
        payload: Bytes,
        _value: i128,
    ) -> Result<Bytes, RegistrarError> {
        let timelock: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("TIMELOCK"))
            .ok_or(RegistrarError::NotInitialized)?;
        timelock.require_auth();

        if signature != String::from_str(&env, "register(address)") {
            log!(&env, "registrar: unknown function", signature);
            return Err(RegistrarError::UnknownFunction);
        }

        let voter =
            Address::from_xdr(&env, &payload).map_err(|_| RegistrarError::MalformedPayload)?;
        let token: Address = env
            .storage()
            .instance()
            .get(&symbol_short!("TOKEN"))
            .ok_or(RegistrarError::NotInitialized)?;

        let token_id = VoterTokenClient::new(&env, &token)
            .safe_mint(&env.current_contract_address(), &voter);
        Ok(token_id.to_xdr(&env))
    }
}
