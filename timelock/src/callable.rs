use soroban_sdk::{contractclient, log, Address, Bytes, Env, String};

use crate::Error;

/// Interface a contract implements to be scheduled through the timelock.
///
/// `signature` names the function the target should run and `payload`
/// carries its encoded arguments. An empty `signature` means the payload is
/// raw input for the target's default handler. The returned bytes are
/// surfaced in the `Executed` event.
#[contractclient(name = "CallableClient")]
pub trait Callable {
    fn invoke(env: Env, signature: String, payload: Bytes, value: i128) -> Bytes;
}

/// Invokes `target` and folds every failure mode (panic, contract error,
/// missing entry point, non-contract address, re-entry) into `CallFailed`.
pub fn dispatch(
    env: &Env,
    target: &Address,
    signature: &String,
    payload: &Bytes,
    value: i128,
) -> Result<Bytes, Error> {
    let client = CallableClient::new(env, target);
    match client.try_invoke(signature, payload, &value) {
        Ok(Ok(return_data)) => Ok(return_data),
        Ok(Err(_)) => {
            log!(env, "timelock: undecodable return data", target.clone());
            Err(Error::CallFailed)
        }
        Err(_) => {
            log!(env, "timelock: call reverted", target.clone(), signature.clone());
            Err(Error::CallFailed)
        }
    }
}
