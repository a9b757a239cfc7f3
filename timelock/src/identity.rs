use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, String};

/// Transaction id: keccak256 over the XDR encoding of the five proposal
/// fields. Identical proposals collide on purpose; that collision is the
/// de-duplication and replay key.
pub fn derive_tx_id(
    env: &Env,
    target: &Address,
    signature: &String,
    payload: &Bytes,
    value: i128,
    timestamp: u64,
) -> BytesN<32> {
    let preimage = (
        target.clone(),
        signature.clone(),
        payload.clone(),
        value,
        timestamp,
    )
        .to_xdr(env);
    env.crypto().keccak256(&preimage).into()
}
