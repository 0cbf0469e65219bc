//! # Detached Signatures
//!
//! Every signature the ledger accepts is computed over
//! `network_identifier || payload`. Mixing the network identifier into the
//! signed bytes scopes the signature to one chain instance: a transaction
//! signed for testnet does not verify on mainnet.

use super::keys::{Keypair, PublicKey, Signature};

/// Builds the byte string that is actually signed.
pub fn signing_payload(network_identifier: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(network_identifier.len() + payload.len());
    message.extend_from_slice(network_identifier);
    message.extend_from_slice(payload);
    message
}

/// Signs `payload` for the chain identified by `network_identifier`.
pub fn sign_detached(keypair: &Keypair, network_identifier: &[u8], payload: &[u8]) -> Signature {
    keypair.sign(&signing_payload(network_identifier, payload))
}

/// Returns `true` if `signature` was produced by `public_key` over
/// `network_identifier || payload`.
pub fn verify_detached(
    public_key: &PublicKey,
    network_identifier: &[u8],
    payload: &[u8],
    signature: &Signature,
) -> bool {
    public_key.verify(&signing_payload(network_identifier, payload), signature)
}
