//! # Hashing Utilities
//!
//! SHA-256 is the only hash the ledger uses on the transaction path: key
//! derivation from passphrases, address derivation from public keys, and
//! transaction IDs.

use sha2::{Digest, Sha256};

use crate::config::ADDRESS_LENGTH;

/// Compute the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derives the 20-byte account address: the first 20 bytes of
/// `sha256(public_key)`.
pub fn address_from_public_key(public_key: &[u8]) -> [u8; ADDRESS_LENGTH] {
    let digest = sha256(public_key);
    let mut address = [0u8; ADDRESS_LENGTH];
    address.copy_from_slice(&digest[..ADDRESS_LENGTH]);
    address
}
