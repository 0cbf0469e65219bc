//! Transaction signing and signature verification.
//!
//! The signed message is `network_identifier || signing_bytes`, where
//! `signing_bytes` is the envelope encoded with an empty signature list.
//! The caller is responsible for the keypair matching `sender_public_key`;
//! nothing here checks it.

use super::builder::Transaction;
use super::types::{NetworkIdentifier, TransactionError};
use crate::codec::Schema;
use crate::crypto::{sign_detached, verify_detached, Keypair};

/// Signs `tx` and appends the signature.
///
/// Returns the transaction for chaining convenience.
pub fn sign_transaction<'a>(
    tx: &'a mut Transaction,
    asset_schema: &Schema,
    network_identifier: &NetworkIdentifier,
    keypair: &Keypair,
) -> Result<&'a Transaction, TransactionError> {
    let payload = tx.signing_bytes(asset_schema)?;
    let signature = sign_detached(keypair, network_identifier.as_bytes(), &payload);
    tx.signatures.push(signature);
    tracing::debug!(
        module_id = tx.module_id,
        asset_id = tx.asset_id,
        signer = %keypair.public_key(),
        "transaction signed"
    );
    Ok(tx)
}

/// Checks the first signature against the sender public key.
pub fn verify_transaction_signature(
    tx: &Transaction,
    asset_schema: &Schema,
    network_identifier: &NetworkIdentifier,
) -> Result<(), TransactionError> {
    let signature = tx
        .signatures
        .first()
        .ok_or(TransactionError::MissingSignature)?;
    let payload = tx.signing_bytes(asset_schema)?;
    if verify_detached(
        &tx.sender_public_key,
        network_identifier.as_bytes(),
        &payload,
        signature,
    ) {
        Ok(())
    } else {
        Err(TransactionError::InvalidSignature {
            sender: tx.sender_public_key.to_hex(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
