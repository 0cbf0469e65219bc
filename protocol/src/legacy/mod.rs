//! # Legacy Account Archival
//!
//! Runs once after the genesis block is applied. Accounts whose address is
//! not a 20-byte hash address were migrated from the previous chain format
//! and have no registered public key; they are removed from account state
//! and their balances are archived in a single chain-state record so the
//! owners can reclaim them later (module 1000, asset 0).

use async_trait::async_trait;
use futures::future::try_join_all;
use thiserror::Error;
use tracing::info;

use crate::codec::{self, CodecError, Record, Value};
use crate::config::{ADDRESS_LENGTH, CHAIN_STATE_UNREGISTERED_ADDRESSES};
use crate::schema::builtin::unregistered_addresses_schema;

#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("balance lookup for {address} failed: {reason}")]
    Balance { address: String, reason: String },

    #[error("state store: {0}")]
    Store(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Token balance lookup during genesis processing.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn balance(&self, address: &[u8]) -> Result<u64, LegacyError>;
}

/// The slice of genesis state this routine mutates.
#[async_trait]
pub trait GenesisStateStore: Send {
    async fn delete_account(&mut self, address: &[u8]) -> Result<(), LegacyError>;
    async fn set_chain_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LegacyError>;
}

/// One archived entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisteredAddress {
    pub address: Vec<u8>,
    pub balance: u64,
}

pub fn is_legacy_address(address: &[u8]) -> bool {
    address.len() != ADDRESS_LENGTH
}

/// Encodes the archive record.
pub fn encode_unregistered_addresses(entries: &[UnregisteredAddress]) -> Result<Vec<u8>, CodecError> {
    let items = entries
        .iter()
        .map(|entry| {
            let mut record = Record::new();
            record.insert("address".into(), Value::Bytes(entry.address.clone()));
            record.insert("balance".into(), Value::Uint(entry.balance));
            Value::Object(record)
        })
        .collect();
    let mut root = Record::new();
    root.insert("unregisteredAddresses".into(), Value::Array(items));
    codec::encode(&unregistered_addresses_schema(), &Value::Object(root))
}

/// Archives every legacy address in `addresses`.
///
/// Balances are read concurrently; the first failed read aborts before any
/// state is touched. Returns the archived entries in input order.
pub async fn archive_legacy_accounts(
    addresses: &[Vec<u8>],
    ledger: &dyn BalanceReader,
    store: &mut dyn GenesisStateStore,
) -> Result<Vec<UnregisteredAddress>, LegacyError> {
    let legacy: Vec<&Vec<u8>> = addresses.iter().filter(|a| is_legacy_address(a)).collect();

    let entries = try_join_all(legacy.iter().map(|address| async move {
        let balance = ledger.balance(address).await?;
        Ok::<_, LegacyError>(UnregisteredAddress {
            address: address.to_vec(),
            balance,
        })
    }))
    .await?;

    let encoded = encode_unregistered_addresses(&entries)?;
    for entry in &entries {
        store.delete_account(&entry.address).await?;
    }
    store
        .set_chain_state(CHAIN_STATE_UNREGISTERED_ADDRESSES, encoded)
        .await?;

    info!(
        archived = entries.len(),
        total = addresses.len(),
        "legacy accounts archived"
    );
    Ok(entries)
}
