//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] produces an unsigned [`Transaction`]; signing
//! happens separately in [`super::signing`] so construction stays testable
//! without key material.
//!
//! The asset is held as a schema-typed [`Value`]. Every byte-level operation
//! takes the asset schema explicitly because the envelope only ever carries
//! the asset as an opaque encoded blob.

use serde_json::{json, Value as Json};

use super::types::TransactionError;
use crate::codec::{self, Record, Schema, Value};
use crate::crypto::{sha256, PublicKey, Signature};
use crate::schema::builtin::transaction_schema;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A ledger transaction.
///
/// # Canonical Byte Format
///
/// The envelope is encoded with the transaction schema: `moduleID #1`,
/// `assetID #2`, `nonce #3`, `fee #4`, `senderPublicKey #5`, `asset #6`
/// (the encoded asset record) and `signatures #7`. With no signatures the
/// encoding is exactly the payload that gets signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub module_id: u32,
    pub asset_id: u32,

    /// Per-sender sequence number.
    pub nonce: u64,

    /// Fee in the chain's smallest denomination.
    pub fee: u64,

    pub sender_public_key: PublicKey,

    /// Asset record conforming to the schema of `(module_id, asset_id)`.
    pub asset: Value,

    /// Empty until signed.
    pub signatures: Vec<Signature>,
}

impl Transaction {
    fn envelope(&self, asset_schema: &Schema, signatures: &[Signature]) -> Result<Value, TransactionError> {
        let mut record = Record::new();
        record.insert("moduleID".into(), Value::Uint(self.module_id.into()));
        record.insert("assetID".into(), Value::Uint(self.asset_id.into()));
        record.insert("nonce".into(), Value::Uint(self.nonce));
        record.insert("fee".into(), Value::Uint(self.fee));
        record.insert(
            "senderPublicKey".into(),
            Value::Bytes(self.sender_public_key.as_bytes().to_vec()),
        );
        record.insert("asset".into(), Value::Bytes(self.asset_bytes(asset_schema)?));
        record.insert(
            "signatures".into(),
            Value::Array(
                signatures
                    .iter()
                    .map(|s| Value::Bytes(s.as_bytes().to_vec()))
                    .collect(),
            ),
        );
        Ok(Value::Object(record))
    }

    /// Encoded asset record.
    pub fn asset_bytes(&self, asset_schema: &Schema) -> Result<Vec<u8>, TransactionError> {
        Ok(codec::encode(asset_schema, &self.asset)?)
    }

    /// Encoding without signatures: the bytes that get signed.
    pub fn signing_bytes(&self, asset_schema: &Schema) -> Result<Vec<u8>, TransactionError> {
        let envelope = self.envelope(asset_schema, &[])?;
        Ok(codec::encode(&transaction_schema(), &envelope)?)
    }

    /// Full encoding, signatures included.
    pub fn encode(&self, asset_schema: &Schema) -> Result<Vec<u8>, TransactionError> {
        let envelope = self.envelope(asset_schema, &self.signatures)?;
        Ok(codec::encode(&transaction_schema(), &envelope)?)
    }

    /// Transaction ID: SHA-256 of the full encoding.
    pub fn id(&self, asset_schema: &Schema) -> Result<[u8; 32], TransactionError> {
        Ok(sha256(&self.encode(asset_schema)?))
    }

    /// Reads `(module_id, asset_id)` from an encoded transaction so the
    /// caller can resolve the asset schema before a full decode.
    pub fn decode_header(bytes: &[u8]) -> Result<(u32, u32), TransactionError> {
        let envelope = codec::decode(&transaction_schema(), bytes)?;
        Ok((
            envelope_u32(&envelope, "moduleID")?,
            envelope_u32(&envelope, "assetID")?,
        ))
    }

    /// Decodes a full encoding.
    pub fn decode(asset_schema: &Schema, bytes: &[u8]) -> Result<Self, TransactionError> {
        let envelope = codec::decode(&transaction_schema(), bytes)?;
        let field = |name: &'static str| {
            envelope
                .get(name)
                .ok_or(TransactionError::MalformedEnvelope(name))
        };
        let bytes_of = |name: &'static str| {
            field(name)?
                .as_bytes()
                .ok_or(TransactionError::MalformedEnvelope(name))
        };
        let u64_of = |name: &'static str| {
            field(name)?
                .as_u64()
                .ok_or(TransactionError::MalformedEnvelope(name))
        };

        let signatures = field("signatures")?
            .as_array()
            .ok_or(TransactionError::MalformedEnvelope("signatures"))?
            .iter()
            .map(|s| {
                let bytes = s
                    .as_bytes()
                    .ok_or(TransactionError::MalformedEnvelope("signatures"))?;
                Ok(Signature::try_from_slice(bytes)?)
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;

        Ok(Self {
            module_id: envelope_u32(&envelope, "moduleID")?,
            asset_id: envelope_u32(&envelope, "assetID")?,
            nonce: u64_of("nonce")?,
            fee: u64_of("fee")?,
            sender_public_key: PublicKey::try_from_slice(bytes_of("senderPublicKey")?)?,
            asset: codec::decode(asset_schema, bytes_of("asset")?)?,
            signatures,
        })
    }

    /// Structured JSON form: 64-bit integers as decimal strings, bytes as
    /// hex.
    pub fn to_json(&self, asset_schema: &Schema) -> Result<Json, TransactionError> {
        let signatures: Vec<String> = self.signatures.iter().map(Signature::to_hex).collect();
        Ok(json!({
            "moduleID": self.module_id,
            "assetID": self.asset_id,
            "nonce": self.nonce.to_string(),
            "fee": self.fee.to_string(),
            "senderPublicKey": self.sender_public_key.to_hex(),
            "asset": self.asset.to_json(asset_schema)?,
            "signatures": signatures,
        }))
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }
}

fn envelope_u32(envelope: &Value, name: &'static str) -> Result<u32, TransactionError> {
    envelope
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(TransactionError::MalformedEnvelope(name))
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// # Usage
///
/// ```rust,no_run
/// use txcraft_protocol::codec::{Record, Value};
/// use txcraft_protocol::crypto::Keypair;
/// use txcraft_protocol::transaction::TransactionBuilder;
///
/// let keypair = Keypair::from_passphrase("some passphrase");
/// let tx = TransactionBuilder::new(2, 0, keypair.public_key())
///     .nonce(1)
///     .fee(100_000_000)
///     .asset(Value::Object(Record::new()))
///     .build();
/// ```
///
/// `nonce` and `fee` default to 0 and the asset to an empty record.
pub struct TransactionBuilder {
    module_id: u32,
    asset_id: u32,
    sender_public_key: PublicKey,
    nonce: u64,
    fee: u64,
    asset: Value,
}

impl TransactionBuilder {
    pub fn new(module_id: u32, asset_id: u32, sender_public_key: PublicKey) -> Self {
        Self {
            module_id,
            asset_id,
            sender_public_key,
            nonce: 0,
            fee: 0,
            asset: Value::Object(Record::new()),
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn asset(mut self, asset: Value) -> Self {
        self.asset = asset;
        self
    }

    /// Consumes the builder and produces an unsigned [`Transaction`].
    pub fn build(self) -> Transaction {
        Transaction {
            module_id: self.module_id,
            asset_id: self.asset_id,
            nonce: self.nonce,
            fee: self.fee,
            sender_public_key: self.sender_public_key,
            asset: self.asset,
            signatures: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
