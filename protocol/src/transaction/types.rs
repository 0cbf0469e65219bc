//! Value types shared by transaction construction and signing.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::codec::CodecError;
use crate::config::NETWORK_IDENTIFIER_LENGTH;
use crate::crypto::KeyError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while building, encoding, signing or verifying a
/// transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Key(#[from] KeyError),

    /// The network identifier is not 32 bytes of hex.
    #[error("invalid network identifier: {0}")]
    InvalidNetworkIdentifier(String),

    #[error("transaction is unsigned")]
    MissingSignature,

    /// The first signature does not verify against the sender key.
    #[error("invalid signature: does not verify against sender {sender}")]
    InvalidSignature { sender: String },

    /// The encoded envelope is missing a field or carries the wrong type.
    #[error("malformed transaction envelope: {0}")]
    MalformedEnvelope(&'static str),
}

// ---------------------------------------------------------------------------
// NetworkIdentifier
// ---------------------------------------------------------------------------

/// Identifier of one chain instance. Prepended to every signed payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkIdentifier([u8; NETWORK_IDENTIFIER_LENGTH]);

impl NetworkIdentifier {
    pub fn from_bytes(bytes: [u8; NETWORK_IDENTIFIER_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        let invalid = || TransactionError::InvalidNetworkIdentifier(s.to_string());
        let bytes = hex::decode(s.trim()).map_err(|_| invalid())?;
        let bytes: [u8; NETWORK_IDENTIFIER_LENGTH] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; NETWORK_IDENTIFIER_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for NetworkIdentifier {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for NetworkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NetworkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkIdentifier({})", self.to_hex())
    }
}
