//! Data sources the assembler draws from.
//!
//! Offline and online operation differ only in which implementations sit
//! behind these traits. They are chosen once, before any field is resolved,
//! so the assembly pipeline itself never branches on the mode.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::schema::SchemaSet;
use crate::transaction::NetworkIdentifier;

/// Failures while talking to a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("node at {path} is unreachable: {source}")]
    NodeUnreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("node returned error {code}: {message}")]
    Rpc { code: i32, message: String },

    #[error("malformed node response: {0}")]
    MalformedResponse(String),
}

/// Provides the full schema set (envelope, account, all assets).
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn schema_set(&self) -> Result<SchemaSet, SourceError>;
}

/// Provides the encoded account record for an address.
#[async_trait]
pub trait AccountStateSource: Send + Sync {
    async fn account(&self, address: &[u8]) -> Result<Vec<u8>, SourceError>;
}

/// Provides the identifier of the chain the node runs.
#[async_trait]
pub trait NetworkIdentifierSource: Send + Sync {
    async fn network_identifier(&self) -> Result<NetworkIdentifier, SourceError>;
}
