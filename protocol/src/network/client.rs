//! IPC client for a locally running node.
//!
//! Every call opens the socket, writes one request line, reads one response
//! line and closes. There are no retries; an unreachable node fails the
//! whole invocation.

use async_trait::async_trait;
use serde_json::{json, Value as Json};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use super::rpc::{RpcMethod, RpcRequest, RpcResponse};
use crate::config::{IPC_SOCKET_PATH, MAX_RESPONSE_BYTES};
use crate::schema::SchemaSet;
use crate::sources::{AccountStateSource, NetworkIdentifierSource, SchemaSource, SourceError};
use crate::transaction::NetworkIdentifier;

/// JSON-RPC client over the node's Unix socket.
#[derive(Debug)]
pub struct IpcClient {
    socket_path: PathBuf,
    next_id: AtomicU64,
    max_response_bytes: u64,
}

impl IpcClient {
    /// Client for the node whose data directory is `data_path`.
    pub fn new(data_path: impl AsRef<Path>) -> Self {
        Self::with_socket(data_path.as_ref().join(IPC_SOCKET_PATH))
    }

    pub fn with_socket(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            next_id: AtomicU64::new(1),
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Caps the length of a single reply line, newline included.
    pub fn with_response_limit(mut self, max_bytes: u64) -> Self {
        self.max_response_bytes = max_bytes;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    fn unreachable(&self, source: std::io::Error) -> SourceError {
        SourceError::NodeUnreachable {
            path: self.socket_path.clone(),
            source,
        }
    }

    /// Performs one request/response round trip.
    pub async fn call(&self, method: RpcMethod, params: Json) -> Result<Json, SourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        let mut line = serde_json::to_vec(&request)
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;
        line.push(b'\n');

        debug!(method = method.as_str(), id, path = %self.socket_path.display(), "calling node");
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| self.unreachable(e))?;
        let (reader, mut writer) = stream.into_split();
        writer.write_all(&line).await.map_err(|e| self.unreachable(e))?;
        writer.flush().await.map_err(|e| self.unreachable(e))?;

        let mut reply = Vec::new();
        let read = BufReader::new(reader.take(self.max_response_bytes))
            .read_until(b'\n', &mut reply)
            .await
            .map_err(|e| self.unreachable(e))?;
        if read == 0 {
            return Err(SourceError::MalformedResponse(format!(
                "connection closed before {} responded",
                method.as_str()
            )));
        }
        if read as u64 >= self.max_response_bytes && reply.last() != Some(&b'\n') {
            return Err(SourceError::MalformedResponse(format!(
                "{} response exceeds {} bytes",
                method.as_str(),
                self.max_response_bytes
            )));
        }

        let response: RpcResponse = serde_json::from_slice(&reply)
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;
        response.into_result().map_err(|e| SourceError::Rpc {
            code: e.code,
            message: e.message,
        })
    }
}

#[async_trait]
impl SchemaSource for IpcClient {
    async fn schema_set(&self) -> Result<SchemaSet, SourceError> {
        let result = self.call(RpcMethod::GetSchema, Json::Null).await?;
        SchemaSet::from_json(&result).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl AccountStateSource for IpcClient {
    async fn account(&self, address: &[u8]) -> Result<Vec<u8>, SourceError> {
        let result = self
            .call(RpcMethod::GetAccount, json!({ "address": hex::encode(address) }))
            .await?;
        let encoded = result
            .as_str()
            .ok_or_else(|| SourceError::MalformedResponse("account is not a hex string".into()))?;
        hex::decode(encoded).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl NetworkIdentifierSource for IpcClient {
    async fn network_identifier(&self) -> Result<NetworkIdentifier, SourceError> {
        let info = self.call(RpcMethod::GetNodeInfo, Json::Null).await?;
        let id = info
            .get("networkIdentifier")
            .and_then(Json::as_str)
            .ok_or_else(|| SourceError::MalformedResponse("node info without networkIdentifier".into()))?;
        NetworkIdentifier::from_hex(id).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }
}
