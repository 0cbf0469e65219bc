//! # JSON-RPC Definitions
//!
//! Request/response types for the node's IPC endpoint. Messages are JSON-RPC
//! 2.0 objects, one per line, over the node's Unix socket.
//!
//! ## Method Index
//!
//! | Method            | Params              | Result                          |
//! |-------------------|---------------------|---------------------------------|
//! | `app:getSchema`   | none                | schema set (`transaction`, `account`, `transactionsAssets`) |
//! | `app:getNodeInfo` | none                | object with `networkIdentifier` |
//! | `app:getAccount`  | `{ "address": hex }`| hex-encoded account record      |

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config::{RPC_GET_ACCOUNT, RPC_GET_NODE_INFO, RPC_GET_SCHEMA};

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// Node methods this crate calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    GetSchema,
    GetNodeInfo,
    GetAccount,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetSchema => RPC_GET_SCHEMA,
            Self::GetNodeInfo => RPC_GET_NODE_INFO,
            Self::GetAccount => RPC_GET_ACCOUNT,
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echoed back in the response.
    pub id: Json,
    pub method: String,
    #[serde(default)]
    pub params: Json,
}

impl RpcRequest {
    pub fn new(id: u64, method: RpcMethod, params: Json) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Json::from(id),
            method: method.as_str().to_string(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` is set by a conforming node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Json, result: Json) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Json, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Collapses the response into its outcome. A response carrying neither
    /// field is treated as an internal error.
    pub fn into_result(self) -> Result<Json, RpcError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(error),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::internal_error("response has neither result nor error")),
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object with standard error codes.
///
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Json>,
}

impl RpcError {
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self {
            code: -32601,
            message: format!("method not found: {}", method.into()),
            data: None,
        }
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: msg.into(),
            data: None,
        }
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: msg.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_method_name() {
        let req = RpcRequest::new(7, RpcMethod::GetAccount, json!({ "address": "ab" }));
        let text = serde_json::to_string(&req).unwrap();
        assert!(text.contains("\"app:getAccount\""));
        let recovered: RpcRequest = serde_json::from_str(&text).unwrap();
        assert_eq!(recovered.method, RpcMethod::GetAccount.as_str());
        assert_eq!(recovered.id, json!(7));
    }

    #[test]
    fn success_response_yields_result() {
        let resp = RpcResponse::success(json!(1), json!("00ff"));
        assert_eq!(resp.into_result().unwrap(), json!("00ff"));
    }

    #[test]
    fn error_response_yields_error() {
        let resp = RpcResponse::error(json!(1), RpcError::method_not_found("app:nope"));
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("app:nope"));
    }

    #[test]
    fn empty_response_is_internal_error() {
        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert_eq!(resp.into_result().unwrap_err().code, -32603);
    }

    #[test]
    fn error_codes_are_correct() {
        assert_eq!(RpcError::method_not_found("").code, -32601);
        assert_eq!(RpcError::invalid_params("").code, -32602);
        assert_eq!(RpcError::internal_error("").code, -32603);
    }
}
