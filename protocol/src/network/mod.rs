//! # Network Module
//!
//! Talks to a locally running node over its IPC socket. Only three queries
//! are needed: the schema set, node info (for the network identifier) and a
//! single account record.
//!
//! ## Architecture
//!
//! ```text
//! rpc.rs    — JSON-RPC request/response types and method names
//! client.rs — Unix-socket client implementing the data source traits
//! ```
//!
//! ## Design Decisions
//!
//! - One connection per call. The create flow issues at most three calls, so
//!   connection reuse buys nothing.
//! - The RPC layer defines types only; framing and transport live in the
//!   client.

pub mod client;
pub mod rpc;

pub use client::IpcClient;
pub use rpc::{RpcError, RpcMethod, RpcRequest, RpcResponse};
