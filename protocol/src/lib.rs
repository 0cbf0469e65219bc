// Copyright (c) 2026 txcraft contributors. MIT License.
// See LICENSE for details.

//! # txcraft — Core Library
//!
//! Assembles protocol-valid, optionally signed transactions for a
//! schema-driven ledger without running the node software. Everything
//! revolves around one deterministic binary encoding of schema-typed records
//! and detached Ed25519 signatures over those encodings.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants: lengths, module ids, IPC paths.
//! - **codec** — Schema model, typed values, binary encode/decode.
//! - **schema** — `(moduleID, assetID)` → asset schema, embedded or fetched.
//! - **sources** — Data source traits the assembler draws from.
//! - **prompt** — Schema-driven questions and answer transformation.
//! - **crypto** — Passphrase keys, hashing, detached signatures.
//! - **transaction** — The transaction record, encoding and signing.
//! - **network** — JSON-RPC client for a local node's IPC socket.
//! - **assembler** — Flag validation, mode selection and orchestration.
//! - **legacy** — Genesis-time archival of legacy-format accounts.
//!
//! ## Design Philosophy
//!
//! 1. Output is byte-exact with the ledger or it is wrong.
//! 2. Integers never pass through floating point.
//! 3. Offline and online differ only in their data sources.

pub mod assembler;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod legacy;
pub mod network;
pub mod prompt;
pub mod schema;
pub mod sources;
pub mod transaction;
