//! # Transaction Module
//!
//! Construction, encoding and signing of ledger transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs   — NetworkIdentifier and TransactionError
//! builder.rs — Transaction record and fluent TransactionBuilder
//! signing.rs — Ed25519 signing and verification over network-scoped payloads
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — Use [`TransactionBuilder`] with a typed asset value.
//! 2. **Encode** — [`Transaction::signing_bytes`] yields the unsigned payload.
//! 3. **Sign** — [`sign_transaction`] appends one signature.
//! 4. **Emit** — [`Transaction::encode`] or [`Transaction::to_json`].
//!
//! ## Design Decisions
//!
//! - The transaction ID is SHA-256 of the full encoding, so it changes when
//!   a signature is appended.
//! - Fees, nonces and amounts are integers end to end; JSON carries 64-bit
//!   values as decimal strings.

pub mod builder;
pub mod signing;
pub mod types;

pub use builder::{Transaction, TransactionBuilder};
pub use signing::{sign_transaction, verify_transaction_signature};
pub use types::{NetworkIdentifier, TransactionError};
