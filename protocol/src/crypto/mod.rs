//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations:
//!
//! - **Ed25519** (`ed25519-dalek`) for detached transaction signatures.
//! - **SHA-256** (`sha2`) for passphrase key derivation, addresses and
//!   transaction IDs.
//!
//! Nothing here is hand-rolled.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{address_from_public_key, sha256};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
pub use signatures::{sign_detached, signing_payload, verify_detached};
