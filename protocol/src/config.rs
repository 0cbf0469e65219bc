//! # Protocol Configuration & Constants
//!
//! Every fixed parameter the transaction tooling relies on lives here. The
//! byte lengths and module identifiers are dictated by the ledger; changing
//! them produces transactions the node will reject.

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Network identifiers are SHA-256 digests.
pub const NETWORK_IDENTIFIER_LENGTH: usize = 32;

/// Addresses are the first 20 bytes of SHA-256(public key).
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Module identifiers
// ---------------------------------------------------------------------------

pub const TOKEN_MODULE_ID: u32 = 2;
pub const KEYS_MODULE_ID: u32 = 4;
pub const DPOS_MODULE_ID: u32 = 5;
pub const LEGACY_ACCOUNT_MODULE_ID: u32 = 1000;

pub const TOKEN_TRANSFER_ASSET_ID: u32 = 0;
pub const KEYS_REGISTER_ASSET_ID: u32 = 0;
pub const DPOS_REGISTER_DELEGATE_ASSET_ID: u32 = 0;
pub const DPOS_VOTE_ASSET_ID: u32 = 1;
pub const DPOS_UNLOCK_ASSET_ID: u32 = 2;
pub const LEGACY_RECLAIM_ASSET_ID: u32 = 0;

/// Upper bound on the key lists of a multisignature registration.
pub const MAX_KEYS_COUNT: usize = 64;

/// Chain-state key under which the legacy account archive is stored.
pub const CHAIN_STATE_UNREGISTERED_ADDRESSES: &str = "legacyAccount:unregisteredAddresses";

// ---------------------------------------------------------------------------
// Node IPC
// ---------------------------------------------------------------------------

/// Socket path relative to the node data directory.
pub const IPC_SOCKET_PATH: &str = "tmp/sockets/ipc.sock";

/// Data directory used when none is given, relative to `$HOME`.
pub const DEFAULT_DATA_DIR: &str = ".txcraft/default";

/// Longest single-line reply accepted from the node.
pub const MAX_RESPONSE_BYTES: u64 = 16 * 1024 * 1024;

pub const RPC_GET_SCHEMA: &str = "app:getSchema";
pub const RPC_GET_NODE_INFO: &str = "app:getNodeInfo";
pub const RPC_GET_ACCOUNT: &str = "app:getAccount";

/// Resolves the default node data path from `$HOME`.
///
/// Returns `None` when `$HOME` is unset; callers then require an explicit path.
pub fn default_data_path() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(|home| std::path::PathBuf::from(home).join(DEFAULT_DATA_DIR))
}
