//! # CLI Interface
//!
//! Defines the command-line argument structure for `txcraft` using `clap`
//! derive. Everything lives under the `transaction` command group:
//! `create`, `decode` and `sign`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Offline-capable transaction builder for schema-driven ledgers.
///
/// Builds, signs and decodes transactions either against a locally running
/// node (through its IPC socket) or fully offline from the embedded schemas.
#[derive(Parser, Debug)]
#[command(
    name = "txcraft",
    about = "Build, sign and decode ledger transactions",
    version,
    propagate_version = true
)]
pub struct TxcraftCli {
    /// Log output format on stderr: `pretty` or `json`.
    #[arg(long, global = true, env = "TXCRAFT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transaction commands.
    #[command(subcommand)]
    Transaction(TransactionCommand),
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommand {
    /// Create a transaction, signed unless `--no-signature` is given.
    Create(CreateArgs),
    /// Decode a hex-encoded transaction into JSON.
    Decode(DecodeArgs),
    /// Append a signature to a hex-encoded transaction.
    Sign(SignArgs),
}

/// Where schemas, nonces and the network identifier come from.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Work without a running node. Requires `--network-identifier` and
    /// `--nonce` when creating.
    #[arg(long)]
    pub offline: bool,

    /// Data directory of the node to query. Defaults to `~/.txcraft/default`.
    #[arg(long, short = 'd', env = "TXCRAFT_DATA_PATH")]
    pub data_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Print the transaction field by field instead of as hex.
    #[arg(long)]
    pub json: bool,

    /// Pretty-print the JSON written to stdout.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `transaction create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Registered module ID.
    pub module_id: u32,

    /// Asset ID within the module.
    pub asset_id: u32,

    /// Transaction fee in the smallest unit.
    pub fee: u64,

    #[command(flatten)]
    pub node: NodeArgs,

    /// Network identifier as exactly 64 hex characters. Surrounding
    /// whitespace is ignored; no prefix or trailing punctuation is accepted.
    /// Fetched from the node when omitted online.
    #[arg(long, env = "TXCRAFT_NETWORK_IDENTIFIER")]
    pub network_identifier: Option<String>,

    /// Sender nonce. Read from the sender's account when omitted online.
    #[arg(long)]
    pub nonce: Option<u64>,

    /// Asset as a JSON object, e.g. `{"amount":100,"recipientAddress":"…","data":""}`.
    /// Prompted field by field when omitted.
    #[arg(long, short = 'a')]
    pub asset: Option<String>,

    /// Sender public key in hex. Required with `--no-signature`.
    #[arg(long = "sender-publickey", short = 's')]
    pub sender_public_key: Option<String>,

    /// Leave the transaction unsigned.
    #[arg(long)]
    pub no_signature: bool,

    /// Signing passphrase. Prompted for (twice) when omitted.
    ///
    /// Passing secrets on the command line leaves them in shell history;
    /// prefer the prompt or the environment variable.
    #[arg(long, short = 'p', env = "TXCRAFT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `transaction decode`.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded transaction.
    pub transaction: String,

    #[command(flatten)]
    pub node: NodeArgs,

    /// Pretty-print the JSON written to stdout.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `transaction sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Hex-encoded transaction.
    pub transaction: String,

    #[command(flatten)]
    pub node: NodeArgs,

    /// Network identifier as exactly 64 hex characters. Surrounding
    /// whitespace is ignored; no prefix or trailing punctuation is accepted.
    /// Required offline.
    #[arg(long, env = "TXCRAFT_NETWORK_IDENTIFIER")]
    pub network_identifier: Option<String>,

    /// Signing passphrase. Prompted for (twice) when omitted.
    #[arg(long, short = 'p', env = "TXCRAFT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}
