//! # Transaction Assembler
//!
//! Orchestrates schema resolution, asset collection, key derivation, nonce
//! and network-identifier lookup, construction and signing.
//!
//! ## Pipeline
//!
//! ```text
//! validate(flags) ──► Mode ──► Sources (offline | online, chosen once)
//!                                 │
//! resolve schema ─► asset (flag JSON | prompts) ─► passphrase ─► sender key
//!   ─► nonce (flag | account) ─► network id (flag | node) ─► build ─► sign
//! ```
//!
//! Flag validation runs before any query or prompt, so a bad flag
//! combination never leaves the user half-way through a prompt session.

pub mod output;
pub mod sources;

use serde_json::Value as Json;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError, Value};
use crate::config::default_data_path;
use crate::crypto::{verify_detached, KeyError, Keypair, PublicKey};
use crate::prompt::{collect_asset, transform_asset, PromptError, Prompter};
use crate::schema::SchemaError;
use crate::sources::SourceError;
use crate::transaction::{
    sign_transaction, NetworkIdentifier, Transaction, TransactionBuilder, TransactionError,
};

pub use output::{AssembledTransaction, OutputFormat};
pub use sources::Sources;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Everything that can stop a transaction from being produced.
///
/// Conversions from the module-level errors lift the variants a user is
/// expected to act on (unknown asset, malformed number or hex, unreachable
/// node) to the top level.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("Transaction moduleID:{module_id} with assetID:{asset_id} is not registered in the application")]
    UnknownAsset { module_id: u32, asset_id: u32 },

    #[error("field {field}: Cannot convert {value} to an integer")]
    InvalidNumber { field: String, value: String },

    #[error("field {field}: {value} is not valid hex")]
    InvalidHex { field: String, value: String },

    #[error("Flag: --data-path should not be specified while creating transaction offline")]
    DataPathNotAllowedOffline,

    #[error("Flag: --network-identifier must be specified while creating transaction offline")]
    MissingNetworkIdentifier,

    #[error("Flag: --nonce must be specified while creating transaction offline")]
    MissingNonce,

    #[error("Sender publickey must be specified when no-signature flags is used")]
    MissingSenderKey,

    #[error("node at {path} is unreachable: {source}")]
    NodeUnreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data path given and $HOME is not set")]
    NoDataPath,

    #[error("invalid asset JSON: {0}")]
    InvalidAssetJson(#[source] serde_json::Error),

    #[error("account record has no sequence.nonce")]
    MissingAccountNonce,

    #[error("encoded transaction is not valid hex")]
    InvalidEncoding,

    #[error("transaction already carries a signature from {signer}")]
    AlreadySigned { signer: PublicKey },

    #[error(transparent)]
    Codec(CodecError),

    #[error(transparent)]
    Schema(SchemaError),

    #[error(transparent)]
    Source(SourceError),

    #[error(transparent)]
    Transaction(TransactionError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl From<CodecError> for CreateError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidNumber { field, value } => Self::InvalidNumber { field, value },
            CodecError::InvalidHex { field, value } => Self::InvalidHex { field, value },
            other => Self::Codec(other),
        }
    }
}

impl From<SourceError> for CreateError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NodeUnreachable { path, source } => Self::NodeUnreachable { path, source },
            other => Self::Source(other),
        }
    }
}

impl From<SchemaError> for CreateError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownAsset {
                module_id,
                asset_id,
            } => Self::UnknownAsset {
                module_id,
                asset_id,
            },
            SchemaError::Codec(e) => e.into(),
            SchemaError::Source(e) => e.into(),
            other => Self::Schema(other),
        }
    }
}

impl From<TransactionError> for CreateError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Codec(e) => e.into(),
            TransactionError::Key(e) => Self::Key(e),
            other => Self::Transaction(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Options & validation
// ---------------------------------------------------------------------------

/// Inputs to one `create` run. String fields are taken verbatim from the
/// caller and parsed during assembly.
#[derive(Clone, Default)]
pub struct CreateOptions {
    pub module_id: u32,
    pub asset_id: u32,
    pub fee: u64,
    pub offline: bool,
    pub data_path: Option<PathBuf>,
    /// Hex.
    pub network_identifier: Option<String>,
    pub nonce: Option<u64>,
    /// Asset as a JSON object; prompts are used when absent.
    pub asset: Option<String>,
    /// Hex.
    pub sender_public_key: Option<String>,
    pub no_signature: bool,
    pub passphrase: Option<String>,
    pub format: OutputFormat,
}

impl fmt::Debug for CreateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateOptions")
            .field("module_id", &self.module_id)
            .field("asset_id", &self.asset_id)
            .field("fee", &self.fee)
            .field("offline", &self.offline)
            .field("data_path", &self.data_path)
            .field("network_identifier", &self.network_identifier)
            .field("nonce", &self.nonce)
            .field("asset", &self.asset)
            .field("sender_public_key", &self.sender_public_key)
            .field("no_signature", &self.no_signature)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("format", &self.format)
            .finish()
    }
}

/// Where the run gets its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Offline,
    Online { data_path: Option<PathBuf> },
}

impl Mode {
    /// Builds the sources for this mode. Online without an explicit path
    /// falls back to the default data directory.
    pub fn sources(&self) -> Result<Sources, CreateError> {
        match self {
            Self::Offline => Ok(Sources::offline()),
            Self::Online { data_path } => {
                let path = data_path
                    .clone()
                    .or_else(default_data_path)
                    .ok_or(CreateError::NoDataPath)?;
                Ok(Sources::for_data_path(path))
            }
        }
    }
}

/// Checks flag combinations. Runs before any query or prompt.
pub fn validate(opts: &CreateOptions) -> Result<Mode, CreateError> {
    if opts.offline {
        if opts.data_path.is_some() {
            return Err(CreateError::DataPathNotAllowedOffline);
        }
        if opts.network_identifier.is_none() {
            return Err(CreateError::MissingNetworkIdentifier);
        }
        if opts.nonce.is_none() {
            return Err(CreateError::MissingNonce);
        }
    }
    if opts.no_signature && opts.sender_public_key.is_none() {
        return Err(CreateError::MissingSenderKey);
    }
    Ok(if opts.offline {
        Mode::Offline
    } else {
        Mode::Online {
            data_path: opts.data_path.clone(),
        }
    })
}

// ---------------------------------------------------------------------------
// TransactionAssembler
// ---------------------------------------------------------------------------

/// Runs the assembly pipeline against one set of [`Sources`].
#[derive(Debug)]
pub struct TransactionAssembler {
    sources: Sources,
}

impl TransactionAssembler {
    pub fn new(sources: Sources) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Validates `opts`, then assembles with sources for the resulting mode.
    pub async fn create(
        opts: &CreateOptions,
        prompter: &mut dyn Prompter,
    ) -> Result<AssembledTransaction, CreateError> {
        let mode = validate(opts)?;
        Self::new(mode.sources()?).assemble(opts, prompter).await
    }

    /// Builds and, when a passphrase is available, signs the transaction.
    ///
    /// Assumes `opts` already passed [`validate`] for the mode these sources
    /// were built for.
    pub async fn assemble(
        &self,
        opts: &CreateOptions,
        prompter: &mut dyn Prompter,
    ) -> Result<AssembledTransaction, CreateError> {
        info!(
            module_id = opts.module_id,
            asset_id = opts.asset_id,
            offline = opts.offline,
            "assembling transaction"
        );

        // Parse hex flags up front so a typo fails before any prompt.
        let flag_network = opts
            .network_identifier
            .as_deref()
            .map(NetworkIdentifier::from_hex)
            .transpose()?;
        let flag_sender = opts
            .sender_public_key
            .as_deref()
            .map(PublicKey::from_hex)
            .transpose()?;

        let asset_schema = self
            .sources
            .schemas
            .resolve(opts.module_id, opts.asset_id)
            .await?
            .clone();

        let asset = match &opts.asset {
            Some(raw) => {
                let json: Json = serde_json::from_str(raw).map_err(CreateError::InvalidAssetJson)?;
                Value::from_json(&asset_schema, &json)?
            }
            None => {
                let answers = collect_asset(&asset_schema, prompter)?;
                transform_asset(&asset_schema, &answers)?
            }
        };
        debug!(schema = %asset_schema.id, "asset resolved");

        let passphrase = match (&opts.passphrase, opts.no_signature) {
            (_, true) => None,
            (Some(p), false) => Some(p.clone()),
            (None, false) => Some(prompter.passphrase("passphrase", true)?),
        };
        let keypair = passphrase.as_deref().map(Keypair::from_passphrase);

        let sender_public_key = match (flag_sender, &keypair) {
            (Some(explicit), Some(keypair)) => {
                if explicit != keypair.public_key() {
                    warn!(
                        sender = %explicit,
                        signer = %keypair.public_key(),
                        "sender public key does not belong to the passphrase; the signature will not verify"
                    );
                }
                explicit
            }
            (Some(explicit), None) => explicit,
            (None, Some(keypair)) => keypair.public_key(),
            (None, None) => return Err(CreateError::MissingSenderKey),
        };

        let nonce = match opts.nonce {
            Some(nonce) => nonce,
            None => self.account_nonce(&sender_public_key).await?,
        };

        let mut transaction = TransactionBuilder::new(opts.module_id, opts.asset_id, sender_public_key)
            .nonce(nonce)
            .fee(opts.fee)
            .asset(asset)
            .build();

        if let Some(keypair) = &keypair {
            let network_identifier = match flag_network {
                Some(id) => id,
                None => self.node_network_identifier().await?,
            };
            sign_transaction(&mut transaction, &asset_schema, &network_identifier, keypair)?;
        }

        info!(
            module_id = transaction.module_id,
            asset_id = transaction.asset_id,
            nonce = transaction.nonce,
            signed = transaction.is_signed(),
            "transaction assembled"
        );
        Ok(AssembledTransaction {
            transaction,
            asset_schema,
        })
    }

    /// Reads the sender's next nonce from its account record.
    async fn account_nonce(&self, sender: &PublicKey) -> Result<u64, CreateError> {
        let accounts = self.sources.accounts.as_ref().ok_or(CreateError::MissingNonce)?;
        let encoded = accounts.account(&sender.address()).await?;
        let account_schema = self.sources.schemas.account_schema().await?;
        let account = codec::decode(account_schema, &encoded)?;
        let nonce = account
            .get("sequence")
            .and_then(|s| s.get("nonce"))
            .and_then(Value::as_u64)
            .ok_or(CreateError::MissingAccountNonce)?;
        debug!(nonce, "nonce read from account");
        Ok(nonce)
    }

    async fn node_network_identifier(&self) -> Result<NetworkIdentifier, CreateError> {
        let network = self
            .sources
            .network
            .as_ref()
            .ok_or(CreateError::MissingNetworkIdentifier)?;
        Ok(network.network_identifier().await?)
    }

    /// Decodes a hex-encoded transaction into its structured JSON form,
    /// with the transaction ID added under `id`.
    pub async fn decode(&self, encoded_hex: &str) -> Result<Json, CreateError> {
        let assembled = self.decode_assembled(encoded_hex).await?;
        let mut json = assembled.to_json()?;
        json["id"] = Json::String(hex::encode(assembled.id()?));
        Ok(json)
    }

    async fn decode_assembled(&self, encoded_hex: &str) -> Result<AssembledTransaction, CreateError> {
        let bytes = hex::decode(encoded_hex.trim()).map_err(|_| CreateError::InvalidEncoding)?;
        let (module_id, asset_id) = Transaction::decode_header(&bytes)?;
        let asset_schema = self
            .sources
            .schemas
            .resolve(module_id, asset_id)
            .await?
            .clone();
        let transaction = Transaction::decode(&asset_schema, &bytes)?;
        Ok(AssembledTransaction {
            transaction,
            asset_schema,
        })
    }

    /// Appends a signature to an encoded transaction.
    ///
    /// The network identifier comes from `network_identifier` or, failing
    /// that, from the node. The passphrase is prompted for when absent.
    /// Fails with [`CreateError::AlreadySigned`] if the passphrase's key
    /// already signed the transaction for that network.
    pub async fn sign(
        &self,
        encoded_hex: &str,
        network_identifier: Option<&str>,
        passphrase: Option<String>,
        prompter: &mut dyn Prompter,
    ) -> Result<AssembledTransaction, CreateError> {
        let flag_network = network_identifier
            .map(NetworkIdentifier::from_hex)
            .transpose()?;
        let mut assembled = self.decode_assembled(encoded_hex).await?;
        let network_identifier = match flag_network {
            Some(id) => id,
            None => self.node_network_identifier().await?,
        };
        let passphrase = match passphrase {
            Some(p) => p,
            None => prompter.passphrase("passphrase", true)?,
        };
        let keypair = Keypair::from_passphrase(&passphrase);
        if keypair.public_key() != assembled.transaction.sender_public_key {
            warn!(
                sender = %assembled.transaction.sender_public_key,
                "passphrase does not belong to the sender; the signature will not verify"
            );
        }
        let payload = assembled.transaction.signing_bytes(&assembled.asset_schema)?;
        let signer = keypair.public_key();
        if assembled
            .transaction
            .signatures
            .iter()
            .any(|sig| verify_detached(&signer, network_identifier.as_bytes(), &payload, sig))
        {
            return Err(CreateError::AlreadySigned { signer });
        }
        sign_transaction(
            &mut assembled.transaction,
            &assembled.asset_schema,
            &network_identifier,
            &keypair,
        )?;
        Ok(assembled)
    }
}
