//! # Schema Registry
//!
//! Maps a `(moduleID, assetID)` pair to the schema of that transaction's
//! asset. The full set comes from exactly one [`SchemaSource`] and is fetched
//! at most once per registry: offline that source is the embedded set in
//! [`builtin`], online it is the node's `app:getSchema` response.

pub mod builtin;

use async_trait::async_trait;
use serde_json::{json, Value as Json};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::codec::{CodecError, Schema};
use crate::sources::{SchemaSource, SourceError};

pub use builtin::builtin_schema_set;

/// Errors raised while resolving schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Transaction moduleID:{module_id} with assetID:{asset_id} is not registered in the application")]
    UnknownAsset { module_id: u32, asset_id: u32 },

    #[error("malformed schema set: {0}")]
    Malformed(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// The schema of one asset type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSchema {
    pub module_id: u32,
    pub asset_id: u32,
    pub schema: Schema,
}

/// Every schema an application publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSet {
    pub transaction: Schema,
    pub account: Schema,
    pub assets: Vec<AssetSchema>,
}

impl SchemaSet {
    pub fn asset(&self, module_id: u32, asset_id: u32) -> Option<&Schema> {
        self.assets
            .iter()
            .find(|a| a.module_id == module_id && a.asset_id == asset_id)
            .map(|a| &a.schema)
    }

    /// Parses the `app:getSchema` payload.
    pub fn from_json(json: &Json) -> Result<Self, SchemaError> {
        let section = |key: &str| {
            json.get(key)
                .ok_or_else(|| SchemaError::Malformed(format!("missing {key}")))
        };
        let transaction = Schema::from_json(section("transaction")?)?;
        let account = Schema::from_json(section("account")?)?;

        let entries = section("transactionsAssets")?
            .as_array()
            .ok_or_else(|| SchemaError::Malformed("transactionsAssets is not an array".into()))?;
        let mut assets = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = |key: &str| {
                entry
                    .get(key)
                    .and_then(Json::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| SchemaError::Malformed(format!("asset entry without {key}")))
            };
            let schema = entry
                .get("schema")
                .ok_or_else(|| SchemaError::Malformed("asset entry without schema".into()))?;
            assets.push(AssetSchema {
                module_id: id("moduleID")?,
                asset_id: id("assetID")?,
                schema: Schema::from_json(schema)?,
            });
        }

        Ok(Self {
            transaction,
            account,
            assets,
        })
    }

    /// Renders the set in the `app:getSchema` payload shape.
    pub fn to_json(&self) -> Json {
        let assets: Vec<Json> = self
            .assets
            .iter()
            .map(|a| {
                json!({
                    "moduleID": a.module_id,
                    "assetID": a.asset_id,
                    "schema": a.schema.to_json(),
                })
            })
            .collect();
        json!({
            "transaction": self.transaction.to_json(),
            "account": self.account.to_json(),
            "transactionsAssets": assets,
        })
    }
}

/// Serves the embedded schema set.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSchemaSource;

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn schema_set(&self) -> Result<SchemaSet, SourceError> {
        Ok(builtin_schema_set())
    }
}

/// Caching front for a [`SchemaSource`].
pub struct SchemaRegistry {
    source: Arc<dyn SchemaSource>,
    cache: OnceCell<SchemaSet>,
}

impl SchemaRegistry {
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
        }
    }

    /// Registry over the embedded set.
    pub fn offline() -> Self {
        Self::new(Arc::new(StaticSchemaSource))
    }

    /// The full schema set, fetched on first use.
    pub async fn schema_set(&self) -> Result<&SchemaSet, SchemaError> {
        self.cache
            .get_or_try_init(|| async {
                let set = self.source.schema_set().await?;
                tracing::debug!(assets = set.assets.len(), "schema set loaded");
                let embedded = builtin::transaction_schema();
                if set.transaction.fields() != embedded.fields() {
                    tracing::warn!(
                        schema = %set.transaction.id,
                        "transaction schema differs from the embedded envelope; encoding with the embedded one"
                    );
                }
                Ok::<_, SchemaError>(set)
            })
            .await
    }

    /// Resolves the asset schema for `(module_id, asset_id)`.
    pub async fn resolve(&self, module_id: u32, asset_id: u32) -> Result<&Schema, SchemaError> {
        self.schema_set()
            .await?
            .asset(module_id, asset_id)
            .ok_or(SchemaError::UnknownAsset {
                module_id,
                asset_id,
            })
    }

    pub async fn account_schema(&self) -> Result<&Schema, SchemaError> {
        Ok(&self.schema_set().await?.account)
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("loaded", &self.cache.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FieldKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SchemaSource for CountingSource {
        async fn schema_set(&self) -> Result<SchemaSet, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(builtin_schema_set())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SchemaSource for FailingSource {
        async fn schema_set(&self) -> Result<SchemaSet, SourceError> {
            Err(SourceError::Rpc {
                code: -32601,
                message: "method not found".into(),
            })
        }
    }

    #[tokio::test]
    async fn resolves_token_transfer() {
        let registry = SchemaRegistry::offline();
        let schema = registry.resolve(2, 0).await.unwrap();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["amount", "recipientAddress", "data"]);
    }

    #[tokio::test]
    async fn resolves_vote_as_repeated_group() {
        let registry = SchemaRegistry::offline();
        let schema = registry.resolve(5, 1).await.unwrap();
        assert!(matches!(schema.fields()[0].kind, FieldKind::ObjectArray(_)));
    }

    #[tokio::test]
    async fn unknown_pair_is_reported_with_both_ids() {
        let registry = SchemaRegistry::offline();
        let err = registry.resolve(99999, 0).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Transaction moduleID:99999 with assetID:0 is not registered in the application"
        );
    }

    #[tokio::test]
    async fn source_is_consulted_once() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let registry = SchemaRegistry::new(source.clone());
        registry.resolve(2, 0).await.unwrap();
        registry.resolve(5, 1).await.unwrap();
        registry.account_schema().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn source_failure_propagates() {
        let registry = SchemaRegistry::new(Arc::new(FailingSource));
        let err = registry.resolve(2, 0).await.unwrap_err();
        assert!(matches!(err, SchemaError::Source(SourceError::Rpc { .. })));
    }

    #[test]
    fn schema_set_json_round_trip() {
        let set = builtin_schema_set();
        let parsed = SchemaSet::from_json(&set.to_json()).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn rejects_payload_without_assets() {
        let set = builtin_schema_set();
        let mut json = set.to_json();
        json.as_object_mut().unwrap().remove("transactionsAssets");
        assert!(matches!(
            SchemaSet::from_json(&json),
            Err(SchemaError::Malformed(_))
        ));
    }
}
