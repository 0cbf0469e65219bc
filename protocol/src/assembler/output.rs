//! Rendering of assembled transactions.

use serde_json::{json, Value as Json};

use super::CreateError;
use crate::codec::Schema;
use crate::transaction::Transaction;

/// Caller-selected output shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `{"transaction": "<hex>"}`
    #[default]
    Hex,
    /// Field-by-field breakdown.
    Json,
}

/// A built, possibly signed transaction together with its asset schema.
#[derive(Debug, Clone)]
pub struct AssembledTransaction {
    pub transaction: Transaction,
    pub asset_schema: Schema,
}

impl AssembledTransaction {
    pub fn encode(&self) -> Result<Vec<u8>, CreateError> {
        Ok(self.transaction.encode(&self.asset_schema)?)
    }

    pub fn id(&self) -> Result<[u8; 32], CreateError> {
        Ok(self.transaction.id(&self.asset_schema)?)
    }

    pub fn to_json(&self) -> Result<Json, CreateError> {
        Ok(self.transaction.to_json(&self.asset_schema)?)
    }

    /// Renders the transaction. Identical inputs give identical output.
    pub fn render(&self, format: OutputFormat) -> Result<Json, CreateError> {
        match format {
            OutputFormat::Hex => Ok(json!({ "transaction": hex::encode(self.encode()?) })),
            OutputFormat::Json => self.to_json(),
        }
    }
}
