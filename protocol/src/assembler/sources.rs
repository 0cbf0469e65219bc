//! Data sources selected once per invocation.

use std::path::Path;
use std::sync::Arc;

use crate::network::IpcClient;
use crate::schema::SchemaRegistry;
use crate::sources::{AccountStateSource, NetworkIdentifierSource};

/// The sources an assembly run draws from.
///
/// Offline there is no node: the account and network slots are empty and
/// the values must come from flags, which [`super::validate`] enforces
/// before anything runs.
pub struct Sources {
    pub schemas: SchemaRegistry,
    pub accounts: Option<Arc<dyn AccountStateSource>>,
    pub network: Option<Arc<dyn NetworkIdentifierSource>>,
}

impl Sources {
    /// Embedded schemas, no node.
    pub fn offline() -> Self {
        Self {
            schemas: SchemaRegistry::offline(),
            accounts: None,
            network: None,
        }
    }

    /// Every query goes to the node behind `client`.
    pub fn online(client: Arc<IpcClient>) -> Self {
        Self {
            schemas: SchemaRegistry::new(client.clone()),
            accounts: Some(client.clone()),
            network: Some(client),
        }
    }

    /// Online sources for the node whose data directory is `data_path`.
    pub fn for_data_path(data_path: impl AsRef<Path>) -> Self {
        Self::online(Arc::new(IpcClient::new(data_path)))
    }
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources")
            .field("schemas", &self.schemas)
            .field("accounts", &self.accounts.is_some())
            .field("network", &self.network.is_some())
            .finish()
    }
}
