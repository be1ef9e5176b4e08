//! Shared server context
//!
//! Read-only state every session sees: configuration, credentials and the
//! tree storage provider. Built once at startup and shared through `Arc`.

use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::config::{ServerConfig, StorageModeKind};
use crate::storage::{MountedTree, TreeProvider};

#[derive(Debug)]
pub struct ServerContext {
    config: ServerConfig,
    credentials: CredentialStore,
    tree: Option<Arc<dyn TreeProvider>>,
}

impl ServerContext {
    /// Builds the context from configuration. Tree mode mounts the configured
    /// tree URI at `tree_mount`.
    pub fn new(config: ServerConfig) -> Self {
        let tree: Option<Arc<dyn TreeProvider>> = match config.storage_mode {
            StorageModeKind::Direct => None,
            StorageModeKind::Tree => Some(Arc::new(MountedTree::new(
                config.tree_uri.clone(),
                config.tree_mount_path(),
            ))),
        };
        Self::with_tree(config, tree)
    }

    /// Builds the context with an explicit tree provider (`None` for direct mode).
    pub fn with_tree(config: ServerConfig, tree: Option<Arc<dyn TreeProvider>>) -> Self {
        let credentials = CredentialStore::new(config.users.clone());
        Self {
            config,
            credentials,
            tree,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn tree(&self) -> Option<&Arc<dyn TreeProvider>> {
        self.tree.as_ref()
    }
}
