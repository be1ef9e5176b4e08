//! Tree-addressed storage
//!
//! In tree mode the jail is not reached through real paths chosen by the
//! server but through a provider-issued tree handle. The provider knows the
//! full storage path of the tree, which usually carries leading segments the
//! client never sees.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Opaque reference to the root of a storage tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeHandle(String);

impl TreeHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn uri(&self) -> &str {
        &self.0
    }
}

/// Storage backend addressed through tree handles.
pub trait TreeProvider: fmt::Debug + Send + Sync {
    /// Handle of the tree granted to this server, if one is available.
    fn root_handle(&self) -> Option<TreeHandle>;

    /// Full storage path of the tree root, including segments invisible to
    /// the client. `None` when the handle no longer resolves.
    fn storage_root(&self, handle: &TreeHandle) -> Option<String>;

    /// Concrete location of `relative` (a `/`-separated path below the tree
    /// root) for I/O. `None` when the handle no longer resolves.
    fn resolve_entry(&self, handle: &TreeHandle, relative: &str) -> Option<PathBuf>;
}

/// How a session reaches its storage. Fixed when the session is created.
#[derive(Debug, Clone)]
pub enum StorageMode {
    /// Real paths below the configured root.
    Direct,
    /// Paths reconciled against a provider-mediated tree.
    Tree {
        provider: Arc<dyn TreeProvider>,
        handle: Option<TreeHandle>,
    },
}

impl StorageMode {
    /// Storage path of the tree root, or `None` in direct mode and whenever
    /// the handle is missing or resolves to nothing.
    pub fn tree_root(&self) -> Option<String> {
        match self {
            StorageMode::Direct => None,
            StorageMode::Tree { provider, handle } => handle
                .as_ref()
                .and_then(|h| provider.storage_root(h))
                .filter(|root| !root.is_empty()),
        }
    }
}

/// A tree URI mounted at a local directory.
#[derive(Debug, Clone)]
pub struct MountedTree {
    handle: TreeHandle,
    mount: PathBuf,
}

impl MountedTree {
    pub fn new(uri: impl Into<String>, mount: impl Into<PathBuf>) -> Self {
        Self {
            handle: TreeHandle::new(uri),
            mount: mount.into(),
        }
    }
}

impl TreeProvider for MountedTree {
    fn root_handle(&self) -> Option<TreeHandle> {
        if self.handle.uri().is_empty() {
            return None;
        }
        Some(self.handle.clone())
    }

    fn storage_root(&self, handle: &TreeHandle) -> Option<String> {
        if handle != &self.handle {
            return None;
        }
        self.mount.to_str().map(str::to_string)
    }

    fn resolve_entry(&self, handle: &TreeHandle, relative: &str) -> Option<PathBuf> {
        if handle != &self.handle {
            return None;
        }
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            Some(self.mount.clone())
        } else {
            Some(self.mount.join(relative))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mounted_tree_resolves_own_handle_only() {
        let tree = MountedTree::new("content://tree/primary", "/mnt/primary");
        let handle = tree.root_handle().unwrap();

        assert_eq!(tree.storage_root(&handle).as_deref(), Some("/mnt/primary"));
        assert_eq!(
            tree.resolve_entry(&handle, "/docs/a.txt"),
            Some(PathBuf::from("/mnt/primary/docs/a.txt"))
        );
        assert_eq!(tree.resolve_entry(&handle, "/"), Some(PathBuf::from("/mnt/primary")));

        let stranger = TreeHandle::new("content://tree/other");
        assert_eq!(tree.storage_root(&stranger), None);
        assert_eq!(tree.resolve_entry(&stranger, "a"), None);
    }

    #[test]
    fn test_tree_root_missing_handle() {
        let mode = StorageMode::Tree {
            provider: Arc::new(MountedTree::new("content://tree/primary", "/mnt/primary")),
            handle: None,
        };
        assert_eq!(mode.tree_root(), None);
        assert_eq!(StorageMode::Direct.tree_root(), None);
    }
}
