//! Storage access
//!
//! Path resolution, chroot enforcement and the file operations built on them.
//! Handlers reach storage only through [`locate`], which runs the resolver
//! and the guard in that order and maps the result onto the backend.

pub mod chroot;
pub mod locator;
pub mod operations;
pub mod resolver;
pub mod tree;

use log::warn;
use std::fs;
use std::path::PathBuf;

use crate::client::Session;
use crate::error::StorageError;

pub use chroot::{ChrootGuard, ChrootViolation, GuardedPath};
pub use locator::{ResolveTarget, ResolvedLocator};
pub use resolver::PathResolver;
pub use tree::{MountedTree, StorageMode, TreeHandle, TreeProvider};

/// A parameter that resolved inside the jail.
#[derive(Debug, Clone)]
pub struct StoragePath {
    /// Location to perform I/O on. A symlink in the jail stays the link.
    pub real: PathBuf,
    /// Path as the client sees it, always `/`-rooted.
    pub client_path: String,
}

/// Resolves `parameter` for `session` and checks it against the jail.
///
/// Violations come back as [`StorageError::PermissionDenied`]; a tree that no
/// longer resolves comes back as [`StorageError::Unresolved`].
pub fn locate(
    session: &Session,
    parameter: &str,
    target: ResolveTarget,
) -> Result<StoragePath, StorageError> {
    let locator = PathResolver::resolve(session, parameter, target);

    let guarded = ChrootGuard::validate(&locator, session.chroot()).map_err(|violation| {
        warn!(
            "Refusing {:?} for client {}: {}",
            parameter,
            session.peer(),
            violation
        );
        match violation {
            ChrootViolation::Unresolved => StorageError::Unresolved,
            other => StorageError::PermissionDenied(other.to_string()),
        }
    })?;

    match session.storage() {
        StorageMode::Direct => Ok(StoragePath {
            client_path: guarded.client_path(),
            real: guarded.entry().to_path_buf(),
        }),
        StorageMode::Tree { provider, handle } => {
            let handle = handle.as_ref().ok_or(StorageError::Unresolved)?;
            let tree_root = provider
                .storage_root(handle)
                .filter(|root| !root.is_empty())
                .ok_or(StorageError::Unresolved)?;
            let tree_root = fs::canonicalize(tree_root).map_err(|_| StorageError::Unresolved)?;
            // Inside the jail but outside the tree is still out of reach.
            let client_path = guarded.client_path_from(&tree_root).ok_or_else(|| {
                StorageError::PermissionDenied(guarded.entry().display().to_string())
            })?;
            let real = provider
                .resolve_entry(handle, &client_path)
                .ok_or(StorageError::Unresolved)?;
            Ok(StoragePath { real, client_path })
        }
    }
}
