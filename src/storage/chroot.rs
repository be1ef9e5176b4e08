//! Chroot enforcement
//!
//! Single containment check shared by both resolution modes. The guard does
//! not trust the resolver: it canonicalizes whatever locator it is handed and
//! compares it component-wise with the canonical jail root.

use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::storage::locator::{ResolvedLocator, SEP};

/// Why a locator was refused.
#[derive(Debug, Error)]
pub enum ChrootViolation {
    #[error("locator could not be resolved")]
    Unresolved,
    #[error("cannot canonicalize {path}: {source}")]
    Canonicalize { path: PathBuf, source: io::Error },
    #[error("{path} is outside {root}")]
    Outside { path: PathBuf, root: PathBuf },
}

/// A locator that passed containment.
///
/// `entry` has its parent canonicalized and the last segment kept as
/// written, so a symlink inside the jail is the link itself, not its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedPath {
    canonical: PathBuf,
    entry: PathBuf,
    root: PathBuf,
}

impl GuardedPath {
    /// The directory entry the locator names. Operations act on this path.
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// The entry below `base`, written as a client path (`/`, `/a/b`).
    pub fn client_path_from(&self, base: &Path) -> Option<String> {
        // A base reached through a symlink is matched by where it leads.
        let relative = match self.entry.strip_prefix(base) {
            Ok(relative) => relative,
            Err(_) if self.canonical == base => Path::new(""),
            Err(_) => return None,
        };
        let mut client = String::new();
        for component in relative.components() {
            client.push(SEP);
            client.push_str(&component.as_os_str().to_string_lossy());
        }
        if client.is_empty() {
            client.push(SEP);
        }
        Some(client)
    }

    /// The entry below the jail root, written as a client path.
    pub fn client_path(&self) -> String {
        self.client_path_from(&self.root)
            .unwrap_or_else(|| SEP.to_string())
    }
}

pub struct ChrootGuard;

impl ChrootGuard {
    /// Checks that `locator` lies inside `root` after canonicalizing both.
    ///
    /// Every failure is a violation: an unresolved locator, an I/O error or a
    /// dangling symlink met during canonicalization, or a path that is
    /// neither the root nor below it. Both the final target and the entry
    /// that names it must be inside.
    pub fn validate(locator: &ResolvedLocator, root: &Path) -> Result<GuardedPath, ChrootViolation> {
        let path = locator.storage_path().ok_or(ChrootViolation::Unresolved)?;

        let canonical_root = fs::canonicalize(root).map_err(|source| {
            info!("Path canonicalization problem for root {}: {}", root.display(), source);
            ChrootViolation::Canonicalize {
                path: root.to_path_buf(),
                source,
            }
        })?;

        let canonical = canonicalize_lenient(&path).map_err(|source| {
            info!("Path canonicalization problem for {}: {}", path.display(), source);
            ChrootViolation::Canonicalize {
                path: path.clone(),
                source,
            }
        })?;
        Self::contain(&canonical, &canonical_root)?;

        let entry = entry_path(&path).map_err(|source| ChrootViolation::Canonicalize {
            path: path.clone(),
            source,
        })?;
        // A root configured through a symlink still names the root.
        let entry = if canonical == canonical_root && !entry.starts_with(&canonical_root) {
            canonical_root.clone()
        } else {
            entry
        };
        Self::contain(&entry, &canonical_root)?;

        Ok(GuardedPath {
            canonical,
            entry,
            root: canonical_root,
        })
    }

    fn contain(path: &Path, canonical_root: &Path) -> Result<(), ChrootViolation> {
        // Path::starts_with compares whole components, so /root2 is not below /root.
        if path.starts_with(canonical_root) {
            return Ok(());
        }
        warn!(
            "Path violated folder restriction, denying: path {} chroot {}",
            path.display(),
            canonical_root.display()
        );
        Err(ChrootViolation::Outside {
            path: path.to_path_buf(),
            root: canonical_root.to_path_buf(),
        })
    }
}

/// The parent of `path` canonicalized, joined with the last segment as written.
fn entry_path(path: &Path) -> io::Result<PathBuf> {
    match (path.parent(), path.components().next_back()) {
        (Some(parent), Some(Component::Normal(name))) if !parent.as_os_str().is_empty() => {
            Ok(canonicalize_lenient(parent)?.join(name))
        }
        _ => canonicalize_lenient(path),
    }
}

/// Canonicalizes a path whose trailing segments may not exist yet.
///
/// Segments are applied one at a time: `.` is dropped, `..` pops, and every
/// existing symlink is resolved where it is met. Missing segments are kept
/// as written. A dangling symlink is an error.
pub fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                match fs::symlink_metadata(&resolved) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        resolved = fs::canonicalize(&resolved)?;
                    }
                    Ok(_) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(resolved)
}
