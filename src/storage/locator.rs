//! Resolved storage locators

use std::path::PathBuf;

/// Path separator used on the wire and inside tree paths.
pub const SEP: char = '/';

/// What a command points its parameter at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTarget {
    /// The parameter names a directory (CWD, LIST, MKD, RMD, ...).
    Directory,
    /// The parameter names a single entry inside a directory (RETR, STOR, RNTO, ...).
    Entry,
}

/// Output of path resolution. Built per command and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocator {
    /// A concrete filesystem path.
    Path(PathBuf),
    /// Storage root of a tree plus the client-side suffix below it.
    Tree { root: String, suffix: String },
    /// Resolution failed. Never satisfies containment.
    Unresolved,
}

impl ResolvedLocator {
    /// The storage path to canonicalize, or `None` for an unresolved locator.
    pub fn storage_path(&self) -> Option<PathBuf> {
        match self {
            ResolvedLocator::Path(path) if !path.as_os_str().is_empty() => Some(path.clone()),
            ResolvedLocator::Path(_) => None,
            ResolvedLocator::Tree { root, suffix } if !root.is_empty() => {
                Some(PathBuf::from(join_one_separator(root, suffix)))
            }
            ResolvedLocator::Tree { .. } | ResolvedLocator::Unresolved => None,
        }
    }
}

/// Joins two path fragments with exactly one separator at the boundary.
pub fn join_one_separator(left: &str, right: &str) -> String {
    let right = right.trim_start_matches(SEP);
    if right.is_empty() {
        return left.to_string();
    }
    format!("{}{}{}", left.trim_end_matches(SEP), SEP, right)
}
