//! Path resolution
//!
//! Turns a client-supplied parameter into a [`ResolvedLocator`]. Resolution
//! reads the session but never changes it, and the same inputs always give
//! the same locator. Containment is not checked here: every locator must go
//! through [`crate::storage::ChrootGuard`] before it is used.

use std::path::{Path, PathBuf};

use crate::client::Session;
use crate::storage::locator::{ResolveTarget, ResolvedLocator, SEP, join_one_separator};
use crate::storage::tree::StorageMode;

pub struct PathResolver;

impl PathResolver {
    /// Resolves `parameter` for `session` in the session's storage mode.
    pub fn resolve(session: &Session, parameter: &str, target: ResolveTarget) -> ResolvedLocator {
        match session.storage() {
            StorageMode::Direct => ResolvedLocator::Path(resolve_direct(
                session.chroot(),
                &session.current_real_path(),
                parameter,
            )),
            mode @ StorageMode::Tree { .. } => resolve_tree(
                mode.tree_root().as_deref(),
                &session.client_path(),
                parameter,
                target,
            ),
        }
    }
}

/// Direct mode: absolute parameters hang off the root, anything else off the
/// current working directory.
pub fn resolve_direct(root: &Path, cwd: &Path, parameter: &str) -> PathBuf {
    if parameter.starts_with(SEP) {
        return root.join(parameter.trim_start_matches(SEP));
    }
    if parameter.is_empty() {
        return cwd.to_path_buf();
    }
    cwd.join(parameter)
}

/// Tree mode: reconciles the tree's storage root, the client-visible working
/// path and the parameter into one locator.
///
/// `client_path` is the session's working path below the tree, empty at the
/// tree root. A missing or empty `tree_root` fails closed.
pub fn resolve_tree(
    tree_root: Option<&str>,
    client_path: &str,
    parameter: &str,
    target: ResolveTarget,
) -> ResolvedLocator {
    let tree_root = match tree_root {
        Some(root) if !root.is_empty() => root,
        _ => return ResolvedLocator::Unresolved,
    };

    let relative = !parameter.starts_with(SEP);
    let mut param = parameter.to_string();
    if target == ResolveTarget::Directory && relative {
        param.insert(0, SEP);
    }

    // Some clients jump around with the full storage path.
    if param.contains(tree_root) {
        return ResolvedLocator::Path(PathBuf::from(param));
    }

    let (mut supplied, entry) = match target {
        ResolveTarget::Directory => (param, None),
        ResolveTarget::Entry => match param.rfind(SEP) {
            Some(idx) => {
                let mut working = param[..idx].to_string();
                if !working.starts_with(SEP) {
                    working.insert(0, SEP);
                }
                (working, Some(param[idx + 1..].to_string()))
            }
            None => (String::new(), Some(param)),
        },
    };

    // A relative fragment hangs below the session path, unless it only
    // repeats the name the session already sits in.
    let double_vision =
        target == ResolveTarget::Directory && same_segment(client_path, parameter);
    if relative && !supplied.is_empty() && !client_path.is_empty() && !double_vision {
        supplied = join_one_separator(client_path, &supplied);
    }

    let merged = merge_working_paths(client_path, &supplied);

    let suffix = match entry {
        Some(name) if name.is_empty() || merged == name => merged,
        Some(name) => join_one_separator(&merged, &name),
        None => merged,
    };

    ResolvedLocator::Tree {
        root: tree_root.to_string(),
        suffix,
    }
}

/// Picks the working path between the session's and the parameter's.
/// The parameter's is more specific and wins when both are present.
fn merge_working_paths(session_path: &str, supplied: &str) -> String {
    match (session_path.is_empty(), supplied.is_empty()) {
        (true, true) => String::new(),
        (false, true) => session_path.to_string(),
        (true, false) => supplied.to_string(),
        (false, false) if session_path == supplied => session_path.to_string(),
        (false, false) => supplied.to_string(),
    }
}

fn same_segment(a: &str, b: &str) -> bool {
    let a = a.trim_matches(SEP);
    !a.is_empty() && a == b.trim_matches(SEP)
}
