//! Navigation operations implementation

use log::info;

use crate::client::Session;
use crate::error::NavigateError;
use crate::storage::operations::require_directory;
use crate::storage::{ResolveTarget, locate};

/// Changes the working directory of `session` to `target_path`.
///
/// The target goes through the resolver and the chroot guard; the new
/// working path is taken from the guarded location, so `..` never leaves
/// the session pointing somewhere it cannot reach.
/// Returns the new client-visible path.
pub fn change_directory(session: &mut Session, target_path: &str) -> Result<String, NavigateError> {
    if target_path.is_empty() {
        return Err(NavigateError::InvalidPath("Empty path provided".into()));
    }

    let location = locate(session, target_path, ResolveTarget::Directory)?;
    require_directory(&location.real, &location.client_path)?;

    info!(
        "Client {} changed directory to {} (real: {})",
        session.peer(),
        location.client_path,
        location.real.display()
    );
    session.set_current_virtual_path(location.client_path.clone());

    Ok(location.client_path)
}
