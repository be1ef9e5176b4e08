//! Error handlers
//!
//! Maps domain errors onto FTP reply codes and reply lines.

use crate::error::types::{FtpServerError, NavigateError, StorageError};
use crate::protocol::responses::format_response;
use log::error;

/// Logs a startup failure.
pub fn handle_error(err: &FtpServerError) {
    error!("FTP Server Error: {}", err);
}

/// Reply line for a failed storage operation.
///
/// Containment violations and unresolvable trees share one permission
/// denied reply so the client learns nothing about what lies outside the jail.
pub fn storage_reply(err: &StorageError, client_path: &str) -> String {
    match err {
        StorageError::PermissionDenied(_) | StorageError::Unresolved => {
            format_response(550, "Permission denied")
        }
        StorageError::FileNotFound(_) => {
            format_response(550, &format!("{}: File not found", client_path))
        }
        StorageError::DirectoryNotFound(_) => {
            format_response(550, &format!("{}: Directory not found", client_path))
        }
        StorageError::NotADirectory(_) => {
            format_response(550, &format!("{}: Not a directory", client_path))
        }
        StorageError::NotAFile(_) => {
            format_response(550, &format!("{}: Not a plain file", client_path))
        }
        StorageError::FileAlreadyExists(_) => {
            format_response(550, &format!("{}: File already exists", client_path))
        }
        StorageError::IoError(_) => format_response(550, "Requested action not taken"),
    }
}

/// Reply line for a failed directory change.
pub fn navigate_reply(err: &NavigateError, client_path: &str) -> String {
    match err {
        NavigateError::PermissionDenied(_) => format_response(550, "Permission denied"),
        NavigateError::DirectoryNotFound(_) => {
            format_response(550, &format!("{}: Directory not found", client_path))
        }
        NavigateError::NotADirectory(_) => {
            format_response(550, &format!("{}: Not a directory", client_path))
        }
        NavigateError::InvalidPath(_) => format_response(550, "Invalid path"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_reply_hides_details() {
        let reply = storage_reply(&StorageError::PermissionDenied("/etc/passwd".into()), "x");
        assert_eq!(reply, "550 Permission denied\r\n");
        assert!(!reply.contains("/etc"));
    }
}
