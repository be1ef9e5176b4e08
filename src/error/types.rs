//! Error types
//!
//! Defines domain-specific error types for each module of the FTP server.

use std::io;
use thiserror::Error;

/// Authentication module errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),
    #[error("Invalid password for user: {0}")]
    InvalidPassword(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

/// Command registry errors, raised while the registry is built at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Verb registered twice: {0}")]
    DuplicateVerb(String),
    #[error("Empty verb cannot be registered")]
    EmptyVerb,
    #[error("Synonym {alias} points at unregistered verb {target}")]
    UnknownTarget { alias: String, target: String },
}

/// Command line parse errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty command line")]
    EmptyLine,
    #[error("Empty command verb")]
    EmptyVerb,
    #[error("Malformed command verb: {0}")]
    MalformedVerb(String),
}

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("File already exists: {0}")]
    FileAlreadyExists(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Not a file: {0}")]
    NotAFile(String),
    #[error("Storage tree could not be resolved")]
    Unresolved,
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Navigate module errors
#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl From<StorageError> for NavigateError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::DirectoryNotFound(p) | StorageError::FileNotFound(p) => {
                NavigateError::DirectoryNotFound(p)
            }
            StorageError::NotADirectory(p) | StorageError::NotAFile(p) => {
                NavigateError::NotADirectory(p)
            }
            StorageError::PermissionDenied(p) => NavigateError::PermissionDenied(p),
            StorageError::Unresolved => NavigateError::PermissionDenied("unresolved".into()),
            other => NavigateError::InvalidPath(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Startup failure reported by the binary
#[derive(Debug, Error)]
pub enum FtpServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}
