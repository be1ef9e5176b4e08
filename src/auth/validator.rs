//! Authentication validator
//!
//! Implements FTP user authentication logic, including username and password
//! validation against the configured credential store.

use super::credentials::CredentialStore;
use crate::error::AuthError;

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// Validates that the given username exists in the credential store.
pub fn validate_user(
    username: &str,
    store: &CredentialStore,
    max_length: usize,
) -> Result<(), AuthError> {
    if username.contains(['@', '#', ',', '%']) || username.starts_with(char::is_numeric) {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }

    if !is_valid_input(username, max_length) {
        return Err(AuthError::MalformedInput("Invalid username format".into()));
    }

    if store.contains(username) {
        Ok(())
    } else {
        Err(AuthError::UserNotFound(username.to_string()))
    }
}

/// Validates that the provided password matches the stored password for the username.
pub fn validate_password(
    username: &str,
    password: &str,
    store: &CredentialStore,
    max_length: usize,
) -> Result<(), AuthError> {
    if !is_valid_input(password, max_length) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }

    match store.password(username) {
        Some(stored) if stored == password => Ok(()),
        Some(_) => Err(AuthError::InvalidPassword(username.to_string())),
        None => Err(AuthError::UserNotFound(username.to_string())),
    }
}
