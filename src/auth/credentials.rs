//! Credential storage
//!
//! Holds the username to password table loaded from configuration.

use std::collections::HashMap;

/// Usernames that log in with guest rights when anonymous access is enabled.
pub const ANONYMOUS_USERS: [&str; 2] = ["anonymous", "ftp"];

/// Read-only credential store shared by every session.
///
/// Usernames match without regard to ASCII case. The configuration loader
/// lowercases table keys, so the store keeps and looks up lowercase names.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(users: HashMap<String, String>) -> Self {
        let users = users
            .into_iter()
            .map(|(name, password)| (name.to_ascii_lowercase(), password))
            .collect();
        Self { users }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(&username.to_ascii_lowercase())
    }

    pub fn password(&self, username: &str) -> Option<&str> {
        self.users
            .get(&username.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Whether the username asks for a guest login.
pub fn is_anonymous_name(username: &str) -> bool {
    ANONYMOUS_USERS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(username))
}
