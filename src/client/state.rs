//! Module `client`
//!
//! Defines the `Session` struct: the per-connection state of an FTP client,
//! including authentication tier, storage mode, jail root and working path.
//! A session is owned by the task driving its connection and is only ever
//! lent to the dispatcher, one command at a time.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::AuthTier;
use crate::server::ServerContext;
use crate::storage::{StoragePath, StorageMode};
use crate::transfer::{DataChannel, TransferType};

/// Represents the state of a connected FTP client.
pub struct Session {
    context: Arc<ServerContext>,
    client_addr: Option<SocketAddr>,
    username: Option<String>,
    is_user_valid: bool,
    tier: AuthTier,
    storage: StorageMode,
    chroot: PathBuf,
    current_virtual_path: String,
    rename_from: Option<StoragePath>,
    restart_offset: u64,
    hash_range: Option<(u64, u64)>,
    transfer_type: TransferType,
    data_port: Option<SocketAddr>,
    data_channel: Option<Box<dyn DataChannel>>,
    utf8: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client_addr", &self.client_addr)
            .field("username", &self.username)
            .field("tier", &self.tier)
            .field("storage", &self.storage)
            .field("chroot", &self.chroot)
            .field("current_virtual_path", &self.current_virtual_path)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session for a freshly accepted connection.
    ///
    /// Storage mode and jail root are taken from the server context here and
    /// never change afterwards.
    pub fn new(context: Arc<ServerContext>, client_addr: Option<SocketAddr>) -> Self {
        let storage = match context.tree() {
            Some(provider) => StorageMode::Tree {
                handle: provider.root_handle(),
                provider: Arc::clone(provider),
            },
            None => StorageMode::Direct,
        };
        let chroot = context.config().server_root_path();

        Self {
            context,
            client_addr,
            username: None,
            is_user_valid: false,
            tier: AuthTier::Unauthenticated,
            storage,
            chroot,
            current_virtual_path: "/".to_string(),
            rename_from: None,
            restart_offset: 0,
            hash_range: None,
            transfer_type: TransferType::Ascii,
            data_port: None,
            data_channel: None,
            utf8: false,
        }
    }

    /// Drops login state and every per-transfer setting.
    pub fn logout(&mut self) {
        self.username = None;
        self.is_user_valid = false;
        self.tier = AuthTier::Unauthenticated;
        self.current_virtual_path = "/".to_string();
        self.rename_from = None;
        self.restart_offset = 0;
        self.hash_range = None;
        self.data_port = None;
        self.data_channel = None;
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    pub fn tier(&self) -> AuthTier {
        self.tier
    }

    pub fn is_user_valid(&self) -> bool {
        self.is_user_valid
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Peer address for log lines.
    pub fn peer(&self) -> String {
        self.client_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn storage(&self) -> &StorageMode {
        &self.storage
    }

    /// Configured jail root.
    pub fn chroot(&self) -> &Path {
        &self.chroot
    }

    /// Client-visible working directory, always `/`-rooted.
    pub fn current_virtual_path(&self) -> &str {
        &self.current_virtual_path
    }

    /// Working directory as a real path below the jail root (direct mode).
    pub fn current_real_path(&self) -> PathBuf {
        let relative = self.current_virtual_path.trim_start_matches('/');
        if relative.is_empty() {
            self.chroot.clone()
        } else {
            self.chroot.join(relative)
        }
    }

    /// Working directory below the tree root, empty at the root (tree mode).
    pub fn client_path(&self) -> String {
        if self.current_virtual_path == "/" {
            String::new()
        } else {
            self.current_virtual_path.trim_end_matches('/').to_string()
        }
    }

    pub fn rename_from(&self) -> Option<&StoragePath> {
        self.rename_from.as_ref()
    }

    pub fn restart_offset(&self) -> u64 {
        self.restart_offset
    }

    pub fn hash_range(&self) -> Option<(u64, u64)> {
        self.hash_range
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn data_port(&self) -> Option<&SocketAddr> {
        self.data_port.as_ref()
    }

    pub fn utf8(&self) -> bool {
        self.utf8
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_user_valid(&mut self, valid: bool) {
        self.is_user_valid = valid;
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn set_tier(&mut self, tier: AuthTier) {
        self.tier = tier;
    }

    pub fn set_current_virtual_path(&mut self, path: String) {
        self.current_virtual_path = path;
    }

    pub fn set_rename_from(&mut self, from: Option<StoragePath>) {
        self.rename_from = from;
    }

    pub fn take_rename_from(&mut self) -> Option<StoragePath> {
        self.rename_from.take()
    }

    pub fn set_restart_offset(&mut self, offset: u64) {
        self.restart_offset = offset;
    }

    pub fn set_hash_range(&mut self, range: Option<(u64, u64)>) {
        self.hash_range = range;
    }

    pub fn set_transfer_type(&mut self, transfer_type: TransferType) {
        self.transfer_type = transfer_type;
    }

    pub fn set_data_port(&mut self, addr: Option<SocketAddr>) {
        self.data_port = addr;
    }

    /// Installs the data connection the next transfer will use.
    pub fn set_data_channel(&mut self, channel: Box<dyn DataChannel>) {
        self.data_channel = Some(channel);
    }

    /// Hands the data connection to a transfer; it is used once.
    pub fn take_data_channel(&mut self) -> Option<Box<dyn DataChannel>> {
        self.data_channel.take()
    }

    pub fn set_utf8(&mut self, on: bool) {
        self.utf8 = on;
    }
}
