//! Data channel collaborator
//!
//! Byte streaming over FTP data connections lives outside this crate. The
//! connection layer installs a [`DataChannel`] on the session and transfer
//! commands push or pull whole payloads through it.

use std::io;
use std::sync::{Arc, Mutex};

/// One established data connection.
pub trait DataChannel: Send {
    /// Sends `data` to the client and closes the connection.
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Receives everything the client sends until it closes the connection.
    fn receive(&mut self) -> io::Result<Vec<u8>>;
}

/// In-memory data channel.
///
/// Uploads are served from `incoming`; downloads are appended to a buffer
/// shared with [`MemoryChannel::sent`] so it can be read after the session
/// has consumed the channel.
#[derive(Debug, Default, Clone)]
pub struct MemoryChannel {
    incoming: Vec<u8>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose client will upload `data`.
    pub fn with_upload(data: impl Into<Vec<u8>>) -> Self {
        Self {
            incoming: data.into(),
            sent: Arc::default(),
        }
    }

    /// Handle on everything sent through this channel.
    pub fn sent(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.sent)
    }
}

impl DataChannel for MemoryChannel {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| io::Error::other("data channel buffer poisoned"))?;
        sent.extend_from_slice(data);
        Ok(())
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.incoming))
    }
}
