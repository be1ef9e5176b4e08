//! Error handling
//!
//! Domain error types and their mapping onto FTP replies.

pub mod handlers;
pub mod types;

pub use types::*;
