//! Server core functionality
//!
//! The accept loop and the context shared by every session.

pub mod context;
pub mod core;

pub use context::ServerContext;
pub use core::Server;
