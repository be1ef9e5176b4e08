//! Client management system
//!
//! Per-connection session state and the task that drives a control
//! connection from greeting to close.

pub mod handler;
pub mod state;

pub use handler::handle_client;
pub use state::Session;
