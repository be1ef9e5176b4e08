//! FTP Protocol implementation
//!
//! Line parsing, the command registry, dispatch through the authentication
//! gate, and the per-verb handlers with their replies.

pub mod commands;
pub mod dispatcher;
pub mod handlers;
pub mod parser;
pub mod registry;
pub mod responses;

pub use commands::{CommandResult, CommandStatus};
pub use dispatcher::Dispatcher;
pub use handlers::standard_registry;
pub use parser::{CommandLine, parse_line};
pub use registry::{CommandDescriptor, CommandHandler, CommandRegistry, HandlerFactory};
