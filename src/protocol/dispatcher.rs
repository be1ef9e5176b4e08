//! Command dispatch
//!
//! Parses a raw line, looks the verb up in the registry, asks the
//! authentication gate, and only then builds and runs the handler. Every
//! path returns exactly one reply.

use log::{debug, info};
use std::sync::Arc;

use crate::auth::AuthGate;
use crate::client::Session;
use crate::error::ParseError;
use crate::protocol::commands::CommandResult;
use crate::protocol::parser::parse_line;
use crate::protocol::registry::CommandRegistry;
use crate::protocol::responses::{COMMAND_NOT_RECOGNIZED, COMMAND_PARSE_ERROR};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Handles one command line for `session`.
    pub fn dispatch(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let line = match parse_line(raw_line) {
            Ok(line) => line,
            Err(e) => {
                debug!("Unparseable line from {}: {}", session.peer(), e);
                let reply = match e {
                    ParseError::MalformedVerb(_) => COMMAND_PARSE_ERROR,
                    ParseError::EmptyLine | ParseError::EmptyVerb => COMMAND_NOT_RECOGNIZED,
                };
                return CommandResult::failure(e.to_string(), reply);
            }
        };

        let Some(descriptor) = self.registry.get(&line.verb) else {
            info!("Ignoring unrecognized FTP verb from {}: {}", session.peer(), line.verb);
            return CommandResult::failure("Unknown command", COMMAND_NOT_RECOGNIZED);
        };

        if let Err(denial) = AuthGate::permit(session.tier(), descriptor.canonical()) {
            info!(
                "Denied {} for {} ({:?}): {}",
                line.verb,
                session.peer(),
                session.tier(),
                denial
            );
            return CommandResult::failure(denial.to_string(), denial.reply());
        }

        info!("Received from {}: {}", session.peer(), line.verb);
        let handler = descriptor.instantiate();
        handler.run(session, raw_line)
    }
}
