//! Module `command`
//!
//! Result types shared by the dispatcher and every command handler.

/// Represents the outcome status of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Full result of handling one command line.
///
/// `message` is the complete reply sequence for the line, CRLF-terminated.
/// Every dispatch produces exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: String,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: message.into(),
        }
    }

    pub fn failure(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure(reason.into()),
            message: message.into(),
        }
    }

    pub fn close(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            message: message.into(),
        }
    }

    /// Three-digit code of the final reply line.
    pub fn code(&self) -> Option<u16> {
        let last = self.message.trim_end().lines().last()?;
        last.get(..3)?.parse().ok()
    }
}
