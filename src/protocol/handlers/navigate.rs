//! Working directory commands: CWD, CDUP, PWD.

use super::required_parameter;
use crate::client::Session;
use crate::error::handlers::navigate_reply;
use crate::navigate::change_directory;
use crate::protocol::commands::CommandResult;
use crate::protocol::registry::CommandHandler;
use crate::protocol::responses::{FILE_ACTION_OK, PATH_CREATED, format_response};

fn cwd(session: &mut Session, target: &str) -> CommandResult {
    match change_directory(session, target) {
        Ok(path) => CommandResult::success(format_response(
            FILE_ACTION_OK,
            &format!("CWD successful. \"{}\" is current directory", path),
        )),
        Err(e) => CommandResult::failure(e.to_string(), navigate_reply(&e, target)),
    }
}

/// CWD: changes the working directory.
#[derive(Debug, Default)]
pub struct CmdCwd;

impl CommandHandler for CmdCwd {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        match required_parameter(raw_line) {
            Ok(target) => cwd(session, target),
            Err(reply) => reply,
        }
    }
}

/// CDUP and XCUP: moves to the parent directory.
#[derive(Debug, Default)]
pub struct CmdCdup;

impl CommandHandler for CmdCdup {
    fn run(&self, session: &mut Session, _raw_line: &str) -> CommandResult {
        cwd(session, "..")
    }
}

/// PWD and XPWD: reports the working directory.
#[derive(Debug, Default)]
pub struct CmdPwd;

impl CommandHandler for CmdPwd {
    fn run(&self, session: &mut Session, _raw_line: &str) -> CommandResult {
        CommandResult::success(format_response(
            PATH_CREATED,
            &format!("\"{}\" is current directory", session.current_virtual_path()),
        ))
    }
}
