//! Informational and option commands: SYST, NOOP, FEAT, OPTS, SITE.

use super::required_parameter;
use crate::client::Session;
use crate::protocol::commands::CommandResult;
use crate::protocol::registry::CommandHandler;
use crate::protocol::responses::{
    NOT_IMPLEMENTED_FOR_PARAMETER, OK, PARAMETER_ERROR, SYSTEM_STATUS, SYSTEM_TYPE,
    format_multiline, format_response,
};

/// Extensions advertised by FEAT.
pub const FEATURES: &[&str] = &[
    "UTF8",
    "SIZE",
    "MDTM",
    "MFMT",
    "REST STREAM",
    "MLST type*;size*;modify*;",
    "HASH SHA-256*",
    "RANG STREAM",
];

#[derive(Debug, Default)]
pub struct CmdSyst;

impl CommandHandler for CmdSyst {
    fn run(&self, _session: &mut Session, _raw_line: &str) -> CommandResult {
        CommandResult::success(format_response(SYSTEM_TYPE, "UNIX Type: L8"))
    }
}

#[derive(Debug, Default)]
pub struct CmdNoop;

impl CommandHandler for CmdNoop {
    fn run(&self, _session: &mut Session, _raw_line: &str) -> CommandResult {
        CommandResult::success(format_response(OK, "NOOP ok"))
    }
}

/// FEAT: lists supported extensions.
#[derive(Debug, Default)]
pub struct CmdFeat;

impl CommandHandler for CmdFeat {
    fn run(&self, _session: &mut Session, _raw_line: &str) -> CommandResult {
        let body: Vec<String> = FEATURES.iter().map(|f| f.to_string()).collect();
        CommandResult::success(format_multiline(SYSTEM_STATUS, "Features:", &body, "End"))
    }
}

/// OPTS: only `UTF8 ON` and `UTF8 OFF` are understood.
#[derive(Debug, Default)]
pub struct CmdOpts;

impl CommandHandler for CmdOpts {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = match required_parameter(raw_line) {
            Ok(param) => param.trim().to_ascii_uppercase(),
            Err(reply) => return reply,
        };
        let words: Vec<&str> = param.split_whitespace().collect();
        match words.as_slice() {
            ["UTF8", "ON"] | ["UTF8"] => {
                session.set_utf8(true);
                CommandResult::success(format_response(OK, "Always in UTF8 mode"))
            }
            ["UTF8", "OFF"] => {
                session.set_utf8(false);
                CommandResult::success(format_response(OK, "UTF8 mode disabled"))
            }
            _ => CommandResult::failure(
                "Unknown option",
                format_response(PARAMETER_ERROR, "Option not understood"),
            ),
        }
    }
}

/// SITE: no site specific commands are offered.
#[derive(Debug, Default)]
pub struct CmdSite;

impl CommandHandler for CmdSite {
    fn run(&self, _session: &mut Session, _raw_line: &str) -> CommandResult {
        CommandResult::failure(
            "SITE not supported",
            format_response(NOT_IMPLEMENTED_FOR_PARAMETER, "SITE command not implemented"),
        )
    }
}
