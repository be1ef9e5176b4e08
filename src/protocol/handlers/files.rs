//! File and directory commands that answer on the control channel.

use chrono::NaiveDateTime;
use log::info;
use sha2::{Digest, Sha256};
use std::time::SystemTime;

use super::{required_parameter, storage_failure};
use crate::client::Session;
use crate::protocol::commands::CommandResult;
use crate::protocol::registry::CommandHandler;
use crate::protocol::responses::{
    BAD_SEQUENCE, FILE_ACTION_OK, FILE_STATUS, FILE_UNAVAILABLE, PARAMETER_ERROR, PATH_CREATED,
    PENDING, format_facts, format_multiline, format_response, format_timestamp,
};
use crate::storage::operations::{self, EntryInfo};
use crate::storage::{ResolveTarget, StoragePath, locate};

/// Resolves the required parameter of `raw_line` inside the jail.
fn locate_parameter(
    session: &Session,
    raw_line: &str,
    target: ResolveTarget,
) -> Result<StoragePath, CommandResult> {
    let param = required_parameter(raw_line)?;
    locate(session, param, target).map_err(|e| storage_failure(&e, param))
}

/// DELE: deletes a file.
#[derive(Debug, Default)]
pub struct CmdDele;

impl CommandHandler for CmdDele {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let location = match locate_parameter(session, raw_line, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        match operations::delete_file(&location.real, &location.client_path) {
            Ok(()) => CommandResult::success(format_response(FILE_ACTION_OK, "File successfully deleted")),
            Err(e) => storage_failure(&e, &location.client_path),
        }
    }
}

/// MKD and XMKD: creates a directory.
#[derive(Debug, Default)]
pub struct CmdMkd;

impl CommandHandler for CmdMkd {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let location = match locate_parameter(session, raw_line, ResolveTarget::Directory) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        match operations::create_directory(&location.real, &location.client_path) {
            Ok(()) => CommandResult::success(format_response(
                PATH_CREATED,
                &format!("\"{}\" directory created", location.client_path),
            )),
            Err(e) => storage_failure(&e, &location.client_path),
        }
    }
}

/// RMD and XRMD: removes an empty directory. The jail root itself stays.
#[derive(Debug, Default)]
pub struct CmdRmd;

impl CommandHandler for CmdRmd {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let location = match locate_parameter(session, raw_line, ResolveTarget::Directory) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        if location.client_path == "/" {
            return CommandResult::failure(
                "Refusing to remove root",
                format_response(FILE_UNAVAILABLE, "Can't remove the root directory"),
            );
        }
        match operations::remove_directory(&location.real, &location.client_path) {
            Ok(()) => CommandResult::success(format_response(FILE_ACTION_OK, "Removed directory")),
            Err(e) => storage_failure(&e, &location.client_path),
        }
    }
}

/// RNFR: remembers the entry to rename.
#[derive(Debug, Default)]
pub struct CmdRnfr;

impl CommandHandler for CmdRnfr {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        session.set_rename_from(None);
        let location = match locate_parameter(session, raw_line, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        if let Err(e) = operations::stat(&location.real, &location.client_path) {
            return storage_failure(&e, &location.client_path);
        }
        session.set_rename_from(Some(location));
        CommandResult::success(format_response(PENDING, "Ready for RNTO"))
    }
}

/// RNTO: renames the entry named by the preceding RNFR.
#[derive(Debug, Default)]
pub struct CmdRnto;

impl CommandHandler for CmdRnto {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let Some(from) = session.take_rename_from() else {
            return CommandResult::failure(
                "RNTO without RNFR",
                format_response(BAD_SEQUENCE, "Bad sequence of commands: send RNFR first"),
            );
        };
        let to = match locate_parameter(session, raw_line, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        match operations::rename(&from.real, &to.real, &to.client_path) {
            Ok(()) => {
                info!(
                    "Client {} renamed {} to {}",
                    session.peer(),
                    from.client_path,
                    to.client_path
                );
                CommandResult::success(format_response(FILE_ACTION_OK, "Rename successful"))
            }
            Err(e) => storage_failure(&e, &to.client_path),
        }
    }
}

/// SIZE: size of a file in bytes.
#[derive(Debug, Default)]
pub struct CmdSize;

impl CommandHandler for CmdSize {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let location = match locate_parameter(session, raw_line, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        match operations::require_file(&location.real, &location.client_path) {
            Ok(info) => CommandResult::success(format_response(FILE_STATUS, &info.size.to_string())),
            Err(e) => storage_failure(&e, &location.client_path),
        }
    }
}

/// MDTM: modification time of a file.
#[derive(Debug, Default)]
pub struct CmdMdtm;

impl CommandHandler for CmdMdtm {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let location = match locate_parameter(session, raw_line, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        match operations::require_file(&location.real, &location.client_path) {
            Ok(EntryInfo {
                modified: Some(time),
                ..
            }) => CommandResult::success(format_response(FILE_STATUS, &format_timestamp(time))),
            Ok(_) => CommandResult::failure(
                "No modification time",
                format_response(FILE_UNAVAILABLE, "Modification time not available"),
            ),
            Err(e) => storage_failure(&e, &location.client_path),
        }
    }
}

/// MFMT: `MFMT YYYYMMDDHHMMSS path` sets the modification time of a file.
#[derive(Debug, Default)]
pub struct CmdMfmt;

impl CommandHandler for CmdMfmt {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = match required_parameter(raw_line) {
            Ok(param) => param,
            Err(reply) => return reply,
        };
        let Some((stamp, path)) = param.split_once(' ') else {
            return syntax_error("MFMT needs a time and a path");
        };
        let Ok(time) = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S") else {
            return syntax_error("Invalid time value");
        };
        let time: SystemTime = time.and_utc().into();

        let location = match locate(session, path, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(e) => return storage_failure(&e, path),
        };
        match operations::set_modified(&location.real, &location.client_path, time) {
            Ok(()) => CommandResult::success(format_response(
                FILE_STATUS,
                &format!("Modify={}; {}", stamp, path),
            )),
            Err(e) => storage_failure(&e, &location.client_path),
        }
    }
}

/// MLST: facts about one entry, sent on the control channel.
#[derive(Debug, Default)]
pub struct CmdMlst;

impl CommandHandler for CmdMlst {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = crate::protocol::parser::parameter(raw_line);
        let param = if param.trim().is_empty() { "." } else { param };
        let location = match locate(session, param, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(e) => return storage_failure(&e, param),
        };
        match operations::stat(&location.real, &location.client_path) {
            Ok(info) => CommandResult::success(format_multiline(
                FILE_ACTION_OK,
                &format!("Listing {}", location.client_path),
                &[format_facts(&info)],
                "End",
            )),
            Err(e) => storage_failure(&e, &location.client_path),
        }
    }
}

/// HASH: SHA-256 of a file, or of the range set with RANG.
#[derive(Debug, Default)]
pub struct CmdHash;

impl CommandHandler for CmdHash {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let location = match locate_parameter(session, raw_line, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(reply) => return reply,
        };
        let info = match operations::require_file(&location.real, &location.client_path) {
            Ok(info) => info,
            Err(e) => return storage_failure(&e, &location.client_path),
        };

        let (start, end) = match session.hash_range() {
            Some((start, end)) => (start, end.min(info.size)),
            None => (0, info.size),
        };
        session.set_hash_range(None);
        // A range starting at or past the end of the file has nothing to hash.
        if start > 0 && start >= end {
            return CommandResult::failure(
                "Hash range outside file",
                format_response(
                    FILE_UNAVAILABLE,
                    &format!("Range {}-{} is outside {}", start, end, location.client_path),
                ),
            );
        }
        let data = match operations::read_range(&location.real, start, Some(end)) {
            Ok(data) => data,
            Err(e) => return storage_failure(&e, &location.client_path),
        };

        let digest = hex::encode(Sha256::digest(&data));
        CommandResult::success(format_response(
            FILE_STATUS,
            &format!("SHA-256 {}-{} {} {}", start, end, digest, location.client_path),
        ))
    }
}

/// RANG: `RANG start end` limits the next HASH; `RANG 1 0` resets it.
#[derive(Debug, Default)]
pub struct CmdRang;

impl CommandHandler for CmdRang {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = match required_parameter(raw_line) {
            Ok(param) => param,
            Err(reply) => return reply,
        };
        let bounds: Vec<u64> = match param
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<u64>, _>>()
        {
            Ok(bounds) if bounds.len() == 2 => bounds,
            _ => return syntax_error("RANG needs a start and an end byte"),
        };

        match (bounds[0], bounds[1]) {
            (1, 0) => {
                session.set_hash_range(None);
                CommandResult::success(format_response(PENDING, "Resetting RANG"))
            }
            (start, end) if start < end => {
                session.set_hash_range(Some((start, end)));
                CommandResult::success(format_response(
                    PENDING,
                    &format!("Restarting at {}. Ending byte {}", start, end),
                ))
            }
            _ => syntax_error("Start byte must be less than end byte"),
        }
    }
}

fn syntax_error(reason: &str) -> CommandResult {
    CommandResult::failure(reason, format_response(PARAMETER_ERROR, reason))
}
