//! Commands that use or configure the data channel.

use log::{error, info};

use super::{required_parameter, storage_failure};
use crate::client::Session;
use crate::protocol::commands::CommandResult;
use crate::protocol::parser::parameter;
use crate::protocol::registry::CommandHandler;
use crate::protocol::responses::{
    CANT_OPEN_DATA, NOT_IMPLEMENTED_FOR_PARAMETER, OK, PARAMETER_ERROR, PENDING,
    TRANSFER_ABORTED, TRANSFER_COMPLETE, format_facts, format_list_line, format_response,
};
use crate::storage::operations::{self, EntryInfo, WriteMode};
use crate::storage::{ResolveTarget, StoragePath, locate};
use crate::transfer::{TransferType, parse_port_argument};

fn no_data_channel() -> CommandResult {
    CommandResult::failure(
        "No data channel",
        format_response(CANT_OPEN_DATA, "Use PORT or PASV first"),
    )
}

fn transfer_done(detail: &str) -> CommandResult {
    CommandResult::success(format!(
        "150 {}\r\n{}",
        detail,
        format_response(TRANSFER_COMPLETE, "Transfer complete")
    ))
}

fn transfer_aborted(err: std::io::Error) -> CommandResult {
    error!("Data transfer failed: {}", err);
    CommandResult::failure(
        err.to_string(),
        format_response(TRANSFER_ABORTED, "Connection closed; transfer aborted"),
    )
}

/// Converts bare LF to CRLF when the session is in ASCII mode.
fn to_wire(session: &Session, data: Vec<u8>) -> Vec<u8> {
    if session.transfer_type() != TransferType::Ascii {
        return data;
    }
    let mut out = Vec::with_capacity(data.len());
    let mut previous = 0u8;
    for byte in data {
        if byte == b'\n' && previous != b'\r' {
            out.push(b'\r');
        }
        out.push(byte);
        previous = byte;
    }
    out
}

/// Path argument of a listing command, without `ls` style options.
fn listing_target(raw_line: &str) -> &str {
    let param = parameter(raw_line).trim_start();
    if !param.starts_with('-') {
        return param;
    }
    match param.split_once(' ') {
        Some((_, rest)) => rest.trim_start(),
        None => "",
    }
}

/// Entries under the listing target; a file lists as itself.
fn listing_entries(location: &StoragePath) -> Result<Vec<EntryInfo>, CommandResult> {
    let info = operations::stat(&location.real, &location.client_path)
        .map_err(|e| storage_failure(&e, &location.client_path))?;
    if !info.is_dir {
        let name = location
            .client_path
            .rsplit('/')
            .next()
            .unwrap_or(&location.client_path)
            .to_string();
        return Ok(vec![EntryInfo { name, ..info }]);
    }
    operations::list_directory(&location.real, &location.client_path)
        .map_err(|e| storage_failure(&e, &location.client_path))
}

fn send_listing(
    session: &mut Session,
    raw_line: &str,
    render: fn(&EntryInfo) -> String,
) -> CommandResult {
    let target = listing_target(raw_line);
    let location = match locate(session, target, ResolveTarget::Directory) {
        Ok(location) => location,
        Err(e) => return storage_failure(&e, target),
    };
    let entries = match listing_entries(&location) {
        Ok(entries) => entries,
        Err(reply) => return reply,
    };
    let Some(mut channel) = session.take_data_channel() else {
        return no_data_channel();
    };

    let mut listing = String::new();
    for entry in &entries {
        listing.push_str(&render(entry));
        listing.push_str("\r\n");
    }
    match channel.send(listing.as_bytes()) {
        Ok(()) => transfer_done("Here comes the directory listing"),
        Err(e) => transfer_aborted(e),
    }
}

fn name_only(entry: &EntryInfo) -> String {
    entry.name.clone()
}

/// LIST: long listing over the data channel.
#[derive(Debug, Default)]
pub struct CmdList;

impl CommandHandler for CmdList {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        send_listing(session, raw_line, format_list_line)
    }
}

/// NLST: names only.
#[derive(Debug, Default)]
pub struct CmdNlst;

impl CommandHandler for CmdNlst {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        send_listing(session, raw_line, name_only)
    }
}

/// MLSD: machine readable listing.
#[derive(Debug, Default)]
pub struct CmdMlsd;

impl CommandHandler for CmdMlsd {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        send_listing(session, raw_line, format_facts)
    }
}

/// RETR: sends a file, starting at the REST offset if one is pending.
#[derive(Debug, Default)]
pub struct CmdRetr;

impl CommandHandler for CmdRetr {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = match required_parameter(raw_line) {
            Ok(param) => param,
            Err(reply) => return reply,
        };
        let location = match locate(session, param, ResolveTarget::Entry) {
            Ok(location) => location,
            Err(e) => return storage_failure(&e, param),
        };
        if let Err(e) = operations::require_file(&location.real, &location.client_path) {
            return storage_failure(&e, &location.client_path);
        }
        let Some(mut channel) = session.take_data_channel() else {
            return no_data_channel();
        };

        let offset = session.restart_offset();
        session.set_restart_offset(0);
        let data = match operations::read_range(&location.real, offset, None) {
            Ok(data) => to_wire(session, data),
            Err(e) => return storage_failure(&e, &location.client_path),
        };

        match channel.send(&data) {
            Ok(()) => {
                info!(
                    "Client {} downloaded {} ({} bytes)",
                    session.peer(),
                    location.client_path,
                    data.len()
                );
                transfer_done(&format!("Opening data connection for {}", location.client_path))
            }
            Err(e) => transfer_aborted(e),
        }
    }
}

fn receive_into(session: &mut Session, raw_line: &str, append: bool) -> CommandResult {
    let param = match required_parameter(raw_line) {
        Ok(param) => param,
        Err(reply) => return reply,
    };
    let location = match locate(session, param, ResolveTarget::Entry) {
        Ok(location) => location,
        Err(e) => return storage_failure(&e, param),
    };
    let Some(mut channel) = session.take_data_channel() else {
        return no_data_channel();
    };

    let offset = session.restart_offset();
    session.set_restart_offset(0);
    let mode = match (append, offset) {
        (true, _) => WriteMode::Append,
        (false, 0) => WriteMode::Replace,
        (false, offset) => WriteMode::At(offset),
    };

    let data = match channel.receive() {
        Ok(data) => data,
        Err(e) => return transfer_aborted(e),
    };
    match operations::write_file(&location.real, &location.client_path, &data, mode) {
        Ok(written) => {
            info!(
                "Client {} uploaded {} ({} bytes)",
                session.peer(),
                location.client_path,
                written
            );
            transfer_done(&format!("Ok to send data for {}", location.client_path))
        }
        Err(e) => storage_failure(&e, &location.client_path),
    }
}

/// STOR: stores an upload, replacing the file or writing at the REST offset.
#[derive(Debug, Default)]
pub struct CmdStor;

impl CommandHandler for CmdStor {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        receive_into(session, raw_line, false)
    }
}

/// APPE: appends an upload to a file, creating it if needed.
#[derive(Debug, Default)]
pub struct CmdAppe;

impl CommandHandler for CmdAppe {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        receive_into(session, raw_line, true)
    }
}

/// PORT: records the client's active-mode address.
#[derive(Debug, Default)]
pub struct CmdPort;

impl CommandHandler for CmdPort {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = match required_parameter(raw_line) {
            Ok(param) => param,
            Err(reply) => return reply,
        };
        match parse_port_argument(param) {
            Some(addr) => {
                session.set_data_port(Some(addr));
                CommandResult::success(format_response(OK, "PORT command successful"))
            }
            None => CommandResult::failure(
                "Invalid PORT argument",
                format_response(PARAMETER_ERROR, "Invalid PORT argument"),
            ),
        }
    }
}

/// PASV: passive data connections are not offered.
#[derive(Debug, Default)]
pub struct CmdPasv;

impl CommandHandler for CmdPasv {
    fn run(&self, _session: &mut Session, _raw_line: &str) -> CommandResult {
        CommandResult::failure(
            "Passive mode unavailable",
            format_response(CANT_OPEN_DATA, "Passive mode not available"),
        )
    }
}

/// REST: byte offset for the next RETR or STOR.
#[derive(Debug, Default)]
pub struct CmdRest;

impl CommandHandler for CmdRest {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = match required_parameter(raw_line) {
            Ok(param) => param,
            Err(reply) => return reply,
        };
        match param.trim().parse::<u64>() {
            Ok(offset) => {
                session.set_restart_offset(offset);
                CommandResult::success(format_response(
                    PENDING,
                    &format!("Restarting at {}. Send STOR or RETR", offset),
                ))
            }
            Err(_) => CommandResult::failure(
                "Invalid REST offset",
                format_response(PARAMETER_ERROR, "Invalid restart offset"),
            ),
        }
    }
}

/// TYPE: switches between ASCII and binary.
#[derive(Debug, Default)]
pub struct CmdType;

impl CommandHandler for CmdType {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let param = match required_parameter(raw_line) {
            Ok(param) => param,
            Err(reply) => return reply,
        };
        match TransferType::parse(param) {
            Some(transfer_type) => {
                session.set_transfer_type(transfer_type);
                CommandResult::success(format_response(
                    OK,
                    &format!("Type set to {}", transfer_type.label()),
                ))
            }
            None => CommandResult::failure(
                "Unsupported type",
                format_response(NOT_IMPLEMENTED_FOR_PARAMETER, "Type not supported"),
            ),
        }
    }
}
