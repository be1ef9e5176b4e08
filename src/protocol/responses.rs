//! FTP Response handling
//!
//! Reply codes, reply formatting and the text forms of directory entries.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

use crate::storage::operations::EntryInfo;

/// Standard FTP response codes
pub const OK: u16 = 200;
pub const SYSTEM_STATUS: u16 = 211;
pub const FILE_STATUS: u16 = 213;
pub const SYSTEM_TYPE: u16 = 215;
pub const CLOSING: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const LOGIN_SUCCESS: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATH_CREATED: u16 = 257;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const PENDING: u16 = 350;
pub const SERVICE_UNAVAILABLE: u16 = 421;
pub const CANT_OPEN_DATA: u16 = 425;
pub const TRANSFER_ABORTED: u16 = 426;
pub const SYNTAX_ERROR: u16 = 500;
pub const PARAMETER_ERROR: u16 = 501;
pub const BAD_SEQUENCE: u16 = 503;
pub const NOT_IMPLEMENTED_FOR_PARAMETER: u16 = 504;
pub const NOT_LOGGED_IN: u16 = 530;
pub const FILE_UNAVAILABLE: u16 = 550;

/// Reply for unknown verbs and lines without a verb.
pub const COMMAND_NOT_RECOGNIZED: &str = "502 Command not recognized\r\n";
/// Reply for lines whose verb cannot be parsed.
pub const COMMAND_PARSE_ERROR: &str = "502 Command parse error\r\n";

/// Format an FTP response message
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Format a multi-line reply: `code-first`, indented body lines, `code last`.
pub fn format_multiline(code: u16, first: &str, body: &[String], last: &str) -> String {
    let mut reply = format!("{}-{}\r\n", code, first);
    for line in body {
        reply.push(' ');
        reply.push_str(line);
        reply.push_str("\r\n");
    }
    reply.push_str(&format_response(code, last));
    reply
}

/// Timestamp as used by MDTM, MFMT and MLST facts (`YYYYMMDDHHMMSS`, UTC).
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format("%Y%m%d%H%M%S").to_string()
}

/// One `ls -l` style line for LIST.
pub fn format_list_line(entry: &EntryInfo) -> String {
    let (kind, mode) = if entry.is_dir {
        ('d', "rwxr-xr-x")
    } else {
        ('-', "rw-r--r--")
    };
    let date = entry
        .modified
        .map(|time| DateTime::<Utc>::from(time).format("%b %d %H:%M").to_string())
        .unwrap_or_else(|| "Jan 01 00:00".to_string());
    format!(
        "{}{} 1 ftp ftp {:>12} {} {}",
        kind, mode, entry.size, date, entry.name
    )
}

/// MLST/MLSD facts followed by the entry name.
pub fn format_facts(entry: &EntryInfo) -> String {
    let mut facts = format!("type={};", if entry.is_dir { "dir" } else { "file" });
    if !entry.is_dir {
        facts.push_str(&format!("size={};", entry.size));
    }
    if let Some(time) = entry.modified {
        facts.push_str(&format!("modify={};", format_timestamp(time)));
    }
    format!("{} {}", facts, entry.name)
}
