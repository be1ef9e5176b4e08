//! FTP command line parsing
//!
//! A command line is `VERB[ parameter]`. The verb is the text before the
//! first space, trimmed and uppercased. The parameter is everything after
//! that space with the trailing CR/LF removed; inner and trailing spaces are
//! kept as sent.

use crate::error::ParseError;

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandLine<'a> {
    pub verb: String,
    pub parameter: &'a str,
}

/// Splits a raw line into verb and parameter.
pub fn parse_line(raw: &str) -> Result<CommandLine<'_>, ParseError> {
    let line = strip_line_ending(raw);
    if line.trim().is_empty() {
        return Err(ParseError::EmptyLine);
    }

    let (verb, parameter) = line.split_once(' ').unwrap_or((line, ""));
    let verb = verb.trim();
    if verb.is_empty() {
        return Err(ParseError::EmptyVerb);
    }
    if !verb.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ParseError::MalformedVerb(verb.to_string()));
    }

    Ok(CommandLine {
        verb: verb.to_ascii_uppercase(),
        parameter,
    })
}

/// The parameter of a raw line: everything after the first space, without
/// the trailing CR/LF. Empty when the line has no space.
pub fn parameter(raw: &str) -> &str {
    let line = strip_line_ending(raw);
    line.split_once(' ').map(|(_, rest)| rest).unwrap_or("")
}

fn strip_line_ending(raw: &str) -> &str {
    raw.trim_end_matches(['\r', '\n'])
}
