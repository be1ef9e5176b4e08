//! FTP transfer modes
//!
//! Representation type (TYPE) and active-mode target (PORT) parsing.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Representation type selected with TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Binary,
}

impl TransferType {
    /// Parses a TYPE argument (`A`, `A N`, `I`, `L 8`).
    pub fn parse(arg: &str) -> Option<Self> {
        let mut parts = arg.split_whitespace();
        let code = parts.next()?.to_ascii_uppercase();
        let format = parts.next().map(str::to_ascii_uppercase);
        if parts.next().is_some() {
            return None;
        }

        match (code.as_str(), format.as_deref()) {
            ("A", None | Some("N")) => Some(TransferType::Ascii),
            ("I", None) | ("L", Some("8")) => Some(TransferType::Binary),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransferType::Ascii => "ASCII",
            TransferType::Binary => "BINARY",
        }
    }
}

/// Parses a PORT argument `h1,h2,h3,h4,p1,p2` into a socket address.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddr> {
    let numbers = arg
        .trim()
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .ok()?;

    let [h1, h2, h3, h4, p1, p2] = numbers.as_slice() else {
        return None;
    };

    let ip = Ipv4Addr::new(*h1, *h2, *h3, *h4);
    let port = u16::from(*p1) << 8 | u16::from(*p2);
    if port == 0 {
        return None;
    }
    Some(SocketAddr::V4(SocketAddrV4::new(ip, port)))
}
