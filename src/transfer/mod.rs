//! Transfer module for FTP server
//!
//! Transfer type, PORT parsing and the data channel collaborator used by the
//! transfer commands.

pub mod data_channel;
pub mod modes;

pub use data_channel::{DataChannel, MemoryChannel};
pub use modes::{TransferType, parse_port_argument};
