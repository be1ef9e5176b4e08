//! Navigate module
//!
//! Handles directory navigation operations for FTP clients.

mod operations;

pub use operations::change_directory;
