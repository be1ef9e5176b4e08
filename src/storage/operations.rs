//! Storage operations
//!
//! File system operations behind the FTP commands. Every function takes a
//! location already produced by [`crate::storage::locate`].

use log::{error, info};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::error::StorageError;

/// Metadata of one directory entry.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Reads metadata of `path`, naming the entry `name`.
pub fn stat(path: &Path, name: &str) -> Result<EntryInfo, StorageError> {
    let metadata = fs::metadata(path).map_err(|e| not_found_or(e, name))?;
    Ok(EntryInfo {
        name: name.to_string(),
        is_dir: metadata.is_dir(),
        size: if metadata.is_dir() { 0 } else { metadata.len() },
        modified: metadata.modified().ok(),
    })
}

/// Fails unless `path` is an existing regular file.
pub fn require_file(path: &Path, client_path: &str) -> Result<EntryInfo, StorageError> {
    let info = stat(path, client_path)?;
    if info.is_dir {
        return Err(StorageError::NotAFile(client_path.to_string()));
    }
    Ok(info)
}

/// Fails unless `path` is an existing directory.
pub fn require_directory(path: &Path, client_path: &str) -> Result<(), StorageError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(StorageError::NotADirectory(client_path.to_string())),
        Err(_) => Err(StorageError::DirectoryNotFound(client_path.to_string())),
    }
}

/// Lists the contents of a directory, sorted by name.
pub fn list_directory(path: &Path, client_path: &str) -> Result<Vec<EntryInfo>, StorageError> {
    require_directory(path, client_path)?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(path)?.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        match entry.metadata() {
            Ok(metadata) => entries.push(EntryInfo {
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                is_dir: metadata.is_dir(),
                modified: metadata.modified().ok(),
                name,
            }),
            Err(e) => error!("Skipping {} in {}: {}", name, client_path, e),
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    info!("Listed directory {} - {} entries", client_path, entries.len());
    Ok(entries)
}

/// Reads `path` from byte `start` up to `end` (exclusive), or to the end of file.
pub fn read_range(path: &Path, start: u64, end: Option<u64>) -> Result<Vec<u8>, StorageError> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let mut data = Vec::new();
    match end {
        Some(end) if end >= start => {
            file.take(end - start).read_to_end(&mut data)?;
        }
        Some(_) => {}
        None => {
            file.read_to_end(&mut data)?;
        }
    }
    Ok(data)
}

/// How an upload lands in its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and write from the start.
    Replace,
    /// Keep existing bytes and write at the given offset.
    At(u64),
    /// Write after the current end of file.
    Append,
}

/// Writes `data` to `path`. The parent directory must exist.
pub fn write_file(path: &Path, client_path: &str, data: &[u8], mode: WriteMode) -> Result<u64, StorageError> {
    if let Some(parent) = path.parent() {
        require_directory(parent, client_path)?;
    }
    if path.is_dir() {
        return Err(StorageError::NotAFile(client_path.to_string()));
    }

    let mut file = match mode {
        WriteMode::Replace => File::create(path)?,
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        WriteMode::At(offset) => {
            let mut file = OpenOptions::new().create(true).write(true).truncate(false).open(path)?;
            file.seek(SeekFrom::Start(offset))?;
            file
        }
    };
    file.write_all(data)?;
    file.flush()?;

    info!("Stored {} bytes to {}", data.len(), client_path);
    Ok(data.len() as u64)
}

pub fn delete_file(path: &Path, client_path: &str) -> Result<(), StorageError> {
    require_file(path, client_path)?;
    fs::remove_file(path).map_err(|e| {
        error!("Failed to delete {}: {}", client_path, e);
        StorageError::from(e)
    })?;
    info!("Deleted file {}", client_path);
    Ok(())
}

pub fn create_directory(path: &Path, client_path: &str) -> Result<(), StorageError> {
    if path.exists() {
        return Err(StorageError::FileAlreadyExists(client_path.to_string()));
    }
    fs::create_dir(path).map_err(|e| not_found_or(e, client_path))?;
    info!("Created directory {}", client_path);
    Ok(())
}

/// Removes an empty directory. A symlink to a directory is not one.
pub fn remove_directory(path: &Path, client_path: &str) -> Result<(), StorageError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(StorageError::NotADirectory(client_path.to_string())),
        Err(_) => return Err(StorageError::DirectoryNotFound(client_path.to_string())),
    }
    fs::remove_dir(path)?;
    info!("Removed directory {}", client_path);
    Ok(())
}

pub fn rename(from: &Path, to: &Path, to_client_path: &str) -> Result<(), StorageError> {
    if to.exists() {
        return Err(StorageError::FileAlreadyExists(to_client_path.to_string()));
    }
    fs::rename(from, to)?;
    Ok(())
}

pub fn set_modified(path: &Path, client_path: &str, time: SystemTime) -> Result<(), StorageError> {
    require_file(path, client_path)?;
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_modified(time)?;
    Ok(())
}

fn not_found_or(error: std::io::Error, name: &str) -> StorageError {
    if error.kind() == std::io::ErrorKind::NotFound {
        StorageError::FileNotFound(name.to_string())
    } else {
        StorageError::IoError(error)
    }
}
