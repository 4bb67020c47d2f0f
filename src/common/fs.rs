use std::{fs, io, path::Path};

use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Create the directory if it doesn't exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Io(io::Error::new(io::ErrorKind::AlreadyExists,
                format!("[common::fs] Path exists but is not a directory: {}", path.display()))))
        }
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Create the parent directory of a file path, if it has one.
pub(crate) fn ensure_parent_exists(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir_exists(parent),
        _ => Ok(()),
    }
}

/// Error unless the file already exists.
pub(crate) fn require_file_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::Io(io::Error::new(io::ErrorKind::NotFound,
            format!("[common::fs] File does not exist: {}", path.display()))))
    }
    Ok(())
}

/// Hex-encoded SHA-256 digest.
pub(crate) fn sha256_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
