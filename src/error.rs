//! Errors reported by file and path operations.

use std::io;
use std::path::{Path, PathBuf};

use crate::handle::Descriptor;

pub type FsResult<T> = std::result::Result<T, FsError>;

/// Coarse classification surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    HandleNotFound,
    NotFound,
    AccessDenied,
    AlreadyExists,
    InvalidEncoding,
    IoError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::HandleNotFound => "handle_not_found",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidEncoding => "invalid_encoding",
            ErrorKind::IoError => "io_error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The descriptor was never issued or has been closed
    #[error("no open file for descriptor {0}")]
    HandleNotFound(Descriptor),
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),
    #[error("permission denied: {}", .0.display())]
    AccessDenied(PathBuf),
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("invalid hex input: {0}")]
    InvalidEncoding(String),
    /// The OS accepted fewer bytes than were handed to it
    #[error("short write: {written} of {expected} bytes persisted")]
    ShortWrite { expected: usize, written: usize },
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl FsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::HandleNotFound(_) => ErrorKind::HandleNotFound,
            FsError::NotFound(_) => ErrorKind::NotFound,
            FsError::AccessDenied(_) => ErrorKind::AccessDenied,
            FsError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            FsError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            FsError::ShortWrite { .. } | FsError::Io(_) => ErrorKind::IoError,
        }
    }

    /// Attach the offending path to an OS error raised by a path-level call.
    pub fn at_path(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FsError::AccessDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path.to_path_buf()),
            _ => FsError::Io(err),
        }
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        FsError::Io(io::Error::new(io::ErrorKind::InvalidInput, msg.into()))
    }
}

impl From<hex::FromHexError> for FsError {
    fn from(err: hex::FromHexError) -> Self {
        FsError::InvalidEncoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_onto_path_kinds() {
        let path = Path::new("/nowhere");
        let cases = [
            (io::ErrorKind::NotFound, ErrorKind::NotFound),
            (io::ErrorKind::PermissionDenied, ErrorKind::AccessDenied),
            (io::ErrorKind::AlreadyExists, ErrorKind::AlreadyExists),
            (io::ErrorKind::Interrupted, ErrorKind::IoError),
        ];
        for (io_kind, expected) in cases {
            let err = FsError::at_path(path, io::Error::from(io_kind));
            assert_eq!(err.kind(), expected, "{io_kind:?}");
        }
    }

    #[test]
    fn short_write_is_an_io_error() {
        let err = FsError::ShortWrite {
            expected: 4,
            written: 2,
        };
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert_eq!(err.to_string(), "short write: 2 of 4 bytes persisted");
    }
}
