//! Error types for the store

use keepsake_core::UnsupportedValue;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// The file operation that failed, carried by [`Error::Io`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Open,
    Stat,
    Read,
    Seek,
    Truncate,
    Write,
    Sync,
    Close,
}

impl FileOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileOp::Open => "open",
            FileOp::Stat => "stat",
            FileOp::Read => "read",
            FileOp::Seek => "seek",
            FileOp::Truncate => "truncate",
            FileOp::Write => "write",
            FileOp::Sync => "sync",
            FileOp::Close => "close",
        }
    }
}

impl std::fmt::Display for FileOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur in the store
#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure on the store file
    #[error("unable to {op} store file {}: {source}", .path.display())]
    Io {
        op: FileOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a serialized mapping
    #[error("unable to decode store file {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Value rejected by normalization
    #[error("unsupported value for key '{key}': {source}")]
    Type {
        key: String,
        #[source]
        source: UnsupportedValue,
    },

    /// The file handle has been released by `close`
    #[error("store file {} already closed", .path.display())]
    AlreadyClosed { path: PathBuf },

    /// A thread panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}

impl Error {
    pub fn io(op: FileOp, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io { op, path: path.as_ref().to_path_buf(), source }
    }

    pub fn decode(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Decode { path: path.as_ref().to_path_buf(), source }
    }

    pub fn unsupported(key: impl Into<String>, source: UnsupportedValue) -> Self {
        Self::Type { key: key.into(), source }
    }

    pub fn already_closed(path: impl AsRef<Path>) -> Self {
        Self::AlreadyClosed { path: path.as_ref().to_path_buf() }
    }

    /// The failing file operation, for I/O errors
    pub fn file_op(&self) -> Option<FileOp> {
        match self {
            Error::Io { op, .. } => Some(*op),
            _ => None,
        }
    }
}
