use std::path::PathBuf;

use thiserror::Error;

use crate::config::{BLOCK_SIZE, MAX_PIECE_LENGTH};

/// Errors that can occur while creating a torrent.
#[derive(Debug, Error)]
pub enum Error {
    /// The piece length is not a power of two, or lies outside one block to 2^27 bytes.
    #[error(
        "invalid piece length {0}: must be a power of two between {} and {} bytes",
        BLOCK_SIZE,
        MAX_PIECE_LENGTH
    )]
    InvalidPieceLength(u64),

    /// A path that is neither a regular file nor a directory.
    #[error("unsupported directory entry: {}", .0.display())]
    UnsupportedEntry(PathBuf),

    /// A file or directory name that cannot be stored in the metainfo.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// A directory source that contains no files.
    #[error("no files found to create torrent from: {}", .0.display())]
    NoFiles(PathBuf),

    /// Reading file metadata or content failed.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] jwalk::Error),

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("bencode error: {0}")]
    Bencode(#[from] serde_bencode::Error),

    /// An encoded torrent without an `info` dictionary.
    #[error("metainfo has no info dictionary")]
    MissingInfo,

    #[error("failed to start hashing threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
