use std::io;

use thiserror::Error;

use crate::config::{DIR_ENTRIES_PER_BLOCK, MAX_FILE_SIZE, NAME_MAX_LEN};

pub type Result<T, E = FsError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("{0}: no such file or directory")]
    NotFound(String),

    #[error("{0}: not a regular file")]
    NotAFile(String),

    #[error("{0}: not a directory")]
    NotADirectory(String),

    #[error("{0}: already exists")]
    AlreadyExists(String),

    #[error("{0}: directory not empty")]
    DirectoryNotEmpty(String),

    #[error("no free {0} left")]
    OutOfSpace(&'static str),

    #[error("directory is full ({max} entries)", max = DIR_ENTRIES_PER_BLOCK)]
    DirectoryFull,

    #[error("{0}: name longer than {max} bytes", max = NAME_MAX_LEN)]
    NameTooLong(String),

    #[error("{0:?}: invalid name")]
    InvalidName(String),

    #[error("file larger than {max} bytes", max = MAX_FILE_SIZE)]
    FileTooLarge,

    #[error("{kind} {index} is outside the filesystem")]
    OutOfRange { kind: &'static str, index: usize },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("bad superblock: {0}")]
    BadSuperblock(String),

    #[error("filesystem corrupted: {0}")]
    Corrupted(String),

    #[error("malformed on-disk record: {0}")]
    Codec(#[from] binrw::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
