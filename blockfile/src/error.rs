use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlockFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no header found in file")]
    NoHeader,

    #[error("truncated term at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedTerm {
        offset: u64,
        needed: usize,
        available: usize,
    },

    #[error("header record at offset {0} is malformed")]
    MalformedHeader(u64),
}

pub type Result<T> = std::result::Result<T, BlockFileError>;
