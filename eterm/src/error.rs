use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtermError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing version byte: expected 0x{expected:02X}, got 0x{found:02X}")]
    BadVersion { expected: u8, found: u8 },

    #[error("unknown tag byte: 0x{0:02X}")]
    UnknownTag(u8),

    #[error("truncated term: needed {needed} more bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("invalid UTF-8 in atom name")]
    InvalidAtomUtf8,

    #[error("trailing bytes after decoding a complete term")]
    TrailingBytes,
}

pub type Result<T> = std::result::Result<T, EtermError>;
