use thiserror::Error;

#[derive(Error, Debug)]
pub enum BTreeError {
    #[error(transparent)]
    BlockFile(#[from] blockfile::BlockFileError),

    #[error(transparent)]
    Eterm(#[from] eterm::EtermError),

    #[error("term at offset {0} is not a node tuple")]
    NotANode(u64),

    #[error("unknown node tag {0:?}")]
    UnknownTag(String),

    #[error("node at offset {0} has no entries")]
    EmptyNode(u64),

    #[error("malformed interior node entry at offset {0}")]
    MalformedEntry(u64),
}

pub type Result<T> = std::result::Result<T, BTreeError>;
