use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    BlockFile(#[from] blockfile::BlockFileError),

    #[error(transparent)]
    BTree(#[from] bptree::BTreeError),

    #[error(transparent)]
    Eterm(#[from] eterm::EtermError),

    #[error(transparent)]
    DocModel(#[from] docmodel::DocModelError),

    #[error("key has an unexpected type for a B-tree key")]
    UnexpectedKeyType,

    #[error("cannot open source file {0}")]
    FileOpen(String),
}

pub type Result<T> = std::result::Result<T, RepairError>;
