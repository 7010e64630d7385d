use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocModelError {
    #[error(transparent)]
    BlockFile(#[from] blockfile::BlockFileError),

    #[error(transparent)]
    BTree(#[from] bptree::BTreeError),

    #[error(transparent)]
    Eterm(#[from] eterm::EtermError),

    #[error("malformed document value for id {0:?}")]
    MalformedDocument(Vec<u8>),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
