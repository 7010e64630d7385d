pub mod blockfile;
pub mod error;
pub mod header;

pub use blockfile::{content_offset, BlockFile, BLOCK_SIZE};
pub use error::{BlockFileError, Result};
pub use header::{Header, RootPtr};
