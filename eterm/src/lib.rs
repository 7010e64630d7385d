pub mod codec;
pub mod error;
pub mod term;

pub use codec::{decode, encode, TAG_VERSION};
pub use error::{EtermError, Result};
pub use term::Term;
