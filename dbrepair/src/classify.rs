use eterm::Term;

use crate::error::{RepairError, Result};

/// Which tree a key belongs to, determined purely by its runtime type
/// (spec.md §4.1): integers key the by-seq tree, byte strings key the
/// by-id tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    BySeq,
    ById,
}

/// Classify a decoded node key. Any other term shape means the caller
/// handed us something that isn't a real key from a valid node term.
pub fn classify(key: &Term) -> Result<TreeKind> {
    match key {
        Term::Integer(_) => Ok(TreeKind::BySeq),
        Term::Binary(_) => Ok(TreeKind::ById),
        _ => Err(RepairError::UnexpectedKeyType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_key_is_by_seq() {
        assert_eq!(classify(&Term::Integer(42)).unwrap(), TreeKind::BySeq);
    }

    #[test]
    fn binary_key_is_by_id() {
        assert_eq!(
            classify(&Term::Binary(b"doc-1".to_vec())).unwrap(),
            TreeKind::ById
        );
    }

    #[test]
    fn atom_key_is_rejected() {
        assert!(classify(&Term::atom("oops")).is_err());
    }
}
