pub mod error;
pub mod node;

pub use error::{BTreeError, Result};
pub use node::{Node, NodeKind};

use blockfile::BlockFile;
use eterm::Term;

/// Direction to fold a tree in, per spec.md §4.2: the Root Prober always
/// folds in reverse to get the greatest key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Open the node term whose content starts at `offset` (the `O` spec.md's
/// Candidate offset describes — four bytes past the term's on-disk length
/// prefix). The `reduction` placeholder spec.md §4.2 mentions is not
/// needed to open or fold a node and is accepted only for interface
/// symmetry with a real B-tree reader.
pub fn open_at(bf: &mut BlockFile, offset: u64, _reduction: u64) -> Result<Node> {
    let prefix_pos = offset
        .checked_sub(4)
        .ok_or(BTreeError::NotANode(offset))?;
    let bytes = bf.read_term_at(prefix_pos)?;
    let term = eterm::decode(&bytes)?;
    Node::from_term(offset, term)
}

/// Fold a tree rooted at `node` in `dir`, stopping at the first entry —
/// i.e. retrieve the smallest (Forward) or greatest (Reverse) key in the
/// tree. Interior nodes are descended through their first/last child
/// pointer respectively.
pub fn fold_extreme(bf: &mut BlockFile, node: &Node, dir: Direction) -> Result<Term> {
    let mut current = node.clone();
    loop {
        if current.entries.is_empty() {
            return Err(BTreeError::EmptyNode(current.offset));
        }
        let (key, value) = match dir {
            Direction::Forward => &current.entries[0],
            Direction::Reverse => &current.entries[current.entries.len() - 1],
        };
        match current.kind {
            NodeKind::Leaf => return Ok(key.clone()),
            NodeKind::Interior => {
                let child_offset = current.child_pointer(value)?;
                current = open_at(bf, child_offset, 0)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::{encode_interior, encode_leaf};

    fn write_node(bf: &mut BlockFile, term: Term) -> u64 {
        let bytes = eterm::encode(&term);
        bf.append_term(&bytes).unwrap()
    }

    #[test]
    fn folds_leaf_extremes() {
        let dir = tempfile::tempdir().unwrap();
        let mut bf = BlockFile::open_or_create(dir.path().join("t.couch")).unwrap();

        let term = encode_leaf(vec![
            (Term::Binary(b"a".to_vec()), Term::Integer(1)),
            (Term::Binary(b"b".to_vec()), Term::Integer(2)),
            (Term::Binary(b"c".to_vec()), Term::Integer(3)),
        ]);
        let offset = write_node(&mut bf, term);
        let node = open_at(&mut bf, offset, 0).unwrap();

        let lo = fold_extreme(&mut bf, &node, Direction::Forward).unwrap();
        let hi = fold_extreme(&mut bf, &node, Direction::Reverse).unwrap();
        assert_eq!(lo, Term::Binary(b"a".to_vec()));
        assert_eq!(hi, Term::Binary(b"c".to_vec()));
    }

    #[test]
    fn folds_through_interior_node() {
        let dir = tempfile::tempdir().unwrap();
        let mut bf = BlockFile::open_or_create(dir.path().join("t.couch")).unwrap();

        let left = encode_leaf(vec![(Term::Integer(1), Term::Integer(10))]);
        let left_off = write_node(&mut bf, left);
        let right = encode_leaf(vec![(Term::Integer(5), Term::Integer(50))]);
        let right_off = write_node(&mut bf, right);

        let root = encode_interior(vec![
            (Term::Integer(1), left_off, Term::Integer(0)),
            (Term::Integer(5), right_off, Term::Integer(0)),
        ]);
        let root_off = write_node(&mut bf, root);
        let node = open_at(&mut bf, root_off, 0).unwrap();

        let hi = fold_extreme(&mut bf, &node, Direction::Reverse).unwrap();
        assert_eq!(hi, Term::Integer(5));
    }
}
