use blockfile::BlockFile;
use eterm::Term;

use crate::classify::{classify, TreeKind};

/// Result of successfully probing a candidate offset as a tree root.
pub struct ProbedRoot {
    pub kind: TreeKind,
    pub last_key: Term,
}

/// Open a tree rooted at `(offset, 0)` and reverse-fold it to find its
/// greatest key, then classify that key (spec.md §4.2). Any failure along
/// the way — the offset doesn't decode to a node, the node is empty, or
/// the key has an unexpected type — is "not a root" to the caller, who
/// should treat it exactly like every other decode failure during
/// scanning: skip and move on.
pub fn probe_root(bf: &mut BlockFile, offset: u64) -> Option<ProbedRoot> {
    let node = bptree::open_at(bf, offset, 0).ok()?;
    let last_key = bptree::fold_extreme(bf, &node, bptree::Direction::Reverse).ok()?;
    let kind = classify(&last_key).ok()?;
    Some(ProbedRoot { kind, last_key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bptree::node::encode_leaf;

    #[test]
    fn probes_by_id_leaf() {
        let dir = tempfile::tempdir().unwrap();
        let mut bf = BlockFile::open_or_create(dir.path().join("t.couch")).unwrap();
        let term = encode_leaf(vec![(Term::Binary(b"z".to_vec()), Term::Integer(1))]);
        let offset = bf.append_term(&eterm::encode(&term)).unwrap();

        let probed = probe_root(&mut bf, offset).unwrap();
        assert_eq!(probed.kind, TreeKind::ById);
        assert_eq!(probed.last_key, Term::Binary(b"z".to_vec()));
    }

    #[test]
    fn non_node_offset_is_not_a_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut bf = BlockFile::open_or_create(dir.path().join("t.couch")).unwrap();
        let offset = bf.append_term(&eterm::encode(&Term::Integer(7))).unwrap();
        assert!(probe_root(&mut bf, offset).is_none());
    }
}
