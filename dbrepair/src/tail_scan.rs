use blockfile::BlockFile;
use eterm::Term;

use crate::classify::TreeKind;
use crate::probe::probe_root;

/// A root found by walking backward from a starting offset.
pub struct TailHit {
    /// Offset of the node's first content byte (`O`) — what the header
    /// stores as a root offset.
    pub offset: u64,
    pub last_key: Term,
}

fn is_node_term(term: &Term) -> bool {
    matches!(
        term.as_tuple(),
        Some([first, _]) if matches!(first.as_atom(), Some("kv_node") | Some("kp_node"))
    )
}

/// Walk `start` downward one byte at a time, decoding at each position,
/// until a node of kind `target` is found (spec.md §4.3). Decode failures
/// and nodes of the wrong kind are silently skipped — this is a
/// byte-granularity search over a term-length-prefixed format and most
/// positions are not term boundaries at all.
pub fn tail_scan(bf: &mut BlockFile, target: TreeKind, start: u64) -> Option<TailHit> {
    let mut p = start as i64;
    while p >= 0 {
        let decode_point = p as u64;
        if let Ok(term_bytes) = bf.read_term_at(decode_point) {
            if let Ok(term) = eterm::decode(&term_bytes) {
                if is_node_term(&term) {
                    let offset = blockfile::content_offset(decode_point, 4);
                    if let Some(probed) = probe_root(bf, offset) {
                        if probed.kind == target {
                            return Some(TailHit {
                                offset,
                                last_key: probed.last_key,
                            });
                        }
                    }
                }
            }
        }
        p -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use bptree::node::encode_leaf;

    #[test]
    fn finds_nearest_matching_root_below_eof() {
        let dir = tempfile::tempdir().unwrap();
        let mut bf = BlockFile::open_or_create(dir.path().join("t.couch")).unwrap();

        let by_seq = encode_leaf(vec![(Term::Integer(5), Term::Integer(500))]);
        let by_seq_off = bf.append_term(&eterm::encode(&by_seq)).unwrap();
        let by_id = encode_leaf(vec![(Term::Binary(b"doc".to_vec()), Term::Integer(1))]);
        let by_id_off = bf.append_term(&eterm::encode(&by_id)).unwrap();

        let eof = bf.file_size().unwrap();
        let hit = tail_scan(&mut bf, TreeKind::ById, eof).unwrap();
        assert_eq!(hit.offset, by_id_off);

        let hit = tail_scan(&mut bf, TreeKind::BySeq, eof).unwrap();
        assert_eq!(hit.offset, by_seq_off);
    }

    #[test]
    fn returns_none_when_no_matching_root_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut bf = BlockFile::open_or_create(dir.path().join("t.couch")).unwrap();
        let by_id = encode_leaf(vec![(Term::Binary(b"doc".to_vec()), Term::Integer(1))]);
        bf.append_term(&eterm::encode(&by_id)).unwrap();

        let eof = bf.file_size().unwrap();
        assert!(tail_scan(&mut bf, TreeKind::BySeq, eof).is_none());
    }
}
