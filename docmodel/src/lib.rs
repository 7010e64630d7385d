pub mod document;
pub mod error;
pub mod merge;
pub mod target;

pub use document::{Document, Revision};
pub use error::{DocModelError, Result};
pub use merge::{fold_by_id_into, BATCH_SIZE};
pub use target::MergeTarget;

#[cfg(test)]
mod tests {
    use super::*;
    use blockfile::BlockFile;
    use bptree::node::encode_leaf;

    fn sample_doc(id: &str) -> Document {
        Document {
            id: id.as_bytes().to_vec(),
            revisions: vec![Revision {
                seq: 1,
                rev_num: 1,
                rev_hash: vec![0xab],
                deleted: false,
                body: b"{}".to_vec(),
            }],
        }
    }

    #[test]
    fn fold_by_id_into_writes_documents_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = BlockFile::open_or_create(dir.path().join("source.couch")).unwrap();

        let docs = vec![sample_doc("a"), sample_doc("b"), sample_doc("c")];
        let entries = docs.iter().map(Document::to_entry).collect();
        let leaf = encode_leaf(entries);
        let offset = source.append_term(&eterm::encode(&leaf)).unwrap();
        let root = bptree::open_at(&mut source, offset, 0).unwrap();

        let mut target = MergeTarget::open_or_create(dir.path().join("target.couch")).unwrap();
        let n = fold_by_id_into(&mut source, &root, &mut target).unwrap();
        assert_eq!(n, 3);
        assert_eq!(target.document_count(), 3);
    }

    #[test]
    fn merge_from_unions_revisions_without_duplicating() {
        let mut a = sample_doc("x");
        let mut b = sample_doc("x");
        b.revisions.push(Revision {
            seq: 2,
            rev_num: 2,
            rev_hash: vec![0xcd],
            deleted: false,
            body: b"{}".to_vec(),
        });
        a.merge_from(&b);
        assert_eq!(a.revisions.len(), 2);

        // Merging the same revision again must not duplicate it.
        a.merge_from(&b);
        assert_eq!(a.revisions.len(), 2);
    }
}
