use std::collections::BTreeMap;
use std::path::Path;

use blockfile::{BlockFile, Header, RootPtr};
use bptree::{node::encode_leaf, NodeKind};

use crate::document::Document;
use crate::error::Result;

/// The target database a merge writes documents into. Holds the
/// accumulated document set in memory and flushes a fresh by-id leaf plus
/// header after every batch, syncing data before the header write so a
/// crash mid-merge never leaves a header pointing at unflushed content —
/// the `before_header` sync policy spec.md §9's Open Question defers to.
pub struct MergeTarget {
    bf: BlockFile,
    docs: BTreeMap<Vec<u8>, Document>,
    update_seq: u64,
}

impl MergeTarget {
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(blockfile::BlockFileError::Io)?;
        }
        let mut bf = BlockFile::open_or_create(path)?;
        let mut docs = BTreeMap::new();
        let mut update_seq = 0;

        if let Some((header, _)) = bf.read_trailing_header()? {
            update_seq = header.update_seq;
            if let Some(root) = header.by_id_root {
                let node = bptree::open_at(&mut bf, root.offset, 0)?;
                if node.kind == NodeKind::Leaf {
                    for (key, value) in &node.entries {
                        let doc = Document::from_entry(key, value)?;
                        docs.insert(doc.id.clone(), doc);
                    }
                }
            }
        }

        Ok(MergeTarget {
            bf,
            docs,
            update_seq,
        })
    }

    /// Merge a batch of documents in and flush immediately: append a
    /// refreshed by-id leaf, fsync the data, then write+fsync a new
    /// header pointing at it (spec.md §4.6 step 2).
    pub fn apply_batch(&mut self, batch: &[Document]) -> Result<()> {
        for doc in batch {
            self.docs
                .entry(doc.id.clone())
                .and_modify(|existing| existing.merge_from(doc))
                .or_insert_with(|| doc.clone());
            self.update_seq += 1;
        }

        let entries = self.docs.values().map(Document::to_entry).collect();
        let leaf = encode_leaf(entries);
        let offset = self.bf.append_term(&eterm::encode(&leaf))?;
        self.bf.sync_data()?;

        let header = Header {
            update_seq: self.update_seq,
            by_id_root: Some(RootPtr {
                offset,
                reduction: Vec::new(),
            }),
            by_seq_root: None,
            opaque: Vec::new(),
        };
        self.bf.write_header(&header)?;
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    /// Release the handle. `BlockFile`'s own `Drop` closes the underlying
    /// file on every exit path, including this one.
    pub fn close(self) {}
}
