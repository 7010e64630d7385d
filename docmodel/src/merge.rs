use blockfile::BlockFile;
use bptree::{Node, NodeKind};

use crate::document::Document;
use crate::error::Result;
use crate::target::MergeTarget;

/// Documents are applied to the target in batches of this size (spec.md
/// §6, `merge_to_file`).
pub const BATCH_SIZE: usize = 1000;

/// Fold the by-id tree rooted at `source_root` into `target`, re-reading
/// each document's leaf revisions and applying them as replicated changes
/// with a full commit per batch. `source_root` is expected to be a
/// `kv_node` leaf — the only kind the Signature Scanner ever emits (spec.md
/// §4.4) — but an interior root is tolerated by merging each child leaf in
/// turn, in case a caller passes a root recovered some other way (e.g. Header
/// Repair's by-id root).
pub fn fold_by_id_into(
    source: &mut BlockFile,
    source_root: &Node,
    target: &mut MergeTarget,
) -> Result<usize> {
    let mut total = 0;
    fold_node(source, source_root, target, &mut total)?;
    Ok(total)
}

fn fold_node(
    source: &mut BlockFile,
    node: &Node,
    target: &mut MergeTarget,
    total: &mut usize,
) -> Result<()> {
    match node.kind {
        NodeKind::Leaf => {
            let docs = node
                .entries
                .iter()
                .map(|(k, v)| Document::from_entry(k, v))
                .collect::<Result<Vec<_>>>()?;
            for batch in docs.chunks(BATCH_SIZE) {
                target.apply_batch(batch)?;
                *total += batch.len();
            }
            Ok(())
        }
        NodeKind::Interior => {
            for (_, value) in &node.entries {
                let child_offset = node.child_pointer(value)?;
                let child = bptree::open_at(source, child_offset, 0)?;
                fold_node(source, &child, target, total)?;
            }
            Ok(())
        }
    }
}
