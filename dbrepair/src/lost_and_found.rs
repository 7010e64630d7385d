use blockfile::BlockFile;
use docmodel::MergeTarget;

use crate::sig_scan::scan_for_kv_node_leaves;

/// Per-root outcome of a lost-and-found run, for callers that want to
/// report progress rather than just a final count.
pub struct RootResult {
    pub offset: u64,
    pub outcome: std::result::Result<usize, String>,
}

/// Drive lost-and-found recovery: signature-scan `source` for candidate
/// by-id leaves, then merge each one into `target` independently. A
/// failure on one root is logged and does not abort the rest (spec.md
/// §4.6).
pub fn run_lost_and_found(
    source: &mut BlockFile,
    target: &mut MergeTarget,
) -> std::io::Result<Vec<RootResult>> {
    let leaves = scan_for_kv_node_leaves(source)?;
    let mut results = Vec::with_capacity(leaves.len());

    for leaf in leaves {
        let outcome = (|| -> docmodel::Result<usize> {
            let node = bptree::open_at(source, leaf.offset, 0)
                .map_err(docmodel::DocModelError::from)?;
            docmodel::fold_by_id_into(source, &node, target)
        })();

        match outcome {
            Ok(n) => {
                eprintln!("lost+found: root at {} merged {n} documents", leaf.offset);
                results.push(RootResult {
                    offset: leaf.offset,
                    outcome: Ok(n),
                });
            }
            Err(e) => {
                eprintln!("lost+found: root at {} failed: {e}", leaf.offset);
                results.push(RootResult {
                    offset: leaf.offset,
                    outcome: Err(e.to_string()),
                });
            }
        }
    }

    Ok(results)
}
