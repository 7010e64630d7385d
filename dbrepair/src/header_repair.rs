use blockfile::{BlockFile, Header, RootPtr};
use eterm::Term;

use crate::classify::TreeKind;
use crate::error::Result;
use crate::tail_scan::tail_scan;

/// Outcome of a repair attempt (spec.md §6).
#[derive(Debug)]
pub enum RepairOutcome {
    /// No header at all — caller may escalate to lost-and-found.
    NoHeader,
    /// A header exists and nothing beyond it needs repairing.
    Ok,
    /// A new header was written. Carries the chosen root offsets and the
    /// last keys that justified them. `by_id_offset`/`by_id_last_key` are
    /// `None` when neither a fresh by-id tail-scan hit nor the previous
    /// header supplied one — the by-seq tree was repaired on its own.
    Repaired {
        by_seq_offset: u64,
        by_seq_last_key: i64,
        by_id_offset: Option<u64>,
        by_id_last_key: Option<Vec<u8>>,
    },
}

/// Run Header Repair against an already-open file (spec.md §4.5).
pub fn repair_header(bf: &mut BlockFile) -> Result<RepairOutcome> {
    let (prev_header, prev_offset) = match bf.read_trailing_header()? {
        Some(h) => h,
        None => return Ok(RepairOutcome::NoHeader),
    };

    let file_size = bf.file_size()?;
    let by_seq_hit = match tail_scan(bf, TreeKind::BySeq, file_size) {
        Some(hit) => hit,
        None => return Ok(RepairOutcome::Ok),
    };
    if by_seq_hit.offset <= prev_offset {
        return Ok(RepairOutcome::Ok);
    }

    let by_id_hit = tail_scan(bf, TreeKind::ById, file_size);

    let update_seq = match &by_seq_hit.last_key {
        Term::Integer(i) => *i,
        _ => 0,
    };
    let by_id_last_key = match by_id_hit.as_ref().map(|h| &h.last_key) {
        Some(Term::Binary(b)) => Some(b.clone()),
        _ => None,
    };

    let prev_by_seq_reduction = prev_header
        .by_seq_root
        .as_ref()
        .map(|r| r.reduction.clone())
        .unwrap_or_default();

    // A fresh tail-scan hit wins; otherwise keep whatever the previous
    // header already pointed at (which may itself be `None` if the by-id
    // tree has never been found). We never synthesize an offset — a
    // `by_id_root` pointing at a made-up position would decode to garbage.
    let by_id_root = match &by_id_hit {
        Some(hit) => Some(RootPtr {
            offset: hit.offset,
            reduction: prev_header
                .by_id_root
                .as_ref()
                .map(|r| r.reduction.clone())
                .unwrap_or_default(),
        }),
        None => prev_header.by_id_root.clone(),
    };
    let by_id_offset = by_id_root.as_ref().map(|r| r.offset);

    let new_header = Header {
        update_seq: update_seq as u64,
        by_id_root,
        by_seq_root: Some(RootPtr {
            offset: by_seq_hit.offset,
            reduction: prev_by_seq_reduction,
        }),
        opaque: prev_header.opaque,
    };
    bf.write_header(&new_header)?;

    Ok(RepairOutcome::Repaired {
        by_seq_offset: by_seq_hit.offset,
        by_seq_last_key: update_seq,
        by_id_offset,
        by_id_last_key,
    })
}
