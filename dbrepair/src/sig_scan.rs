use blockfile::{BlockFile, BLOCK_SIZE};
use eterm::Term;

/// The full 13-byte on-disk signature of a `kv_node` term (spec.md §3, §6).
pub const KV_NODE_SIGNATURE: [u8; 13] = [
    0x83, 0x68, 0x02, 0x64, 0x00, 0x07, b'k', b'v', b'_', b'n', b'o', b'd', b'e',
];

/// Size of each backward read during the signature scan (spec.md §6).
pub const SCAN_CHUNK_SIZE: u64 = 1_048_576;

/// A document-bearing leaf accepted by the Node Acceptor.
pub struct FoundLeaf {
    pub offset: u64,
    pub first_key: Vec<u8>,
}

/// Does the signature match at `abs_offset`, either fully or as one of the
/// twelve truncated alternatives spec.md §4.4 describes? `window` must
/// contain at least `KV_NODE_SIGNATURE.len()` bytes starting at the
/// position corresponding to `abs_offset`, or as many as are available
/// near EOF.
fn signature_matches(abs_offset: u64, window: &[u8]) -> bool {
    let full_len = KV_NODE_SIGNATURE.len();
    if window.len() >= full_len && window[..full_len] == KV_NODE_SIGNATURE {
        return true;
    }
    // Truncated alternatives: lengths 12 down to 1. Alternative of length L
    // matches only when the remaining (full_len - L) signature bytes would
    // have been pushed past a block boundary, i.e. when this position sits
    // exactly L bytes before the next multiple of BLOCK_SIZE.
    for truncated_len in (1..full_len).rev() {
        let remainder = (BLOCK_SIZE - (abs_offset % BLOCK_SIZE)) as usize;
        if remainder != truncated_len {
            continue;
        }
        if window.len() >= truncated_len && window[..truncated_len] == KV_NODE_SIGNATURE[..truncated_len] {
            return true;
        }
    }
    false
}

/// Attempt to decode and classify the candidate offset `c` as a salvageable
/// by-id leaf (spec.md §4.4's Node Acceptor). Retries once at `c - 1` on a
/// first decode failure, to recover from a block boundary landing between
/// the length prefix and the term.
fn accept_node(bf: &mut BlockFile, c: i64, retried: bool) -> Option<FoundLeaf> {
    if c < 0 {
        return None;
    }
    let candidate = c as u64;
    let term_bytes = match bf.read_term_at(candidate) {
        Ok(bytes) => bytes,
        Err(_) if !retried => return accept_node(bf, c - 1, true),
        Err(_) => return None,
    };
    let term = match eterm::decode(&term_bytes) {
        Ok(t) => t,
        Err(_) if !retried => return accept_node(bf, c - 1, true),
        Err(_) => return None,
    };

    let items = term.as_tuple()?;
    if items.len() != 2 || items[0].as_atom() != Some("kv_node") {
        return None;
    }
    let entries = items[1].as_list()?;
    let first_entry = entries.first()?;
    let pair = first_entry.as_tuple()?;
    if pair.len() != 2 {
        return None;
    }
    let key = pair[0].as_binary()?;
    if key.starts_with(b"_local/") {
        return None;
    }

    let offset = blockfile::content_offset(candidate, 4);
    Some(FoundLeaf {
        offset,
        first_key: key.to_vec(),
    })
}

/// Scan the file backward in `SCAN_CHUNK_SIZE` chunks (newest chunk first;
/// within a chunk, positions low-to-high) looking for every offset whose
/// bytes match the `kv_node` signature or one of its block-boundary
/// truncations, then run the Node Acceptor on each candidate (spec.md
/// §4.4). Returns accepted leaves in chunk-discovery order; callers treat
/// the result as an unordered set of roots.
pub fn scan_for_kv_node_leaves(bf: &mut BlockFile) -> std::io::Result<Vec<FoundLeaf>> {
    let file_size = bf.file_size().map_err(to_io_error)?;
    let sig_len = KV_NODE_SIGNATURE.len() as u64;
    let mut found = Vec::new();

    let mut chunk_end = file_size;
    while chunk_end > 0 {
        let chunk_start = chunk_end.saturating_sub(SCAN_CHUNK_SIZE);
        // Extend the read past the chunk's nominal end by the signature
        // length so a match starting near the chunk's tail can still see
        // its full window without a second read.
        let read_len = ((chunk_end - chunk_start) + sig_len).min(file_size - chunk_start);
        let bytes = bf
            .read_raw(chunk_start, read_len as usize)
            .map_err(to_io_error)?;

        for p in 0..(chunk_end - chunk_start) {
            let abs_offset = chunk_start + p;
            let window_start = p as usize;
            let window = &bytes[window_start..];
            if signature_matches(abs_offset, window) {
                let candidate = abs_offset as i64 - 4;
                if let Some(leaf) = accept_node(bf, candidate, false) {
                    found.push(leaf);
                }
            }
        }

        chunk_end = chunk_start;
    }

    Ok(found)
}

fn to_io_error(e: blockfile::BlockFileError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
