use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

use crate::error::{BlockFileError, Result};

/// A tree root pointer: an offset into the file plus the opaque cached
/// reduction attached to that subtree. Repair never recomputes the
/// reduction bytes, only copies them forward (spec.md §4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPtr {
    pub offset: u64,
    pub reduction: Vec<u8>,
}

/// The header record. Everything outside the two tree roots and the
/// update sequence is opaque to repair and is copied forward verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub update_seq: u64,
    pub by_id_root: Option<RootPtr>,
    pub by_seq_root: Option<RootPtr>,
    /// Catch-all for the other header fields this core never interprets.
    pub opaque: Vec<u8>,
}

impl Header {
    pub fn empty() -> Self {
        Header {
            update_seq: 0,
            by_id_root: None,
            by_seq_root: None,
            opaque: Vec::new(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u64::<BigEndian>(self.update_seq).unwrap();
        encode_root(&mut out, &self.by_id_root);
        encode_root(&mut out, &self.by_seq_root);
        out.write_u32::<BigEndian>(self.opaque.len() as u32).unwrap();
        out.extend_from_slice(&self.opaque);
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let update_seq = cursor.read_u64::<BigEndian>().map_err(|_| malformed())?;
        let by_id_root = decode_root(&mut cursor)?;
        let by_seq_root = decode_root(&mut cursor)?;
        let opaque_len = cursor.read_u32::<BigEndian>().map_err(|_| malformed())? as usize;
        let mut opaque = vec![0u8; opaque_len];
        std::io::Read::read_exact(&mut cursor, &mut opaque).map_err(|_| malformed())?;
        Ok(Header {
            update_seq,
            by_id_root,
            by_seq_root,
            opaque,
        })
    }
}

fn malformed() -> BlockFileError {
    BlockFileError::MalformedHeader(0)
}

fn encode_root(out: &mut Vec<u8>, root: &Option<RootPtr>) {
    match root {
        Some(r) => {
            out.push(1);
            out.write_u64::<BigEndian>(r.offset).unwrap();
            out.write_u32::<BigEndian>(r.reduction.len() as u32).unwrap();
            out.extend_from_slice(&r.reduction);
        }
        None => out.push(0),
    }
}

fn decode_root(cursor: &mut Cursor<&[u8]>) -> Result<Option<RootPtr>> {
    let present = cursor.read_u8().map_err(|_| malformed())?;
    if present == 0 {
        return Ok(None);
    }
    let offset = cursor.read_u64::<BigEndian>().map_err(|_| malformed())?;
    let reduction_len = cursor.read_u32::<BigEndian>().map_err(|_| malformed())? as usize;
    let mut reduction = vec![0u8; reduction_len];
    std::io::Read::read_exact(cursor, &mut reduction).map_err(|_| malformed())?;
    Ok(Some(RootPtr { offset, reduction }))
}
