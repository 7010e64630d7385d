use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{BlockFileError, Result};
use crate::header::Header;

/// Block size of the underlying file format (spec.md §6).
pub const BLOCK_SIZE: u64 = 4096;

/// Marker byte written as the first byte of a block that starts a header,
/// as opposed to the implicit 0x00 prefix byte every other block boundary
/// carries ahead of ordinary term data.
const HEADER_MARKER: u8 = 0x01;
const DATA_MARKER: u8 = 0x00;

/// Reject absurd length prefixes before allocating — guards decode attempts
/// at bogus offsets from trying to read gigabytes into memory.
const MAX_TERM_LEN: usize = 64 * 1024 * 1024;

fn is_boundary(pos: u64) -> bool {
    pos % BLOCK_SIZE == 0
}

/// Advance `start` by `content_len` logical (non-prefix) bytes, returning
/// the physical offset just past the span. Used to find where a term's
/// content begins after its length prefix, and to bound-check reads before
/// touching the file.
fn advance(mut start: u64, mut content_len: u64) -> u64 {
    while content_len > 0 {
        if is_boundary(start) {
            start += 1;
            continue;
        }
        let boundary = (start / BLOCK_SIZE + 1) * BLOCK_SIZE;
        let take = (boundary - start).min(content_len);
        start += take;
        content_len -= take;
    }
    start
}

fn align_up_to_block(pos: u64) -> u64 {
    if is_boundary(pos) {
        pos
    } else {
        (pos / BLOCK_SIZE + 1) * BLOCK_SIZE
    }
}

/// Physical offset of the first content byte of a span of `logical_len`
/// bytes starting at `start`. Exposed so callers that only ever see a
/// "decode point" (e.g. the Tail Scanner's `P`) can recover the matching
/// term-start offset (`O`) the B-tree reader expects, without duplicating
/// the block-marker skipping rules here.
pub fn content_offset(start: u64, logical_len: u64) -> u64 {
    advance(start, logical_len)
}

/// Append-only block-structured file. Every physical byte position that is
/// a multiple of [`BLOCK_SIZE`] holds a one-byte block marker rather than
/// term content; ordinary appends transparently skip over these markers
/// when framing a term's length prefix or body, which is what lets a
/// `kv_node` term's on-disk signature straddle a block boundary (spec.md
/// §3).
pub struct BlockFile {
    file: File,
    /// Next free physical write position (== current physical EOF).
    pos: u64,
}

impl BlockFile {
    /// Open an existing file for read+write. Fails if the file does not
    /// exist.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::from_file(file)
    }

    /// Open a file for read+write, creating it if absent.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Self::from_file(file)
    }

    /// Open read-only. Used by scan/repair entry points that never write.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Self::from_file(file)
    }

    fn from_file(file: File) -> Result<Self> {
        let pos = file.metadata()?.len();
        Ok(BlockFile { file, pos })
    }

    pub fn file_size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Append a single fully-encoded term (version byte included), framed
    /// with a 4-byte big-endian length prefix. Returns the physical offset
    /// of the term's first byte — the `O` spec.md refers to, not the
    /// offset of the length prefix.
    pub fn append_term(&mut self, term_bytes: &[u8]) -> Result<u64> {
        let mut framed = Vec::with_capacity(4 + term_bytes.len());
        framed
            .write_u32::<BigEndian>(term_bytes.len() as u32)
            .unwrap();
        framed.extend_from_slice(term_bytes);

        let prefix_start = self.write_content(&framed)?;
        Ok(advance(prefix_start, 4))
    }

    /// Write raw logical content starting at the current write cursor,
    /// inserting a block-marker byte whenever the cursor crosses a
    /// [`BLOCK_SIZE`] boundary. Returns the physical offset of the first
    /// content byte actually written.
    fn write_content(&mut self, data: &[u8]) -> Result<u64> {
        let mut p = self.pos;
        let mut buf = Vec::with_capacity(data.len() + data.len() / (BLOCK_SIZE as usize - 1) + 1);
        let mut content_start = None;

        for &byte in data {
            if is_boundary(p) {
                buf.push(DATA_MARKER);
                p += 1;
            }
            if content_start.is_none() {
                content_start = Some(p);
            }
            buf.push(byte);
            p += 1;
        }
        let content_start = content_start.unwrap_or_else(|| {
            let mut q = self.pos;
            if is_boundary(q) {
                q += 1;
            }
            q
        });

        self.file.seek(SeekFrom::Start(self.pos))?;
        self.file.write_all(&buf)?;
        self.pos = p;
        Ok(content_start)
    }

    /// Read `len` logical content bytes starting at `physical_start`,
    /// skipping any block-marker bytes encountered along the way. Returns
    /// the bytes and the physical offset just past them.
    fn read_content_at(&mut self, physical_start: u64, len: usize) -> Result<(Vec<u8>, u64)> {
        let file_size = self.file_size()?;
        let end = advance(physical_start, len as u64);
        if end > file_size {
            return Err(BlockFileError::TruncatedTerm {
                offset: physical_start,
                needed: len,
                available: file_size.saturating_sub(physical_start) as usize,
            });
        }

        let mut result = Vec::with_capacity(len);
        let mut p = physical_start;
        while result.len() < len {
            if is_boundary(p) {
                p += 1;
                continue;
            }
            let boundary = (p / BLOCK_SIZE + 1) * BLOCK_SIZE;
            let want = ((boundary - p) as usize).min(len - result.len());
            let mut chunk = vec![0u8; want];
            self.file.seek(SeekFrom::Start(p))?;
            self.file.read_exact(&mut chunk)?;
            result.extend_from_slice(&chunk);
            p += want as u64;
        }
        Ok((result, p))
    }

    /// Decode-ready term bytes (version byte through the last content
    /// byte) for the term whose length prefix begins at `physical_pos`.
    /// This is the "term reader" the Tail Scanner and Signature Scanner's
    /// Node Acceptor both drive.
    pub fn read_term_at(&mut self, physical_pos: u64) -> Result<Vec<u8>> {
        let (len_bytes, after_len) = self.read_content_at(physical_pos, 4)?;
        let length = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
        if length == 0 || length > MAX_TERM_LEN {
            return Err(BlockFileError::TruncatedTerm {
                offset: physical_pos,
                needed: length,
                available: 0,
            });
        }
        let (term_bytes, _after_term) = self.read_content_at(after_len, length)?;
        Ok(term_bytes)
    }

    /// Raw physical bytes with no block-marker interpretation — exactly
    /// what's on disk. This is what the Signature Scanner matches against.
    pub fn read_raw(&mut self, physical_offset: u64, len: usize) -> Result<Vec<u8>> {
        let file_size = self.file_size()?;
        let want = (len as u64).min(file_size.saturating_sub(physical_offset)) as usize;
        let mut buf = vec![0u8; want];
        self.file.seek(SeekFrom::Start(physical_offset))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Force pending writes to durable storage without writing a header.
    /// Used by callers (e.g. the lost-and-found merge target) that need a
    /// sync-before-header-write policy distinct from `write_header`'s own
    /// implicit fsync.
    pub fn sync_data(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Append a new header, block-aligned, and fsync it. Returns the
    /// header's block offset.
    pub fn write_header(&mut self, header: &Header) -> Result<u64> {
        let block_start = align_up_to_block(self.pos);
        if self.pos < block_start {
            let pad = vec![0u8; (block_start - self.pos) as usize];
            self.file.seek(SeekFrom::Start(self.pos))?;
            self.file.write_all(&pad)?;
        }

        let encoded = header.encode();
        if encoded.len() + 1 > BLOCK_SIZE as usize {
            return Err(BlockFileError::MalformedHeader(block_start));
        }
        let mut block = vec![0u8; BLOCK_SIZE as usize];
        block[0] = HEADER_MARKER;
        block[1..1 + encoded.len()].copy_from_slice(&encoded);

        self.file.seek(SeekFrom::Start(block_start))?;
        self.file.write_all(&block)?;
        self.file.sync_all()?;
        self.pos = block_start + BLOCK_SIZE;
        Ok(block_start)
    }

    /// Scan backward from EOF, one block at a time, for the newest block
    /// carrying the header marker. Returns the header and its block
    /// offset, or `Ok(None)` if the file has no header at all.
    pub fn read_trailing_header(&mut self) -> Result<Option<(Header, u64)>> {
        let file_size = self.file_size()?;
        if file_size < BLOCK_SIZE {
            return Ok(None);
        }

        let mut block_start = (file_size / BLOCK_SIZE) * BLOCK_SIZE;
        if block_start == file_size {
            // EOF lands exactly on a boundary; the last full block is the
            // one before it.
            if block_start == 0 {
                return Ok(None);
            }
            block_start -= BLOCK_SIZE;
        }

        loop {
            let mut block = vec![0u8; BLOCK_SIZE as usize];
            self.file.seek(SeekFrom::Start(block_start))?;
            self.file.read_exact(&mut block)?;

            if block[0] == HEADER_MARKER {
                if let Ok(header) = Header::decode(&block[1..]) {
                    return Ok(Some((header, block_start)));
                }
            }

            if block_start == 0 {
                break;
            }
            block_start -= BLOCK_SIZE;
        }
        Ok(None)
    }
}
