use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

use crate::error::{EtermError, Result};
use crate::term::Term;

pub const TAG_VERSION: u8 = 131; // 0x83
const TAG_SMALL_INT: u8 = 97; // 0x61
const TAG_INT: u8 = 98; // 0x62
const TAG_SMALL_BIG: u8 = 110; // 0x6e
const TAG_ATOM: u8 = 100; // 0x64
const TAG_SMALL_TUPLE: u8 = 104; // 0x68
const TAG_LARGE_TUPLE: u8 = 105; // 0x69
const TAG_NIL: u8 = 106; // 0x6a
const TAG_BINARY: u8 = 109; // 0x6d
const TAG_LIST: u8 = 108; // 0x6c

/// Encode a term to its full on-disk representation, including the leading
/// version byte (0x83). This is the byte sequence `blockfile` appends after
/// its own 4-byte length prefix.
pub fn encode(term: &Term) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(TAG_VERSION);
    encode_inner(term, &mut out);
    out
}

fn encode_inner(term: &Term, out: &mut Vec<u8>) {
    match term {
        Term::Integer(v) => encode_integer(*v, out),
        Term::Binary(b) => {
            out.push(TAG_BINARY);
            out.write_u32::<BigEndian>(b.len() as u32).unwrap();
            out.extend_from_slice(b);
        }
        Term::Atom(name) => {
            out.push(TAG_ATOM);
            out.write_u16::<BigEndian>(name.len() as u16).unwrap();
            out.extend_from_slice(name.as_bytes());
        }
        Term::Tuple(items) => {
            if items.len() <= u8::MAX as usize {
                out.push(TAG_SMALL_TUPLE);
                out.push(items.len() as u8);
            } else {
                out.push(TAG_LARGE_TUPLE);
                out.write_u32::<BigEndian>(items.len() as u32).unwrap();
            }
            for item in items {
                encode_inner(item, out);
            }
        }
        Term::List(items) => {
            if items.is_empty() {
                out.push(TAG_NIL);
                return;
            }
            out.push(TAG_LIST);
            out.write_u32::<BigEndian>(items.len() as u32).unwrap();
            for item in items {
                encode_inner(item, out);
            }
            out.push(TAG_NIL);
        }
    }
}

fn encode_integer(v: i64, out: &mut Vec<u8>) {
    if (0..=255).contains(&v) {
        out.push(TAG_SMALL_INT);
        out.push(v as u8);
    } else if (i32::MIN as i64..=i32::MAX as i64).contains(&v) {
        out.push(TAG_INT);
        out.write_i32::<BigEndian>(v as i32).unwrap();
    } else {
        // SMALL_BIG_EXT: sign byte + little-endian magnitude digits.
        let sign: u8 = if v < 0 { 1 } else { 0 };
        let mut mag = v.unsigned_abs();
        let mut digits = Vec::new();
        while mag > 0 {
            digits.push((mag & 0xff) as u8);
            mag >>= 8;
        }
        out.push(TAG_SMALL_BIG);
        out.push(digits.len() as u8);
        out.push(sign);
        out.extend_from_slice(&digits);
    }
}

/// Decode a single term from a byte slice that begins with the version
/// byte. Returns an error on trailing bytes: every term `blockfile` hands
/// back is expected to be exactly one complete term, matching how it was
/// written.
pub fn decode(bytes: &[u8]) -> Result<Term> {
    let mut cursor = Cursor::new(bytes);
    let version = cursor.read_u8()?;
    if version != TAG_VERSION {
        return Err(EtermError::BadVersion {
            expected: TAG_VERSION,
            found: version,
        });
    }
    let term = decode_inner(&mut cursor)?;
    if (cursor.position() as usize) != bytes.len() {
        return Err(EtermError::TrailingBytes);
    }
    Ok(term)
}

fn decode_inner(cursor: &mut Cursor<&[u8]>) -> Result<Term> {
    let tag = cursor.read_u8()?;
    match tag {
        TAG_SMALL_INT => Ok(Term::Integer(cursor.read_u8()? as i64)),
        TAG_INT => Ok(Term::Integer(cursor.read_i32::<BigEndian>()? as i64)),
        TAG_SMALL_BIG => {
            let len = cursor.read_u8()? as usize;
            let sign = cursor.read_u8()?;
            let mut digits = vec![0u8; len];
            cursor.read_exact(&mut digits)?;
            let mut mag: i64 = 0;
            for &d in digits.iter().rev() {
                mag = (mag << 8) | d as i64;
            }
            Ok(Term::Integer(if sign == 0 { mag } else { -mag }))
        }
        TAG_ATOM => {
            let len = cursor.read_u16::<BigEndian>()? as usize;
            let mut buf = vec![0u8; len];
            cursor.read_exact(&mut buf)?;
            String::from_utf8(buf)
                .map(Term::Atom)
                .map_err(|_| EtermError::InvalidAtomUtf8)
        }
        TAG_SMALL_TUPLE => {
            let arity = cursor.read_u8()? as usize;
            decode_tuple(cursor, arity)
        }
        TAG_LARGE_TUPLE => {
            let arity = cursor.read_u32::<BigEndian>()? as usize;
            decode_tuple(cursor, arity)
        }
        TAG_NIL => Ok(Term::List(Vec::new())),
        TAG_BINARY => {
            let len = cursor.read_u32::<BigEndian>()? as usize;
            let mut buf = vec![0u8; len];
            cursor.read_exact(&mut buf)?;
            Ok(Term::Binary(buf))
        }
        TAG_LIST => {
            let len = cursor.read_u32::<BigEndian>()? as usize;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_inner(cursor)?);
            }
            // Proper list: consume the NIL tail.
            let tail_tag = cursor.read_u8()?;
            if tail_tag != TAG_NIL {
                return Err(EtermError::UnknownTag(tail_tag));
            }
            Ok(Term::List(items))
        }
        other => Err(EtermError::UnknownTag(other)),
    }
}

fn decode_tuple(cursor: &mut Cursor<&[u8]>, arity: usize) -> Result<Term> {
    let mut items = Vec::with_capacity(arity);
    for _ in 0..arity {
        items.push(decode_inner(cursor)?);
    }
    Ok(Term::Tuple(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_kv_node_shape() {
        let term = Term::Tuple(vec![
            Term::atom("kv_node"),
            Term::List(vec![Term::Tuple(vec![
                Term::Binary(b"doc-1".to_vec()),
                Term::Integer(42),
            ])]),
        ]);
        let bytes = encode(&term);
        assert_eq!(decode(&bytes).unwrap(), term);
    }

    #[test]
    fn kv_node_signature_matches_spec_bytes() {
        let term = Term::Tuple(vec![Term::atom("kv_node"), Term::List(vec![])]);
        let bytes = encode(&term);
        assert_eq!(
            &bytes[..13],
            &[
                0x83, 0x68, 0x02, 0x64, 0x00, 0x07, b'k', b'v', b'_', b'n', b'o', b'd', b'e'
            ]
        );
    }

    #[test]
    fn kp_node_shares_prefix_but_not_atom_bytes() {
        let kv = encode(&Term::Tuple(vec![Term::atom("kv_node"), Term::List(vec![])]));
        let kp = encode(&Term::Tuple(vec![Term::atom("kp_node"), Term::List(vec![])]));
        assert_eq!(&kv[..6], &kp[..6]);
        assert_ne!(kv[6], kp[6]);
    }

    #[test]
    fn rejects_bad_version_byte() {
        let bytes = vec![0x00, 0x6a];
        assert!(matches!(decode(&bytes), Err(EtermError::BadVersion { .. })));
    }

    #[test]
    fn large_integer_round_trips_via_small_big() {
        let term = Term::Integer(9_000_000_000);
        let bytes = encode(&term);
        assert_eq!(decode(&bytes).unwrap(), term);
        let term = Term::Integer(-9_000_000_000);
        let bytes = encode(&term);
        assert_eq!(decode(&bytes).unwrap(), term);
    }
}
