//! LEB128-style unsigned varints: 7 payload bits per byte, least significant
//! group first, high bit set on every byte except the last.

use std::io::{self, Read, Write};

/// Longest encoding of a `u32`.
pub const MAX_VARINT_LEN: usize = 5;

/// Upper bound on the ids reserved ahead of decoding; the count comes from
/// an on-disk row and is not trusted past this.
const MAX_PREALLOC: usize = 4096;

pub fn encode_u32(mut value: u32, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

pub fn write_u32<W: Write>(w: &mut W, value: u32) -> io::Result<usize> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    encode_u32(value, &mut buf);
    w.write_all(&buf)?;
    Ok(buf.len())
}

/// Reads one varint. A stream that ends mid-value, or a value that does not
/// fit in 32 bits, is reported as `InvalidData`/`UnexpectedEof`.
pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut value: u32 = 0;
    let mut byte = [0u8; 1];
    for i in 0..MAX_VARINT_LEN {
        r.read_exact(&mut byte)?;
        let payload = u32::from(byte[0] & 0x7f);
        let shift = 7 * i as u32;
        if i == MAX_VARINT_LEN - 1 && payload > 0x0f {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "varint overflows u32"));
        }
        value |= payload << shift;
        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(io::Error::new(io::ErrorKind::InvalidData, "varint longer than 5 bytes"))
}

/// Gap-encodes an ascending, duplicate-free id list: the first value is
/// absolute, every later one is the difference from its predecessor.
pub fn encode_gaps(ids: &[u32], out: &mut Vec<u8>) {
    let mut prev = 0;
    for (i, &id) in ids.iter().enumerate() {
        let gap = if i == 0 { id } else { id - prev };
        encode_u32(gap, out);
        prev = id;
    }
}

/// Reads `count` gap-encoded values back into absolute ids.
pub fn decode_gaps<R: Read>(r: &mut R, count: u32) -> io::Result<Vec<u32>> {
    let mut ids = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
    let mut cur: u32 = 0;
    for i in 0..count {
        let gap = read_u32(r)?;
        cur = if i == 0 {
            gap
        } else {
            cur.checked_add(gap)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "doc id overflows u32"))?
        };
        ids.push(cur);
    }
    Ok(ids)
}
