//! Six-bit packing shared by graph6 and sparse6.

use crate::errors::GraphError;

const BIAS: u8 = 63;
const LONG_MARK: u8 = 126;
const MAX_SHORT: usize = 62;
const MAX_MEDIUM: usize = 258_047;
pub const MAX_VERTICES: usize = 68_719_476_735;

/// Appends the `N(n)` vertex-count field.
pub fn encode_count(n: usize, out: &mut Vec<u8>) -> Result<(), GraphError> {
    if n <= MAX_SHORT {
        out.push(n as u8 + BIAS);
        return Ok(());
    }
    let groups = if n <= MAX_MEDIUM {
        out.push(LONG_MARK);
        3
    } else if n <= MAX_VERTICES {
        out.extend_from_slice(&[LONG_MARK, LONG_MARK]);
        6
    } else {
        return Err(GraphError::illegal_argument(format!(
            "{n} vertices exceed the graph6 limit"
        )));
    };
    for group in (0..groups).rev() {
        out.push(((n >> (6 * group)) & 0x3f) as u8 + BIAS);
    }
    Ok(())
}

/// Parses `N(n)`; returns the count and the number of bytes consumed.
pub fn decode_count(bytes: &[u8]) -> Result<(usize, usize), GraphError> {
    let first = *bytes
        .first()
        .ok_or_else(|| GraphError::io("missing vertex count"))?;
    if first != LONG_MARK {
        return Ok((usize::from(check(first)?), 1));
    }
    let (start, groups) = if bytes.get(1) == Some(&LONG_MARK) {
        (2, 6)
    } else {
        (1, 3)
    };
    let field = bytes
        .get(start..start + groups)
        .ok_or_else(|| GraphError::io("truncated vertex count"))?;
    let mut n = 0usize;
    for &byte in field {
        n = (n << 6) | usize::from(check(byte)?);
    }
    Ok((n, start + groups))
}

fn check(byte: u8) -> Result<u8, GraphError> {
    if (BIAS..=LONG_MARK).contains(&byte) {
        Ok(byte - BIAS)
    } else {
        Err(GraphError::io(format!("byte {byte:#04x} outside the printable range")))
    }
}

/// Bits needed to write any value below `n`.
pub fn width(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    current: u8,
    filled: u32,
}

impl BitWriter {
    pub fn push(&mut self, bit: bool) {
        self.current = (self.current << 1) | u8::from(bit);
        self.filled += 1;
        if self.filled == 6 {
            self.out.push(self.current + BIAS);
            self.current = 0;
            self.filled = 0;
        }
    }

    /// Writes the low `count` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: usize, count: u32) {
        for shift in (0..count).rev() {
            self.push((value >> shift) & 1 == 1);
        }
    }

    /// Bits still missing from the final six-bit group.
    pub fn pending(&self) -> u32 {
        if self.filled == 0 { 0 } else { 6 - self.filled }
    }

    /// Completes the last group with `fill` bits.
    pub fn finish(mut self, fill: bool) -> Vec<u8> {
        while self.filled != 0 {
            self.push(fill);
        }
        self.out
    }
}

pub struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    bit: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, GraphError> {
        for &byte in bytes {
            check(byte)?;
        }
        Ok(Self {
            bytes,
            pos: 0,
            bit: 0,
        })
    }

    pub fn remaining(&self) -> usize {
        (self.bytes.len() - self.pos) * 6 - self.bit as usize
    }

    pub fn next_bit(&mut self) -> Option<bool> {
        let byte = self.bytes.get(self.pos)? - BIAS;
        let bit = (byte >> (5 - self.bit)) & 1 == 1;
        self.bit += 1;
        if self.bit == 6 {
            self.bit = 0;
            self.pos += 1;
        }
        Some(bit)
    }

    pub fn read_bits(&mut self, count: u32) -> Option<usize> {
        let mut value = 0usize;
        for _ in 0..count {
            value = (value << 1) | usize::from(self.next_bit()?);
        }
        Some(value)
    }
}
