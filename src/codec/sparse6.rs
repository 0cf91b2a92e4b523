use crate::errors::GraphError;

use super::bits::{BitReader, BitWriter, decode_count, encode_count, width};

pub(super) const MARKER: u8 = b':';

/// Encodes an undirected multigraph; loops and repeated pairs are allowed.
pub(super) fn encode(n: usize, edges: &[(usize, usize)]) -> Result<Vec<u8>, GraphError> {
    let mut sorted: Vec<(usize, usize)> = edges
        .iter()
        .map(|&(a, b)| (a.max(b), a.min(b)))
        .collect();
    sorted.sort_unstable();

    let mut out = vec![MARKER];
    encode_count(n, &mut out)?;
    let k = width(n);
    let mut writer = BitWriter::default();
    let mut current = 0usize;
    for &(v, u) in &sorted {
        if v == current {
            writer.push(false);
            writer.push_bits(u, k);
        } else {
            writer.push(true);
            if v > current + 1 {
                writer.push_bits(v, k);
                writer.push(false);
            }
            writer.push_bits(u, k);
            current = v;
        }
    }
    // a plain run of ones could decode as a spurious loop on n - 1
    let pending = writer.pending();
    if k < 6 && n == 1 << k && current + 2 == n && pending > k {
        writer.push(false);
    }
    out.extend(writer.finish(true));
    Ok(out)
}

/// Decodes the bytes following the `:` marker.
pub(super) fn decode(body: &[u8]) -> Result<(usize, Vec<(usize, usize)>), GraphError> {
    let (n, used) = decode_count(body)?;
    let mut reader = BitReader::new(&body[used..])?;
    let k = width(n);
    let mut edges = Vec::new();
    let mut v = 0usize;
    while reader.remaining() > k as usize {
        let (Some(b), Some(x)) = (reader.next_bit(), reader.read_bits(k)) else {
            break;
        };
        if b {
            v += 1;
        }
        if v >= n {
            break;
        }
        if x > v {
            v = x;
        } else {
            edges.push((x, v));
        }
    }
    Ok((n, edges))
}
