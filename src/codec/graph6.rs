use crate::errors::GraphError;

use super::bits::{BitReader, BitWriter, decode_count, encode_count};

/// Encodes a simple undirected graph; `edges` must hold no loop and no
/// repeated pair.
pub(super) fn encode(n: usize, edges: &[(usize, usize)]) -> Result<Vec<u8>, GraphError> {
    let mut adjacent = vec![false; n * n.saturating_sub(1) / 2];
    for &(a, b) in edges {
        if a == b {
            return Err(GraphError::illegal_argument(
                "graph6 cannot represent self-loops",
            ));
        }
        let slot = upper_triangle_slot(a.min(b), a.max(b));
        if adjacent[slot] {
            return Err(GraphError::illegal_argument(
                "graph6 cannot represent multiple edges",
            ));
        }
        adjacent[slot] = true;
    }
    let mut out = Vec::new();
    encode_count(n, &mut out)?;
    let mut writer = BitWriter::default();
    for &bit in &adjacent {
        writer.push(bit);
    }
    out.extend(writer.finish(false));
    Ok(out)
}

/// Position of pair `(i, j)`, `i < j`, in column-wise upper-triangle order.
fn upper_triangle_slot(i: usize, j: usize) -> usize {
    j * (j - 1) / 2 + i
}

pub(super) fn decode(body: &[u8]) -> Result<(usize, Vec<(usize, usize)>), GraphError> {
    let (n, used) = decode_count(body)?;
    let mut reader = BitReader::new(&body[used..])?;
    let needed = n
        .checked_mul(n.saturating_sub(1))
        .map(|twice| twice / 2)
        .ok_or_else(|| GraphError::io(format!("{n} vertices overflow the graph6 matrix size")))?;
    if reader.remaining() < needed {
        return Err(GraphError::io(format!(
            "graph6 body holds {} bits, {n} vertices need {needed}",
            reader.remaining()
        )));
    }
    let mut edges = Vec::new();
    for j in 1..n {
        for i in 0..j {
            if reader.next_bit() == Some(true) {
                edges.push((i, j));
            }
        }
    }
    if reader.remaining() >= 6 {
        return Err(GraphError::io("trailing bytes after graph6 body"));
    }
    Ok((n, edges))
}
