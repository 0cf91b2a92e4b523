//! graph6 and sparse6 text formats, plus JSON documents read as edge lists.
//!
//! Export writes the underlying undirected graph with vertices numbered by
//! their position among the live vertices. Import appends the decoded
//! vertices and edges to an existing graph and is not transactional: an
//! error part way leaves what was already added.

mod bits;
mod graph6;
mod json;
mod sparse6;

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    errors::GraphError,
    graph::{ExternalId, Graph, VertexId},
};

const GRAPH6_HEADER: &str = ">>graph6<<";
const SPARSE6_HEADER: &str = ">>sparse6<<";

/// Largest vertex count [`import`] will add in one call. sparse6 can declare
/// up to 2^36 - 1 vertices in a handful of bytes.
pub const MAX_IMPORT_VERTICES: usize = 1 << 26;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Graph6,
    Sparse6,
}

/// Vertex count and edge list of one decoded graph; vertices are `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedGraph {
    pub format: Format,
    pub vertex_count: usize,
    pub edges: Vec<(usize, usize)>,
}

/// Maps the textual id of a decoded vertex to an integer id. For graph6 and
/// sparse6 the text is the vertex position in decimal.
pub type IdMapper<'a> = &'a dyn Fn(&str) -> i64;

/// `(source, target, weight)` records in document order, with endpoints
/// already mapped to integer ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeList {
    entries: Vec<(i64, i64, f64)>,
}

impl EdgeList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<(i64, i64, f64), GraphError> {
        self.entries.get(index).copied().ok_or_else(|| {
            GraphError::out_of_bounds(format!(
                "edge list index {index} out of range for length {}",
                self.entries.len()
            ))
        })
    }

    pub fn as_slice(&self) -> &[(i64, i64, f64)] {
        &self.entries
    }
}

pub fn encode(graph: &Graph, format: Format, header: bool) -> Result<String, GraphError> {
    let index = graph.dense_index();
    let mut edges = Vec::with_capacity(graph.edge_count());
    for record in graph.edges() {
        let (Some(u), Some(v)) = (index.index_of(record.source), index.index_of(record.target))
        else {
            continue;
        };
        edges.push((u, v));
    }
    let body = match format {
        Format::Graph6 => graph6::encode(index.len(), &edges)?,
        Format::Sparse6 => sparse6::encode(index.len(), &edges)?,
    };
    let mut text = String::with_capacity(body.len() + SPARSE6_HEADER.len());
    if header {
        text.push_str(match format {
            Format::Graph6 => GRAPH6_HEADER,
            Format::Sparse6 => SPARSE6_HEADER,
        });
    }
    // every byte is in 58..=126
    text.extend(body.iter().map(|&b| char::from(b)));
    debug!(?format, vertices = index.len(), edges = edges.len(), "graph encoded");
    Ok(text)
}

/// Writes one encoded graph followed by a newline.
pub fn write_graph<W: Write>(
    graph: &Graph,
    format: Format,
    header: bool,
    writer: &mut W,
) -> Result<(), GraphError> {
    let text = encode(graph, format, header)?;
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Decodes the first graph of `input` without touching any [`Graph`].
pub fn decode_edge_list(input: &str) -> Result<DecodedGraph, GraphError> {
    let line = input
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| GraphError::io("no graph in input"))?;
    let (line, declared) = if let Some(rest) = line.strip_prefix(GRAPH6_HEADER) {
        (rest, Some(Format::Graph6))
    } else if let Some(rest) = line.strip_prefix(SPARSE6_HEADER) {
        (rest, Some(Format::Sparse6))
    } else {
        (line, None)
    };
    let bytes = line.as_bytes();
    let (format, (vertex_count, edges)) = match bytes.first() {
        Some(&sparse6::MARKER) => (Format::Sparse6, sparse6::decode(&bytes[1..])?),
        Some(b'&') => return Err(GraphError::io("digraph6 input is not supported")),
        Some(_) => (Format::Graph6, graph6::decode(bytes)?),
        None => return Err(GraphError::io("empty graph body")),
    };
    if declared.is_some_and(|declared| declared != format) {
        return Err(GraphError::io("header does not match the graph body"));
    }
    Ok(DecodedGraph {
        format,
        vertex_count,
        edges,
    })
}

/// Adds the decoded graph to `graph` and returns the vertex used for each
/// position. With a mapper, every position gets the integer external id
/// `mapper(position)`, and a vertex already carrying that id is reused.
pub fn import(
    graph: &mut Graph,
    input: &str,
    mapper: Option<IdMapper<'_>>,
) -> Result<Vec<VertexId>, GraphError> {
    let decoded = decode_edge_list(input)?;
    if decoded.vertex_count > MAX_IMPORT_VERTICES {
        return Err(GraphError::io(format!(
            "{} vertices exceed the import limit of {MAX_IMPORT_VERTICES}",
            decoded.vertex_count
        )));
    }
    let mut vertices = Vec::new();
    vertices
        .try_reserve_exact(decoded.vertex_count)
        .map_err(|e| GraphError::io(e.to_string()))?;
    for position in 0..decoded.vertex_count {
        let vertex = match mapper {
            Some(mapper) => {
                let id = ExternalId::Int(mapper(&position.to_string()));
                match graph.vertex_by_external_id(&id) {
                    Some(existing) => existing,
                    None => graph.add_vertex(Some(id))?,
                }
            }
            None => graph.add_vertex(None)?,
        };
        vertices.push(vertex);
    }
    for &(u, v) in &decoded.edges {
        graph.add_edge(vertices[u], vertices[v], None)?;
    }
    debug!(
        format = ?decoded.format,
        vertices = decoded.vertex_count,
        edges = decoded.edges.len(),
        "graph imported"
    );
    Ok(vertices)
}

pub fn read_graph<R: Read>(
    graph: &mut Graph,
    reader: &mut R,
    mapper: Option<IdMapper<'_>>,
) -> Result<Vec<VertexId>, GraphError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    import(graph, &input, mapper)
}

/// Reads the edges of a JSON graph document without touching any [`Graph`].
/// Every vertex id goes through `mapper`; a record without a weight gets
/// 1.0. Malformed JSON is `Io`.
pub fn decode_json_edge_list(input: &str, mapper: IdMapper<'_>) -> Result<EdgeList, GraphError> {
    let entries = json::decode(input, mapper)?;
    debug!(edges = entries.len(), "json edge list decoded");
    Ok(EdgeList { entries })
}

pub fn read_json_edge_list<R: Read>(
    reader: R,
    mapper: IdMapper<'_>,
) -> Result<EdgeList, GraphError> {
    let entries = json::read(reader, mapper)?;
    debug!(edges = entries.len(), "json edge list read");
    Ok(EdgeList { entries })
}
