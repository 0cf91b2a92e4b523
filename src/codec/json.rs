//! JSON graph documents read as plain edge lists.
//!
//! The document is an object whose `edges` array holds records with
//! `source`, `target` and an optional numeric `weight`. Vertex ids may be
//! strings or numbers; `nodes` and any other member is ignored.

use std::io::Read;

use serde::Deserialize;

use crate::errors::GraphError;

use super::IdMapper;

/// Weight reported for an edge record without one.
pub(super) const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    source: VertexRef,
    target: VertexRef,
    #[serde(default)]
    weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VertexRef {
    Text(String),
    Number(serde_json::Number),
}

impl VertexRef {
    fn map(&self, mapper: IdMapper<'_>) -> i64 {
        match self {
            VertexRef::Text(text) => mapper(text),
            VertexRef::Number(number) => mapper(&number.to_string()),
        }
    }
}

pub(super) fn decode(input: &str, mapper: IdMapper<'_>) -> Result<Vec<(i64, i64, f64)>, GraphError> {
    let document: Document =
        serde_json::from_str(input).map_err(|e| GraphError::io(e.to_string()))?;
    Ok(triples(&document, mapper))
}

pub(super) fn read<R: Read>(
    reader: R,
    mapper: IdMapper<'_>,
) -> Result<Vec<(i64, i64, f64)>, GraphError> {
    let document: Document =
        serde_json::from_reader(reader).map_err(|e| GraphError::io(e.to_string()))?;
    Ok(triples(&document, mapper))
}

fn triples(document: &Document, mapper: IdMapper<'_>) -> Vec<(i64, i64, f64)> {
    document
        .edges
        .iter()
        .map(|edge| {
            (
                edge.source.map(mapper),
                edge.target.map(mapper),
                edge.weight.unwrap_or(DEFAULT_WEIGHT),
            )
        })
        .collect()
}
