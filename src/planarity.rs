//! Planarity testing with certificates.
//!
//! The test runs on the underlying simple undirected graph: direction is
//! ignored, self-loops never affect planarity and parallel edges are
//! represented by one edge. A planar result carries a rotation system over
//! every edge of the input; a non-planar one carries an edge-minimal
//! Kuratowski subdivision.

mod boyer_myrvold;
mod embedding;
mod kuratowski;

use tracing::debug;

use crate::{
    errors::GraphError,
    graph::{Graph, Keep, SimpleView},
};

pub use embedding::PlanarEmbedding;
pub use kuratowski::{KuratowskiKind, KuratowskiSubdivision, classify_subdivision};

/// Outcome of [`test_planarity`]. Exactly one of `embedding` and
/// `kuratowski` is present.
#[derive(Debug, Clone)]
pub struct PlanarityResult {
    pub is_planar: bool,
    pub embedding: Option<PlanarEmbedding>,
    pub kuratowski: Option<KuratowskiSubdivision>,
}

/// Fails only with `Internal` when a certificate cannot be classified.
pub fn test_planarity(graph: &Graph) -> Result<PlanarityResult, GraphError> {
    let view = SimpleView::build(graph, Keep::First);
    let pairs: Vec<(usize, usize)> = view.edges.iter().map(|e| (e.u, e.v)).collect();
    debug!(
        vertices = view.vertex_count(),
        edges = pairs.len(),
        "planarity test"
    );
    match boyer_myrvold::embed(view.vertex_count(), &pairs) {
        Some(rotation) => Ok(PlanarityResult {
            is_planar: true,
            embedding: Some(PlanarEmbedding::assemble(graph, &view, rotation)),
            kuratowski: None,
        }),
        None => {
            let subdivision = kuratowski::extract(&view)?;
            debug!(kind = %subdivision.kind(), "graph is not planar");
            Ok(PlanarityResult {
                is_planar: false,
                embedding: None,
                kuratowski: Some(subdivision),
            })
        }
    }
}

/// Planarity check without building a certificate.
pub fn is_planar(graph: &Graph) -> bool {
    let view = SimpleView::build(graph, Keep::First);
    let pairs: Vec<(usize, usize)> = view.edges.iter().map(|e| (e.u, e.v)).collect();
    boyer_myrvold::is_planar(view.vertex_count(), &pairs)
}
