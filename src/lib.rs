//! Native graph algorithms behind a handle-based interface.
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod bench_utils;
pub mod cache;
pub mod codec;
pub mod config;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod iterator;
pub mod matching;
pub mod partition;
pub mod planarity;
pub mod registry;
pub mod scoring;
pub mod set;

pub use crate::config::{GraphConfig, SetKind};
pub use crate::engine::Engine;
pub use crate::errors::{GraphError, Status};
pub use crate::graph::{EdgeDirection, EdgeId, ExternalId, Graph, VertexId};
pub use crate::matching::{EdgeOrder, Matching, MatchingAlgorithm};
pub use crate::planarity::{KuratowskiKind, PlanarEmbedding, PlanarityResult};
pub use crate::registry::{Handle, HandleRegistry};
pub use crate::set::LongSet;
