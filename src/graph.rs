mod simple;
mod store;
mod types;

pub use simple::{Keep, SimpleEdge, SimpleView};
pub use store::{DEFAULT_EDGE_WEIGHT, Graph};
pub use types::{EdgeDirection, EdgeId, EdgeRecord, ExternalId, VertexId};
