mod bipartite;
mod blossom;
mod edmonds;
mod greedy;
mod path_growing;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ahash::AHashSet;

use crate::{
    errors::GraphError,
    graph::{EdgeId, Graph, VertexId},
    set::LongSet,
};

pub use bipartite::bipartite_perfect_min_weight;

/// Edge set of a matching with its cached weight.
///
/// A matching is immutable once computed. Infeasible results (no perfect
/// matching, non-bipartite input to a bipartite variant) are empty with
/// `is_feasible() == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matching {
    edges: LongSet,
    weight: f64,
    feasible: bool,
}

impl Matching {
    pub(crate) fn from_edges<I>(graph: &Graph, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = EdgeId>,
    {
        let mut set = LongSet::linked();
        let mut weight = 0.0;
        for edge in edges {
            if set.add(edge) && graph.is_weighted() {
                weight += graph.edge_weight(edge)?;
            }
        }
        Ok(Self {
            edges: set,
            weight,
            feasible: true,
        })
    }

    pub(crate) fn infeasible() -> Self {
        Self {
            edges: LongSet::linked(),
            weight: 0.0,
            feasible: false,
        }
    }

    pub fn edges(&self) -> &LongSet {
        &self.edges
    }

    /// Sum of the member edge weights; 0.0 on unweighted graphs.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn cardinality(&self) -> usize {
        self.edges.len()
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    pub fn contains(&self, edge: EdgeId) -> bool {
        self.edges.contains(edge)
    }

    /// True when every member is a live non-loop edge of `graph` and no two
    /// members share an endpoint.
    pub fn is_valid_in(&self, graph: &Graph) -> bool {
        let mut covered: AHashSet<VertexId> = AHashSet::new();
        self.edges.iter().all(|edge| match graph.edge(edge) {
            Ok(record) => {
                !record.is_self_loop() && covered.insert(record.source) && covered.insert(record.target)
            }
            Err(_) => false,
        })
    }
}

/// Order in which the custom greedy cardinality matching scans edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeOrder {
    #[default]
    Insertion,
    /// Ascending sum of endpoint degrees.
    DegreeSum,
    DescendingWeight,
}

/// Every matching algorithm the engine offers, with its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchingAlgorithm {
    GreedyMaxCardinality,
    CustomGreedyMaxCardinality { order: EdgeOrder },
    EdmondsMaxCardinalityDense,
    EdmondsMaxCardinalitySparse,
    GreedyMaxWeight,
    CustomGreedyMaxWeight { normalize: bool, epsilon: f64 },
    PathGrowingMaxWeight { use_heuristics: bool },
    BlossomMaxWeight,
    BlossomMinWeight,
    BlossomPerfectMaxWeight,
    BlossomPerfectMinWeight,
    BipartiteMaxCardinality,
    BipartiteMaxWeight,
}

impl MatchingAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            MatchingAlgorithm::GreedyMaxCardinality => "greedy_max_cardinality",
            MatchingAlgorithm::CustomGreedyMaxCardinality { .. } => "custom_greedy_max_cardinality",
            MatchingAlgorithm::EdmondsMaxCardinalityDense => "edmonds_max_cardinality_dense",
            MatchingAlgorithm::EdmondsMaxCardinalitySparse => "edmonds_max_cardinality_sparse",
            MatchingAlgorithm::GreedyMaxWeight => "greedy_max_weight",
            MatchingAlgorithm::CustomGreedyMaxWeight { .. } => "custom_greedy_max_weight",
            MatchingAlgorithm::PathGrowingMaxWeight { .. } => "path_growing_max_weight",
            MatchingAlgorithm::BlossomMaxWeight => "blossom_max_weight",
            MatchingAlgorithm::BlossomMinWeight => "blossom_min_weight",
            MatchingAlgorithm::BlossomPerfectMaxWeight => "blossom_perfect_max_weight",
            MatchingAlgorithm::BlossomPerfectMinWeight => "blossom_perfect_min_weight",
            MatchingAlgorithm::BipartiteMaxCardinality => "bipartite_max_cardinality",
            MatchingAlgorithm::BipartiteMaxWeight => "bipartite_max_weight",
        }
    }
}

/// Runs `algorithm` on `graph`. Directed graphs are matched on their
/// underlying undirected graph.
pub fn compute(graph: &Graph, algorithm: MatchingAlgorithm) -> Result<Matching, GraphError> {
    let matching = match algorithm {
        MatchingAlgorithm::GreedyMaxCardinality => {
            greedy::max_cardinality(graph, EdgeOrder::Insertion)?
        }
        MatchingAlgorithm::CustomGreedyMaxCardinality { order } => {
            greedy::max_cardinality(graph, order)?
        }
        MatchingAlgorithm::EdmondsMaxCardinalityDense => edmonds::dense(graph)?,
        MatchingAlgorithm::EdmondsMaxCardinalitySparse => edmonds::sparse(graph)?,
        MatchingAlgorithm::GreedyMaxWeight => greedy::max_weight(graph, false, 0.0)?,
        MatchingAlgorithm::CustomGreedyMaxWeight { normalize, epsilon } => {
            if !epsilon.is_finite() || epsilon < 0.0 {
                return Err(GraphError::illegal_argument(format!(
                    "epsilon must be a non-negative finite number, got {epsilon}"
                )));
            }
            greedy::max_weight(graph, normalize, epsilon)?
        }
        MatchingAlgorithm::PathGrowingMaxWeight { use_heuristics } => {
            path_growing::max_weight(graph, use_heuristics)?
        }
        MatchingAlgorithm::BlossomMaxWeight => blossom::solve(graph, blossom::Objective::Max, false)?,
        MatchingAlgorithm::BlossomMinWeight => blossom::solve(graph, blossom::Objective::Min, false)?,
        MatchingAlgorithm::BlossomPerfectMaxWeight => {
            blossom::solve(graph, blossom::Objective::Max, true)?
        }
        MatchingAlgorithm::BlossomPerfectMinWeight => {
            blossom::solve(graph, blossom::Objective::Min, true)?
        }
        MatchingAlgorithm::BipartiteMaxCardinality => bipartite::max_cardinality(graph)?,
        MatchingAlgorithm::BipartiteMaxWeight => bipartite::max_weight(graph)?,
    };
    debug!(
        algorithm = algorithm.name(),
        cardinality = matching.cardinality(),
        weight = matching.weight(),
        feasible = matching.is_feasible(),
        "matching computed"
    );
    Ok(matching)
}
