//! Handle-based call surface.
//!
//! Every entry point resolves its handles through the owned
//! [`HandleRegistry`], returns a `Result` and records the outcome in the
//! engine's last-status slot.

use std::{fs::File, io::BufReader, path::Path};

use tracing::debug;

use crate::{
    codec::{self, Format, IdMapper},
    config::{GraphConfig, SetKind},
    errors::{GraphError, Status},
    graph::{EdgeDirection, EdgeId, ExternalId, Graph, VertexId},
    iterator::{Element, HandleIterator},
    matching::{self, MatchingAlgorithm},
    partition,
    planarity::{self, KuratowskiKind},
    registry::{Handle, HandleRegistry, NativeObject, ObjectKind},
    scoring::{self, PageRankConfig, VertexScores},
    set::LongSet,
};

/// Handles produced by [`Engine::planarity_test`]. Exactly one of
/// `embedding` and `kuratowski` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanarityHandles {
    pub is_planar: bool,
    pub embedding: Option<Handle>,
    pub kuratowski: Option<Handle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BipartitionHandles {
    pub is_bipartite: bool,
    pub first: Handle,
    pub second: Handle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusteringHandles {
    pub global: f64,
    pub average: f64,
    pub local: Handle,
}

#[derive(Debug, Default)]
struct LastStatus {
    status: Option<Status>,
    message: Option<String>,
}

/// One engine context: the registry owning every object plus the status of
/// the most recent call.
#[derive(Debug, Default)]
pub struct Engine {
    registry: HandleRegistry,
    last: LastStatus,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Status of the last call; `Success` before any call.
    pub fn last_status(&self) -> Status {
        self.last.status.unwrap_or(Status::Success)
    }

    pub fn last_error_message(&self) -> Option<&str> {
        self.last.message.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last = LastStatus::default();
    }

    fn record<T>(&mut self, result: Result<T, GraphError>) -> Result<T, GraphError> {
        match &result {
            Ok(_) => {
                self.last.status = Some(Status::Success);
                self.last.message = None;
            }
            Err(err) => {
                debug!(status = %err.status(), error = %err, "engine call failed");
                self.last.status = Some(err.status());
                self.last.message = Some(err.to_string());
            }
        }
        result
    }

    fn graph_call<T>(
        &mut self,
        graph: Handle,
        op: impl FnOnce(&Graph) -> Result<T, GraphError>,
    ) -> Result<T, GraphError> {
        let result = self.registry.graph(graph).and_then(op);
        self.record(result)
    }

    fn graph_mut_call<T>(
        &mut self,
        graph: Handle,
        op: impl FnOnce(&mut Graph) -> Result<T, GraphError>,
    ) -> Result<T, GraphError> {
        let result = self.registry.graph_mut(graph).and_then(op);
        self.record(result)
    }

    /// Runs `op` against the graph and registers the object it builds.
    fn graph_product(
        &mut self,
        graph: Handle,
        op: impl FnOnce(&Graph) -> Result<NativeObject, GraphError>,
    ) -> Result<Handle, GraphError> {
        let result = self
            .registry
            .graph(graph)
            .and_then(op)
            .map(|object| self.registry.insert(object));
        self.record(result)
    }

    // ---- lifecycle ----

    pub fn create_graph(&mut self, config: GraphConfig) -> Handle {
        let handle = self.registry.insert(NativeObject::Graph(Graph::new(config)));
        let _ = self.record(Ok(()));
        handle
    }

    /// Frees any object. Destroying the same handle twice reports
    /// `InvalidHandle`.
    pub fn destroy(&mut self, handle: Handle) -> Result<(), GraphError> {
        let result = self.registry.destroy(handle);
        self.record(result)
    }

    pub fn kind_of(&mut self, handle: Handle) -> Result<ObjectKind, GraphError> {
        let result = self.registry.kind_of(handle);
        self.record(result)
    }

    // ---- graph store ----

    pub fn add_vertex(&mut self, graph: Handle) -> Result<VertexId, GraphError> {
        self.graph_mut_call(graph, |g| g.add_vertex(None))
    }

    pub fn add_vertex_with_id(
        &mut self,
        graph: Handle,
        external_id: ExternalId,
    ) -> Result<VertexId, GraphError> {
        self.graph_mut_call(graph, |g| g.add_vertex(Some(external_id)))
    }

    pub fn add_edge(
        &mut self,
        graph: Handle,
        source: VertexId,
        target: VertexId,
    ) -> Result<EdgeId, GraphError> {
        self.graph_mut_call(graph, |g| g.add_edge(source, target, None))
    }

    pub fn add_edge_with_id(
        &mut self,
        graph: Handle,
        source: VertexId,
        target: VertexId,
        external_id: ExternalId,
    ) -> Result<EdgeId, GraphError> {
        self.graph_mut_call(graph, |g| g.add_edge(source, target, Some(external_id)))
    }

    pub fn remove_vertex(&mut self, graph: Handle, vertex: VertexId) -> Result<(), GraphError> {
        self.graph_mut_call(graph, |g| g.remove_vertex(vertex))
    }

    pub fn remove_edge(&mut self, graph: Handle, edge: EdgeId) -> Result<(), GraphError> {
        self.graph_mut_call(graph, |g| g.remove_edge(edge))
    }

    pub fn set_edge_weight(
        &mut self,
        graph: Handle,
        edge: EdgeId,
        weight: f64,
    ) -> Result<(), GraphError> {
        self.graph_mut_call(graph, |g| g.set_edge_weight(edge, weight))
    }

    pub fn edge_weight(&mut self, graph: Handle, edge: EdgeId) -> Result<f64, GraphError> {
        self.graph_call(graph, |g| g.edge_weight(edge))
    }

    pub fn edge_endpoints(
        &mut self,
        graph: Handle,
        edge: EdgeId,
    ) -> Result<(VertexId, VertexId), GraphError> {
        self.graph_call(graph, |g| g.edge_endpoints(edge))
    }

    pub fn degree(&mut self, graph: Handle, vertex: VertexId) -> Result<usize, GraphError> {
        self.graph_call(graph, |g| g.degree(vertex))
    }

    pub fn in_degree(&mut self, graph: Handle, vertex: VertexId) -> Result<usize, GraphError> {
        self.graph_call(graph, |g| g.in_degree(vertex))
    }

    pub fn out_degree(&mut self, graph: Handle, vertex: VertexId) -> Result<usize, GraphError> {
        self.graph_call(graph, |g| g.out_degree(vertex))
    }

    pub fn opposite(
        &mut self,
        graph: Handle,
        edge: EdgeId,
        vertex: VertexId,
    ) -> Result<VertexId, GraphError> {
        self.graph_call(graph, |g| g.opposite(edge, vertex))
    }

    pub fn edge_between(
        &mut self,
        graph: Handle,
        u: VertexId,
        v: VertexId,
    ) -> Result<Option<EdgeId>, GraphError> {
        self.graph_call(graph, |g| g.edge_between(u, v))
    }

    pub fn vertex_count(&mut self, graph: Handle) -> Result<usize, GraphError> {
        self.graph_call(graph, |g| Ok(g.vertex_count()))
    }

    pub fn edge_count(&mut self, graph: Handle) -> Result<usize, GraphError> {
        self.graph_call(graph, |g| Ok(g.edge_count()))
    }

    pub fn contains_vertex(&mut self, graph: Handle, vertex: VertexId) -> Result<bool, GraphError> {
        self.graph_call(graph, |g| Ok(g.contains_vertex(vertex)))
    }

    pub fn contains_edge(&mut self, graph: Handle, edge: EdgeId) -> Result<bool, GraphError> {
        self.graph_call(graph, |g| Ok(g.contains_edge(edge)))
    }

    pub fn vertex_by_external_id(
        &mut self,
        graph: Handle,
        external_id: &ExternalId,
    ) -> Result<Option<VertexId>, GraphError> {
        self.graph_call(graph, |g| Ok(g.vertex_by_external_id(external_id)))
    }

    pub fn edge_by_external_id(
        &mut self,
        graph: Handle,
        external_id: &ExternalId,
    ) -> Result<Option<EdgeId>, GraphError> {
        self.graph_call(graph, |g| Ok(g.edge_by_external_id(external_id)))
    }

    pub fn external_id_of_vertex(
        &mut self,
        graph: Handle,
        vertex: VertexId,
    ) -> Result<Option<ExternalId>, GraphError> {
        self.graph_call(graph, |g| Ok(g.external_id_of_vertex(vertex)?.cloned()))
    }

    pub fn vertices_iterator(&mut self, graph: Handle) -> Result<Handle, GraphError> {
        self.graph_product(graph, |g| {
            Ok(NativeObject::Iterator(HandleIterator::vertices(graph, g)))
        })
    }

    pub fn edges_iterator(&mut self, graph: Handle) -> Result<Handle, GraphError> {
        self.graph_product(graph, |g| {
            Ok(NativeObject::Iterator(HandleIterator::edges(graph, g)))
        })
    }

    pub fn incident_edges_iterator(
        &mut self,
        graph: Handle,
        vertex: VertexId,
        direction: EdgeDirection,
    ) -> Result<Handle, GraphError> {
        self.graph_product(graph, |g| {
            HandleIterator::incident_edges(graph, g, vertex, direction).map(NativeObject::Iterator)
        })
    }

    // ---- sets ----

    pub fn create_set(&mut self, kind: SetKind) -> Handle {
        let handle = self.registry.insert(NativeObject::Set(LongSet::new(kind)));
        let _ = self.record(Ok(()));
        handle
    }

    pub fn set_add(&mut self, set: Handle, value: i64) -> Result<bool, GraphError> {
        let result = self.registry.long_set_mut(set).map(|s| s.add(value));
        self.record(result)
    }

    pub fn set_remove(&mut self, set: Handle, value: i64) -> Result<bool, GraphError> {
        let result = self.registry.long_set_mut(set).map(|s| s.remove(value));
        self.record(result)
    }

    pub fn set_clear(&mut self, set: Handle) -> Result<(), GraphError> {
        let result = self.registry.long_set_mut(set).map(LongSet::clear);
        self.record(result)
    }

    /// Works on plain sets as well as matching and Kuratowski edge sets.
    pub fn set_contains(&mut self, set: Handle, value: i64) -> Result<bool, GraphError> {
        let result = self.registry.long_set(set).map(|s| s.contains(value));
        self.record(result)
    }

    pub fn set_size(&mut self, set: Handle) -> Result<usize, GraphError> {
        let result = self.registry.long_set(set).map(LongSet::len);
        self.record(result)
    }

    pub fn set_iterator(&mut self, set: Handle) -> Result<Handle, GraphError> {
        let result = self
            .registry
            .long_set(set)
            .map(|s| HandleIterator::set(set, s))
            .map(|it| self.registry.insert(NativeObject::Iterator(it)));
        self.record(result)
    }

    // ---- score maps ----

    pub fn create_map(&mut self) -> Handle {
        let handle = self.registry.insert(NativeObject::Map(VertexScores::new()));
        let _ = self.record(Ok(()));
        handle
    }

    pub fn map_put(&mut self, map: Handle, key: i64, value: f64) -> Result<Option<f64>, GraphError> {
        let result = self.registry.map_mut(map).map(|m| m.put(key, value));
        self.record(result)
    }

    /// A missing key is `NoSuchElement`.
    pub fn map_get(&mut self, map: Handle, key: i64) -> Result<f64, GraphError> {
        let result = self
            .registry
            .map(map)
            .and_then(|m| m.get(key).ok_or(GraphError::NoSuchElement));
        self.record(result)
    }

    pub fn map_contains_key(&mut self, map: Handle, key: i64) -> Result<bool, GraphError> {
        let result = self.registry.map(map).map(|m| m.contains_key(key));
        self.record(result)
    }

    pub fn map_size(&mut self, map: Handle) -> Result<usize, GraphError> {
        let result = self.registry.map(map).map(VertexScores::len);
        self.record(result)
    }

    pub fn map_keys_iterator(&mut self, map: Handle) -> Result<Handle, GraphError> {
        let result = self
            .registry
            .map(map)
            .map(|m| HandleIterator::map_keys(map, m))
            .map(|it| self.registry.insert(NativeObject::Iterator(it)));
        self.record(result)
    }

    // ---- iterators ----

    pub fn iterator_has_next(&mut self, iterator: Handle) -> Result<bool, GraphError> {
        let result = self.registry.iterator_has_next(iterator);
        self.record(result)
    }

    pub fn iterator_next(&mut self, iterator: Handle) -> Result<Element, GraphError> {
        let result = self.registry.iterator_next(iterator);
        self.record(result)
    }

    pub fn iterator_next_long(&mut self, iterator: Handle) -> Result<i64, GraphError> {
        let result = self.registry.iterator_next_long(iterator);
        self.record(result)
    }

    pub fn iterator_next_pair(&mut self, iterator: Handle) -> Result<(i64, i64), GraphError> {
        let result = self.registry.iterator_next_pair(iterator);
        self.record(result)
    }

    pub fn iterator_next_double(&mut self, iterator: Handle) -> Result<f64, GraphError> {
        let result = self.registry.iterator_next_double(iterator);
        self.record(result)
    }

    // ---- matching ----

    pub fn matching_exec(
        &mut self,
        graph: Handle,
        algorithm: MatchingAlgorithm,
    ) -> Result<Handle, GraphError> {
        self.graph_product(graph, |g| {
            matching::compute(g, algorithm).map(NativeObject::Matching)
        })
    }

    pub fn bipartite_perfect_min_weight(
        &mut self,
        graph: Handle,
        first: Handle,
        second: Handle,
    ) -> Result<Handle, GraphError> {
        let registry = &self.registry;
        let computed = registry.graph(graph).and_then(|g| {
            let first = registry.long_set(first)?;
            let second = registry.long_set(second)?;
            matching::bipartite_perfect_min_weight(g, first, second)
        });
        let result = computed.map(|m| self.registry.insert(NativeObject::Matching(m)));
        self.record(result)
    }

    pub fn matching_weight(&mut self, matching: Handle) -> Result<f64, GraphError> {
        let result = self.registry.matching(matching).map(|m| m.weight());
        self.record(result)
    }

    pub fn matching_cardinality(&mut self, matching: Handle) -> Result<usize, GraphError> {
        let result = self.registry.matching(matching).map(|m| m.cardinality());
        self.record(result)
    }

    pub fn matching_is_feasible(&mut self, matching: Handle) -> Result<bool, GraphError> {
        let result = self.registry.matching(matching).map(|m| m.is_feasible());
        self.record(result)
    }

    pub fn partition_exec_bipartite(
        &mut self,
        graph: Handle,
    ) -> Result<BipartitionHandles, GraphError> {
        let result = self
            .registry
            .graph(graph)
            .map(partition::bipartite_partition)
            .map(|p| BipartitionHandles {
                is_bipartite: p.is_bipartite,
                first: self.registry.insert(NativeObject::Set(p.first)),
                second: self.registry.insert(NativeObject::Set(p.second)),
            });
        self.record(result)
    }

    // ---- planarity ----

    pub fn planarity_test(&mut self, graph: Handle) -> Result<PlanarityHandles, GraphError> {
        let result = self
            .registry
            .graph(graph)
            .and_then(planarity::test_planarity)
            .map(|outcome| PlanarityHandles {
                is_planar: outcome.is_planar,
                embedding: outcome
                    .embedding
                    .map(|e| self.registry.insert(NativeObject::Embedding(e))),
                kuratowski: outcome
                    .kuratowski
                    .map(|k| self.registry.insert(NativeObject::Kuratowski(k))),
            });
        self.record(result)
    }

    /// Iterator over the edges around `vertex` in rotation order.
    pub fn embedding_edges_around(
        &mut self,
        embedding: Handle,
        vertex: VertexId,
    ) -> Result<Handle, GraphError> {
        let result = self
            .registry
            .embedding(embedding)
            .and_then(|e| e.edges_around(vertex))
            .map(|edges| edges.iter().copied().map(Element::Long).collect::<Vec<_>>())
            .map(|elements| {
                self.registry
                    .insert(NativeObject::Iterator(HandleIterator::owned(elements)))
            });
        self.record(result)
    }

    pub fn embedding_face_count(&mut self, embedding: Handle) -> Result<usize, GraphError> {
        let result = self.registry.embedding(embedding).map(|e| e.faces().len());
        self.record(result)
    }

    pub fn kuratowski_kind(&mut self, subdivision: Handle) -> Result<KuratowskiKind, GraphError> {
        let result = self.registry.kuratowski(subdivision).map(|k| k.kind());
        self.record(result)
    }

    /// Classifies the edges in `edges` (any set-like handle) as a
    /// subdivision of K5 or K3,3 within `graph`.
    pub fn classify_subdivision(
        &mut self,
        graph: Handle,
        edges: Handle,
    ) -> Result<Option<KuratowskiKind>, GraphError> {
        let result = self.registry.graph(graph).and_then(|g| {
            let set = self.registry.long_set(edges)?;
            planarity::classify_subdivision(g, set)
        });
        self.record(result)
    }

    // ---- graph6 / sparse6 ----

    pub fn export_graph(
        &mut self,
        graph: Handle,
        format: Format,
        header: bool,
    ) -> Result<String, GraphError> {
        self.graph_call(graph, |g| codec::encode(g, format, header))
    }

    pub fn import_graph(
        &mut self,
        graph: Handle,
        input: &str,
        mapper: Option<IdMapper<'_>>,
    ) -> Result<Vec<VertexId>, GraphError> {
        self.graph_mut_call(graph, |g| codec::import(g, input, mapper))
    }

    // ---- JSON edge lists ----

    /// Parses a JSON graph document into an edge-list handle; vertex ids go
    /// through `mapper`.
    pub fn import_edge_list_json(
        &mut self,
        input: &str,
        mapper: IdMapper<'_>,
    ) -> Result<Handle, GraphError> {
        let result = codec::decode_json_edge_list(input, mapper)
            .map(|list| self.registry.insert(NativeObject::EdgeList(list)));
        self.record(result)
    }

    pub fn import_edge_list_json_file(
        &mut self,
        path: impl AsRef<Path>,
        mapper: IdMapper<'_>,
    ) -> Result<Handle, GraphError> {
        let result = File::open(path)
            .map_err(GraphError::from)
            .and_then(|file| codec::read_json_edge_list(BufReader::new(file), mapper))
            .map(|list| self.registry.insert(NativeObject::EdgeList(list)));
        self.record(result)
    }

    pub fn edge_list_len(&mut self, list: Handle) -> Result<usize, GraphError> {
        let result = self.registry.edge_list(list).map(codec::EdgeList::len);
        self.record(result)
    }

    /// Record `index` as `(source, target, weight)`.
    pub fn edge_list_get(
        &mut self,
        list: Handle,
        index: usize,
    ) -> Result<(i64, i64, f64), GraphError> {
        let result = self.registry.edge_list(list).and_then(|l| l.get(index));
        self.record(result)
    }

    // ---- scoring ----

    pub fn pagerank(&mut self, graph: Handle, config: &PageRankConfig) -> Result<Handle, GraphError> {
        self.graph_product(graph, |g| scoring::pagerank(g, config).map(NativeObject::Map))
    }

    pub fn coreness(&mut self, graph: Handle) -> Result<(usize, Handle), GraphError> {
        let result = self
            .registry
            .graph(graph)
            .and_then(scoring::coreness)
            .map(|(degeneracy, scores)| {
                (degeneracy, self.registry.insert(NativeObject::Map(scores)))
            });
        self.record(result)
    }

    pub fn clustering_coefficient(
        &mut self,
        graph: Handle,
    ) -> Result<ClusteringHandles, GraphError> {
        let result = self
            .registry
            .graph(graph)
            .and_then(scoring::clustering_coefficient)
            .map(|c| ClusteringHandles {
                global: c.global,
                average: c.average,
                local: self.registry.insert(NativeObject::Map(c.local)),
            });
        self.record(result)
    }
}
