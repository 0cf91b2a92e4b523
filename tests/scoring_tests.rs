use nativegraph::{
    Engine, Graph, GraphConfig, GraphError,
    scoring::{PageRankConfig, clustering_coefficient, coreness, pagerank},
};

fn build(config: GraphConfig, n: usize, edges: &[(usize, usize)]) -> Graph {
    let mut graph = Graph::new(config);
    for _ in 0..n {
        graph.add_vertex(None).expect("vertex");
    }
    for &(u, v) in edges {
        graph.add_edge(u as i64, v as i64, None).expect("edge");
    }
    graph
}

#[test]
fn test_pagerank_sums_to_one_and_favors_hub() {
    let graph = build(GraphConfig::undirected(), 5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
    let scores = pagerank(&graph, &PageRankConfig::default()).expect("pagerank");
    assert_eq!(scores.len(), 5);
    let total: f64 = scores.iter().map(|(_, s)| s).sum();
    assert!((total - 1.0).abs() < 1e-6);
    let hub = scores.get(0).expect("hub");
    for leaf in 1..5 {
        assert!(hub > scores.get(leaf).expect("leaf"));
    }
}

#[test]
fn test_pagerank_on_cycle_is_uniform() {
    let graph = build(GraphConfig::directed(), 4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
    let scores = pagerank(&graph, &PageRankConfig::default()).expect("pagerank");
    for (_, score) in scores.iter() {
        assert!((score - 0.25).abs() < 1e-9);
    }
}

#[test]
fn test_pagerank_dangling_vertex_keeps_mass() {
    // 2 has no outgoing edge
    let graph = build(GraphConfig::directed(), 3, &[(0, 1), (1, 2)]);
    let scores = pagerank(&graph, &PageRankConfig::default()).expect("pagerank");
    let total: f64 = scores.iter().map(|(_, s)| s).sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert!(scores.get(2).expect("sink") > scores.get(0).expect("source"));
}

#[test]
fn test_pagerank_rejects_bad_parameters() {
    let graph = build(GraphConfig::undirected(), 2, &[(0, 1)]);
    for config in [
        PageRankConfig {
            damping: 1.5,
            ..PageRankConfig::default()
        },
        PageRankConfig {
            max_iterations: 0,
            ..PageRankConfig::default()
        },
        PageRankConfig {
            tolerance: 0.0,
            ..PageRankConfig::default()
        },
    ] {
        let err = pagerank(&graph, &config).expect_err("invalid config");
        assert!(matches!(err, GraphError::IllegalArgument(_)));
    }
}

#[test]
fn test_coreness_of_k4_with_tail() {
    let mut edges = vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
    edges.extend([(3, 4), (4, 5)]);
    let graph = build(GraphConfig::undirected(), 6, &edges);
    let (degeneracy, cores) = coreness(&graph).expect("coreness");
    assert_eq!(degeneracy, 3);
    for v in 0..4 {
        assert_eq!(cores.get(v), Some(3.0));
    }
    assert_eq!(cores.get(4), Some(1.0));
    assert_eq!(cores.get(5), Some(1.0));
}

#[test]
fn test_coreness_ignores_self_loops() {
    let graph = build(GraphConfig::pseudograph(), 2, &[(0, 0), (0, 1)]);
    let (degeneracy, cores) = coreness(&graph).expect("coreness");
    assert_eq!(degeneracy, 1);
    assert_eq!(cores.get(0), Some(1.0));
}

#[test]
fn test_clustering_on_triangle_and_path() {
    let triangle = build(GraphConfig::undirected(), 3, &[(0, 1), (1, 2), (2, 0)]);
    let clustering = clustering_coefficient(&triangle).expect("clustering");
    assert_eq!(clustering.global, 1.0);
    assert_eq!(clustering.average, 1.0);

    let path = build(GraphConfig::undirected(), 3, &[(0, 1), (1, 2)]);
    let clustering = clustering_coefficient(&path).expect("clustering");
    assert_eq!(clustering.global, 0.0);
    assert_eq!(clustering.local.get(1), Some(0.0));
}

#[test]
fn test_directed_clustering_counts_arcs() {
    // 0 -> 1, 0 -> 2, 1 -> 2: one of the two possible arcs between 1 and 2
    let graph = build(GraphConfig::directed(), 3, &[(0, 1), (0, 2), (1, 2)]);
    let clustering = clustering_coefficient(&graph).expect("clustering");
    assert_eq!(clustering.local.get(0), Some(0.5));
}

#[test]
fn test_engine_scores_are_map_handles() {
    let mut engine = Engine::new();
    let graph = engine.create_graph(GraphConfig::undirected());
    let a = engine.add_vertex(graph).expect("vertex");
    let b = engine.add_vertex(graph).expect("vertex");
    let c = engine.add_vertex(graph).expect("vertex");
    engine.add_edge(graph, a, b).expect("edge");
    engine.add_edge(graph, b, c).expect("edge");
    engine.add_edge(graph, c, a).expect("edge");

    let ranks = engine
        .pagerank(graph, &PageRankConfig::default())
        .expect("pagerank");
    assert_eq!(engine.map_size(ranks).expect("size"), 3);
    let score = engine.map_get(ranks, a).expect("score");
    assert!((score - 1.0 / 3.0).abs() < 1e-9);

    let (degeneracy, cores) = engine.coreness(graph).expect("coreness");
    assert_eq!(degeneracy, 2);
    assert_eq!(engine.map_get(cores, c).expect("core"), 2.0);

    let clustering = engine.clustering_coefficient(graph).expect("clustering");
    assert_eq!(clustering.global, 1.0);
    assert_eq!(engine.map_get(clustering.local, b).expect("local"), 1.0);

    let it = engine.map_keys_iterator(clustering.local).expect("keys");
    assert_eq!(engine.iterator_next_long(it).expect("first key"), a);
}
